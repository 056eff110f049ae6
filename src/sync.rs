//! Synchronization primitives shared by the engine client and its worker
//! threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};

/// A thread-safe stop flag.
///
/// This wraps `Arc<AtomicBool>` so worker threads can be told to give up
/// without sharing anything else.
#[derive(Clone, Debug)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a new stop flag (initially not stopped).
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Check if the stop flag is set.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Set the stop flag.
    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// A value produced exactly once by one thread and read by any number of
/// others, with blocking waits.
///
/// Clones share the same slot.
#[derive(Debug)]
pub struct Completion<T> {
    inner: Arc<CompletionInner<T>>,
}

#[derive(Debug)]
struct CompletionInner<T> {
    value: OnceCell<T>,
    lock: Mutex<()>,
    ready: Condvar,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Completion {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Completion<T> {
    #[must_use]
    pub fn new() -> Self {
        Completion {
            inner: Arc::new(CompletionInner {
                value: OnceCell::new(),
                lock: Mutex::new(()),
                ready: Condvar::new(),
            }),
        }
    }

    /// Store the value and wake every waiter.
    ///
    /// Returns `false` (dropping `value`) if the slot was already filled.
    pub fn complete(&self, value: T) -> bool {
        let _guard = self.inner.lock.lock();
        let stored = self.inner.value.set(value).is_ok();
        self.inner.ready.notify_all();
        stored
    }

    /// The value, if it has been produced
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.inner.value.get()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.inner.value.get().is_some()
    }

    /// Block until the value is produced.
    pub fn wait(&self) -> &T {
        let mut guard = self.inner.lock.lock();
        loop {
            if let Some(value) = self.inner.value.get() {
                return value;
            }
            self.inner.ready.wait(&mut guard);
        }
    }

    /// Block until the value is produced or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<&T> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.inner.lock.lock();
        loop {
            if let Some(value) = self.inner.value.get() {
                return Some(value);
            }
            if self
                .inner
                .ready
                .wait_until(&mut guard, deadline)
                .timed_out()
            {
                return self.inner.value.get();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stop_flag_lifecycle() {
        let flag = StopFlag::new();
        assert!(!flag.is_stopped());

        flag.stop();
        assert!(flag.is_stopped());
    }

    #[test]
    fn test_stop_flag_clone() {
        let flag1 = StopFlag::new();
        let flag2 = flag1.clone();

        flag1.stop();
        assert!(flag2.is_stopped());
    }

    #[test]
    fn test_completion_set_once() {
        let slot = Completion::new();
        assert!(slot.get().is_none());
        assert!(slot.complete(1));
        assert!(!slot.complete(2));
        assert_eq!(slot.get(), Some(&1));
        assert_eq!(*slot.wait(), 1);
    }

    #[test]
    fn test_completion_cross_thread() {
        let slot: Completion<String> = Completion::new();
        let producer = slot.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.complete("done".to_string());
        });
        assert_eq!(slot.wait(), "done");
        handle.join().unwrap();
    }

    #[test]
    fn test_completion_wait_timeout() {
        let slot: Completion<u8> = Completion::new();
        assert_eq!(slot.wait_timeout(Duration::from_millis(10)), None);
        slot.complete(7);
        assert_eq!(slot.wait_timeout(Duration::from_millis(10)), Some(&7));
    }
}
