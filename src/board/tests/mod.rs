//! Board module tests.
//!
//! Unit tests live beside the code they cover. The files here cover
//! properties that span several parts of the codec:
//! - `proptest.rs` - Property-based tests (move inverse law, placement
//!   round trip, castling ratchet, en passant midpoint)
//! - `scenarios.rs` - Whole-game bookkeeping scenarios
