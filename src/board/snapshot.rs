//! Sparse 8x8 piece grid handed to the codec by the game layer.
//!
//! # Example
//! ```
//! use chess_bridge::board::{BoardSnapshot, Piece, PieceRef, Square};
//!
//! let mut board = BoardSnapshot::empty();
//! let e1 = Square::new(4, 0).unwrap();
//! board.set(e1, Some(PieceRef::white(Piece::King)));
//! assert_eq!(board.piece_count(), 1);
//! ```

use super::{Color, Piece, PieceRef, Square, UciMove};

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

/// File-by-rank grid; each square holds at most one piece.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    squares: [[Option<PieceRef>; 8]; 8],
}

impl BoardSnapshot {
    /// A board with nothing on it
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard back-rank and pawn-rank array for both colors.
    #[must_use]
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, &piece) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            board.put(file, 0, PieceRef::white(piece));
            board.put(file, 1, PieceRef::white(Piece::Pawn));
            board.put(file, 6, PieceRef::black(Piece::Pawn));
            board.put(file, 7, PieceRef::black(piece));
        }
        board
    }

    /// Build from `(square, piece)` pairs; later pairs overwrite earlier ones.
    #[must_use]
    pub fn from_pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = (Square, PieceRef)>,
    {
        let mut board = Self::empty();
        for (sq, piece) in pieces {
            board.set(sq, Some(piece));
        }
        board
    }

    fn put(&mut self, file: u8, rank: u8, piece: PieceRef) {
        self.squares[file as usize][rank as usize] = Some(piece);
    }

    /// Piece on `sq`, if any
    #[inline]
    #[must_use]
    pub fn get(&self, sq: Square) -> Option<PieceRef> {
        self.squares[sq.file() as usize][sq.rank() as usize]
    }

    /// Place or clear a square, returning what was there before
    pub fn set(&mut self, sq: Square, piece: Option<PieceRef>) -> Option<PieceRef> {
        std::mem::replace(
            &mut self.squares[sq.file() as usize][sq.rank() as usize],
            piece,
        )
    }

    /// Clear a square, returning the piece that stood on it
    pub fn remove(&mut self, sq: Square) -> Option<PieceRef> {
        self.set(sq, None)
    }

    /// Iterate occupied squares, a1 first, rank by rank
    pub fn occupied(&self) -> impl Iterator<Item = (Square, PieceRef)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.occupied().count()
    }

    /// Squares holding a king of `color`.
    ///
    /// House rules allow several kings per side, so this is a list.
    #[must_use]
    pub fn kings(&self, color: Color) -> Vec<Square> {
        self.occupied()
            .filter(|(_, p)| p.piece == Piece::King && p.color == color)
            .map(|(sq, _)| sq)
            .collect()
    }

    /// Relocate the piece on `mv.from` to `mv.to`.
    ///
    /// A promotion replaces the moving piece with the promoted kind of the
    /// same color. Returns the piece that stood on the destination. Nothing
    /// here checks legality, and castling or en passant side effects are the
    /// caller's business. An empty origin square leaves the board untouched.
    pub fn apply_move(&mut self, mv: &UciMove) -> Option<PieceRef> {
        let moving = self.remove(mv.from)?;
        let placed = match mv.promotion {
            Some(piece) => PieceRef::new(piece, moving.color),
            None => moving,
        };
        self.set(mv.to, Some(placed))
    }
}
