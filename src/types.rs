//! Core board types shared across the crate: pieces, squares, moves, and the
//! undo record used to reverse a move on a `Position`.

use std::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    pub fn index(self) -> usize {
        match self {
            Piece::Pawn => 0,
            Piece::Knight => 1,
            Piece::Bishop => 2,
            Piece::Rook => 3,
            Piece::Queen => 4,
            Piece::King => 5,
        }
    }

    pub fn to_fen_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<(Color, Piece)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((color, piece))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// A board square, addressed as `(rank, file)` with **rank 0 = rank 8**
/// (top) and rank 7 = rank 1 (bottom), file 0 = the a-file, both
/// zero-indexed. This is spec.md §3's mandated orientation, not the more
/// common "rank 0 = rank 1" convention; `from_algebraic`/`Display` are the
/// only places that translate between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square(pub usize, pub usize);

impl Square {
    pub fn rank(self) -> usize {
        self.0
    }

    pub fn file(self) -> usize {
        self.1
    }

    pub fn is_on_board(self) -> bool {
        self.0 < 8 && self.1 < 8
    }

    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let rank_number = rank as usize - '0' as usize;
        Some(Square(8 - rank_number, file as usize - 'a' as usize))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank_number = 8 - self.0;
        write!(f, "{}{}", (b'a' + self.1 as u8) as char, rank_number)
    }
}

/// A fully-resolved move. `promotion`/`captured_piece` are filled in by the
/// generator, not inferred at apply time, so `make_move` never needs to
/// reconsult board state to know what it is doing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub is_double_pawn_push: bool,
    pub promotion: Option<Piece>,
    pub captured_piece: Option<Piece>,
}

impl Move {
    pub fn quiet(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            is_castling: false,
            is_en_passant: false,
            is_double_pawn_push: false,
            promotion: None,
            captured_piece: None,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some() || self.is_en_passant
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            let c = match p {
                Piece::Queen => 'q',
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                Piece::Knight => 'n',
                _ => unreachable!("pawns only promote to q/r/b/n"),
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Castling rights as four independent flags, in `(white_k, white_q,
/// black_k, black_q)` order wherever packed into a compact form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> CastlingRights {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> CastlingRights {
        CastlingRights::default()
    }
}

/// Snapshot of the state `make_move` clobbers, needed to reverse it in
/// `undo_move` without recomputing anything from scratch.
#[derive(Clone, Copy, Debug)]
pub struct UndoInfo {
    pub captured_piece: Option<(Color, Piece)>,
    pub previous_en_passant: Option<Square>,
    pub previous_castling: CastlingRights,
    pub previous_halfmove_clock: u32,
}

/// Snapshot for reversing a null move (side-to-move toggle with no piece
/// movement), used by null-move pruning.
#[derive(Clone, Copy, Debug)]
pub struct NullUndoInfo {
    pub previous_en_passant: Option<Square>,
}
