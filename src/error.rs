//! Error types for malformed input at the public boundary. These are plain
//! enums with hand-written `Display` impls, matching the rest of the crate's
//! avoidance of extra error-handling dependencies.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FenError {
    TooFewFields { found: usize },
    InvalidPiece { found: char },
    TooManyFiles { rank: usize, files: usize },
    TooFewFiles { rank: usize, files: usize },
    WrongRankCount { found: usize },
    InvalidSideToMove { found: String },
    InvalidCastling { found: char },
    InvalidEnPassant { found: String },
    InvalidHalfmoveClock { found: String },
    InvalidFullmoveNumber { found: String },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewFields { found } => {
                write!(f, "FEN must have 6 space-separated fields, found {found}")
            }
            FenError::InvalidPiece { found } => {
                write!(f, "invalid piece character '{found}' in FEN board field")
            }
            FenError::TooManyFiles { rank, files } => {
                write!(f, "rank {rank} describes {files} files, expected at most 8")
            }
            FenError::TooFewFiles { rank, files } => {
                write!(f, "rank {rank} describes {files} files, expected 8")
            }
            FenError::WrongRankCount { found } => {
                write!(f, "FEN board field has {found} ranks, expected 8")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side-to-move field '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { found } => {
                write!(f, "invalid castling availability character '{found}'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en-passant target square '{found}'")
            }
            FenError::InvalidHalfmoveClock { found } => {
                write!(f, "invalid halfmove clock field '{found}'")
            }
            FenError::InvalidFullmoveNumber { found } => {
                write!(f, "invalid fullmove number field '{found}'")
            }
        }
    }
}

impl std::error::Error for FenError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveParseError {
    TooShort { found: String },
    TooLong { found: String },
    BadSquare { found: String },
    BadPromotion { found: char },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::TooShort { found } => {
                write!(f, "move string '{found}' is too short to be algebraic")
            }
            MoveParseError::TooLong { found } => {
                write!(f, "move string '{found}' is too long to be algebraic")
            }
            MoveParseError::BadSquare { found } => {
                write!(f, "'{found}' is not a valid board square")
            }
            MoveParseError::BadPromotion { found } => {
                write!(f, "'{found}' is not a valid promotion piece letter")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    Fen(FenError),
    MoveParse(MoveParseError),
    IllegalMove { mv: String },
    NoLegalMoves,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Fen(e) => write!(f, "{e}"),
            EngineError::MoveParse(e) => write!(f, "{e}"),
            EngineError::IllegalMove { mv } => write!(f, "'{mv}' is not legal in this position"),
            EngineError::NoLegalMoves => write!(f, "position has no legal moves"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::Fen(e)
    }
}

impl From<MoveParseError> for EngineError {
    fn from(e: MoveParseError) -> Self {
        EngineError::MoveParse(e)
    }
}
