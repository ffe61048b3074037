//! Board position: 8x8 grid of optional pieces, side to move, castling
//! rights, en-passant target, and the move counters FEN carries. Internally
//! the grid is stored rank-8-first (`board[0]` is the 8th rank) to mirror
//! FEN's own field order; `Square`'s rank 0 = rank 8 convention (spec.md §3)
//! already matches that row order, so [`Position::array_index`] is a
//! straight `(rank, file)` pass-through rather than a flip.

use crate::error::FenError;
use crate::types::{CastlingRights, Color, Move, NullUndoInfo, Piece, Square, UndoInfo};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: [[Option<(Color, Piece)>; 8]; 8],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    pub fn empty() -> Position {
        Position {
            board: [[None; 8]; 8],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn startpos() -> Position {
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("startpos FEN is well-formed")
    }

    #[inline]
    fn array_index(sq: Square) -> (usize, usize) {
        (sq.rank(), sq.file())
    }

    #[inline]
    fn square_of(row: usize, col: usize) -> Square {
        Square(row, col)
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let (r, f) = Self::array_index(sq);
        self.board[r][f]
    }

    fn set_piece_at(&mut self, sq: Square, piece: Option<(Color, Piece)>) {
        let (r, f) = Self::array_index(sq);
        self.board[r][f] = piece;
    }

    pub fn squares_with_piece(&self) -> impl Iterator<Item = (Square, Color, Piece)> + '_ {
        (0..8).flat_map(move |r| {
            (0..8).filter_map(move |f| {
                self.board[r][f].map(|(c, p)| (Self::square_of(r, f), c, p))
            })
        })
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.squares_with_piece()
            .find(|&(_, c, p)| c == color && p == Piece::King)
            .map(|(sq, _, _)| sq)
    }

    pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields { found: fields.len() });
        }

        let mut board = [[None; 8]; 8];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }
        for (row, rank_str) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                    if col > 8 {
                        return Err(FenError::TooManyFiles { rank: row, files: col });
                    }
                } else {
                    let (color, piece) = Piece::from_fen_char(c)
                        .ok_or(FenError::InvalidPiece { found: c })?;
                    if col >= 8 {
                        return Err(FenError::TooManyFiles { rank: row, files: col + 1 });
                    }
                    board[row][col] = Some((color, piece));
                    col += 1;
                }
            }
            if col < 8 {
                return Err(FenError::TooFewFiles { rank: row, files: col });
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove { found: other.to_string() }),
        };

        let mut castling = CastlingRights::none();
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => castling.white_kingside = true,
                    'Q' => castling.white_queenside = true,
                    'k' => castling.black_kingside = true,
                    'q' => castling.black_queenside = true,
                    other => return Err(FenError::InvalidCastling { found: other }),
                }
            }
        }

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(Square::from_algebraic(fields[3]).ok_or_else(|| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?)
        };

        let halfmove_clock = match fields.get(4) {
            Some(s) => s.parse().map_err(|_| FenError::InvalidHalfmoveClock {
                found: s.to_string(),
            })?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(s) => s.parse().map_err(|_| FenError::InvalidFullmoveNumber {
                found: s.to_string(),
            })?,
            None => 1,
        };

        Ok(Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        Self::parse_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for row in 0..8 {
            let mut s = String::new();
            let mut empty_run = 0u32;
            for col in 0..8 {
                match self.board[row][col] {
                    None => empty_run += 1,
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            s.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        s.push(piece.to_fen_char(color));
                    }
                }
            }
            if empty_run > 0 {
                s.push_str(&empty_run.to_string());
            }
            ranks.push(s);
        }
        let board_field = ranks.join("/");

        let stm = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling.white_kingside {
            castling.push('K');
        }
        if self.castling.white_queenside {
            castling.push('Q');
        }
        if self.castling.black_kingside {
            castling.push('k');
        }
        if self.castling.black_queenside {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{board_field} {stm} {castling} {ep} {} {}",
            self.halfmove_clock, self.fullmove_number
        )
    }

    /// Applies `mv` to the position, returning the information needed to
    /// reverse it. Assumes `mv` is pseudo-legal for the side to move; does
    /// not itself check that the resulting position leaves its own king
    /// safe (that is the move generator's job).
    pub fn make_move(&mut self, mv: &Move) -> UndoInfo {
        let moving = self
            .piece_at(mv.from)
            .expect("make_move called with no piece on the from-square");
        let (moving_color, moving_piece) = moving;

        let mut captured_piece = self.piece_at(mv.to);

        if mv.is_en_passant {
            // White moves toward rank 0 (rank 8); the captured pawn sits one
            // rank back toward White's own side, i.e. at a higher rank index.
            let cap_rank = match moving_color {
                Color::White => mv.to.rank() + 1,
                Color::Black => mv.to.rank() - 1,
            };
            let cap_sq = Square(cap_rank, mv.to.file());
            captured_piece = self.piece_at(cap_sq);
            self.set_piece_at(cap_sq, None);
        }

        let previous_castling = self.castling;
        let previous_en_passant = self.en_passant;
        let previous_halfmove_clock = self.halfmove_clock;

        if moving_piece == Piece::King {
            match moving_color {
                Color::White => {
                    self.castling.white_kingside = false;
                    self.castling.white_queenside = false;
                }
                Color::Black => {
                    self.castling.black_kingside = false;
                    self.castling.black_queenside = false;
                }
            }
        }

        Self::clear_rights_if_rook_moved(&mut self.castling, moving_color, mv.from);
        if let Some((captured_color, Piece::Rook)) = captured_piece {
            Self::clear_rights_if_rook_moved(&mut self.castling, captured_color, mv.to);
        }

        if mv.is_castling {
            let rank = mv.from.rank();
            if mv.to.file() == 6 {
                let rook = self.piece_at(Square(rank, 7));
                self.set_piece_at(Square(rank, 5), rook);
                self.set_piece_at(Square(rank, 7), None);
            } else if mv.to.file() == 2 {
                let rook = self.piece_at(Square(rank, 0));
                self.set_piece_at(Square(rank, 3), rook);
                self.set_piece_at(Square(rank, 0), None);
            }
        }

        self.set_piece_at(mv.to, None);
        self.set_piece_at(mv.from, None);

        let placed = match mv.promotion {
            Some(promoted) => (moving_color, promoted),
            None => (moving_color, moving_piece),
        };
        self.set_piece_at(mv.to, Some(placed));

        self.en_passant = if moving_piece == Piece::Pawn
            && mv.from.rank().abs_diff(mv.to.rank()) == 2
        {
            let mid = (mv.from.rank() + mv.to.rank()) / 2;
            Some(Square(mid, mv.from.file()))
        } else {
            None
        };

        self.halfmove_clock = if moving_piece == Piece::Pawn || mv.is_capture() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();

        UndoInfo {
            captured_piece,
            previous_en_passant,
            previous_castling,
            previous_halfmove_clock,
        }
    }

    pub fn undo_move(&mut self, mv: &Move, undo: UndoInfo) {
        self.side_to_move = self.side_to_move.opposite();
        if self.side_to_move == Color::Black {
            self.fullmove_number -= 1;
        }

        let moving_color = self.side_to_move;
        let moved_piece = match mv.promotion {
            Some(_) => Piece::Pawn,
            None => {
                self.piece_at(mv.to)
                    .expect("undo_move: to-square should still hold the moved piece")
                    .1
            }
        };

        self.set_piece_at(mv.from, Some((moving_color, moved_piece)));
        self.set_piece_at(mv.to, None);

        if mv.is_en_passant {
            let cap_rank = match moving_color {
                Color::White => mv.to.rank() + 1,
                Color::Black => mv.to.rank() - 1,
            };
            self.set_piece_at(Square(cap_rank, mv.to.file()), undo.captured_piece);
        } else {
            self.set_piece_at(mv.to, undo.captured_piece);
        }

        if mv.is_castling {
            let rank = mv.from.rank();
            if mv.to.file() == 6 {
                let rook = self.piece_at(Square(rank, 5));
                self.set_piece_at(Square(rank, 7), rook);
                self.set_piece_at(Square(rank, 5), None);
            } else if mv.to.file() == 2 {
                let rook = self.piece_at(Square(rank, 3));
                self.set_piece_at(Square(rank, 0), rook);
                self.set_piece_at(Square(rank, 3), None);
            }
        }

        self.castling = undo.previous_castling;
        self.en_passant = undo.previous_en_passant;
        self.halfmove_clock = undo.previous_halfmove_clock;
    }

    /// Toggles side to move with no piece movement, for null-move pruning.
    pub fn make_null_move(&mut self) -> NullUndoInfo {
        let previous_en_passant = self.en_passant;
        self.en_passant = None;
        self.side_to_move = self.side_to_move.opposite();
        NullUndoInfo { previous_en_passant }
    }

    pub fn undo_null_move(&mut self, undo: NullUndoInfo) {
        self.side_to_move = self.side_to_move.opposite();
        self.en_passant = undo.previous_en_passant;
    }

    fn clear_rights_if_rook_moved(rights: &mut CastlingRights, color: Color, sq: Square) {
        match (color, sq.rank(), sq.file()) {
            (Color::White, 7, 0) => rights.white_queenside = false,
            (Color::White, 7, 7) => rights.white_kingside = false,
            (Color::Black, 0, 0) => rights.black_queenside = false,
            (Color::Black, 0, 7) => rights.black_kingside = false,
            _ => {}
        }
    }
}
