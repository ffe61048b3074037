//! Move generation: pseudo-legal per-piece generators, a legality filter
//! built on make/undo plus [`crate::rules::is_in_check`], and a
//! captures-only generator for quiescence search.

use crate::error::MoveParseError;
use crate::position::Position;
use crate::rules;
use crate::types::{Color, Move, Piece, Square};

pub type MoveList = Vec<Move>;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const QUEEN_DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

#[inline]
fn offset(sq: Square, dr: i32, df: i32) -> Option<Square> {
    let r = sq.rank() as i32 + dr;
    let f = sq.file() as i32 + df;
    if (0..8).contains(&r) && (0..8).contains(&f) {
        Some(Square(r as usize, f as usize))
    } else {
        None
    }
}

fn push_promotions(moves: &mut MoveList, from: Square, to: Square, captured: Option<Piece>) {
    for &promo in &PROMOTION_PIECES {
        moves.push(Move {
            from,
            to,
            is_castling: false,
            is_en_passant: false,
            is_double_pawn_push: false,
            promotion: Some(promo),
            captured_piece: captured,
        });
    }
}

fn generate_pawn_moves(pos: &Position, sq: Square, color: Color, moves: &mut MoveList) {
    let dir: i32 = match color {
        Color::White => -1,
        Color::Black => 1,
    };
    let start_rank = match color {
        Color::White => 6,
        Color::Black => 1,
    };
    let last_rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };

    if let Some(one_forward) = offset(sq, dir, 0) {
        if pos.piece_at(one_forward).is_none() {
            if one_forward.rank() == last_rank {
                push_promotions(moves, sq, one_forward, None);
            } else {
                moves.push(Move::quiet(sq, one_forward));
            }

            if sq.rank() == start_rank {
                if let Some(two_forward) = offset(sq, dir * 2, 0) {
                    if pos.piece_at(two_forward).is_none() {
                        let mut mv = Move::quiet(sq, two_forward);
                        mv.is_double_pawn_push = true;
                        moves.push(mv);
                    }
                }
            }
        }
    }

    for &df in &[-1i32, 1] {
        let Some(to) = offset(sq, dir, df) else {
            continue;
        };
        if let Some((target_color, target_piece)) = pos.piece_at(to) {
            if target_color != color {
                if to.rank() == last_rank {
                    push_promotions(moves, sq, to, Some(target_piece));
                } else {
                    let mut mv = Move::quiet(sq, to);
                    mv.captured_piece = Some(target_piece);
                    moves.push(mv);
                }
            }
        } else if let Some(ep) = pos.en_passant {
            if ep == to {
                moves.push(Move {
                    from: sq,
                    to,
                    is_castling: false,
                    is_en_passant: true,
                    is_double_pawn_push: false,
                    promotion: None,
                    captured_piece: Some(Piece::Pawn),
                });
            }
        }
    }
}

fn generate_step_moves(
    pos: &Position,
    sq: Square,
    color: Color,
    offsets: &[(i32, i32)],
    moves: &mut MoveList,
) {
    for &(dr, df) in offsets {
        let Some(to) = offset(sq, dr, df) else {
            continue;
        };
        match pos.piece_at(to) {
            None => moves.push(Move::quiet(sq, to)),
            Some((target_color, target_piece)) => {
                if target_color != color {
                    let mut mv = Move::quiet(sq, to);
                    mv.captured_piece = Some(target_piece);
                    moves.push(mv);
                }
            }
        }
    }
}

fn generate_sliding_moves(
    pos: &Position,
    sq: Square,
    color: Color,
    directions: &[(i32, i32)],
    moves: &mut MoveList,
) {
    for &(dr, df) in directions {
        let mut current = sq;
        while let Some(to) = offset(current, dr, df) {
            match pos.piece_at(to) {
                None => {
                    moves.push(Move::quiet(sq, to));
                    current = to;
                }
                Some((target_color, target_piece)) => {
                    if target_color != color {
                        let mut mv = Move::quiet(sq, to);
                        mv.captured_piece = Some(target_piece);
                        moves.push(mv);
                    }
                    break;
                }
            }
        }
    }
}

fn generate_castling_moves(pos: &Position, sq: Square, color: Color, moves: &mut MoveList) {
    let rank = sq.rank();
    if rules::can_castle_kingside(pos, color) {
        moves.push(Move {
            from: sq,
            to: Square(rank, 6),
            is_castling: true,
            is_en_passant: false,
            is_double_pawn_push: false,
            promotion: None,
            captured_piece: None,
        });
    }
    if rules::can_castle_queenside(pos, color) {
        moves.push(Move {
            from: sq,
            to: Square(rank, 2),
            is_castling: true,
            is_en_passant: false,
            is_double_pawn_push: false,
            promotion: None,
            captured_piece: None,
        });
    }
}

/// All pseudo-legal moves for the side to move, including castling (already
/// filtered by the attacked-square pre-check) but before the final
/// "does this leave my own king in check" filter.
pub fn generate_pseudo_legal_moves(pos: &Position, moves: &mut MoveList) {
    let color = pos.side_to_move;
    for (sq, piece_color, piece) in pos.squares_with_piece() {
        if piece_color != color {
            continue;
        }
        match piece {
            Piece::Pawn => generate_pawn_moves(pos, sq, color, moves),
            Piece::Knight => generate_step_moves(pos, sq, color, &KNIGHT_OFFSETS, moves),
            Piece::Bishop => generate_sliding_moves(pos, sq, color, &BISHOP_DIRECTIONS, moves),
            Piece::Rook => generate_sliding_moves(pos, sq, color, &ROOK_DIRECTIONS, moves),
            Piece::Queen => generate_sliding_moves(pos, sq, color, &QUEEN_DIRECTIONS, moves),
            Piece::King => {
                generate_step_moves(pos, sq, color, &KING_OFFSETS, moves);
                generate_castling_moves(pos, sq, color, moves);
            }
        }
    }
}

/// Squares attacked by `by_color`, used only for check/castling-safety
/// tests. Unlike [`generate_pseudo_legal_moves`], pawn diagonals count as
/// attacks even when the target square is empty, since an empty square can
/// still be unsafe for a king to move into.
pub fn generate_pseudo_legal_attacks(pos: &Position, by_color: Color, moves: &mut MoveList) {
    for (sq, piece_color, piece) in pos.squares_with_piece() {
        if piece_color != by_color {
            continue;
        }
        match piece {
            Piece::Pawn => {
                let dir: i32 = match by_color {
                    Color::White => -1,
                    Color::Black => 1,
                };
                for &df in &[-1i32, 1] {
                    if let Some(to) = offset(sq, dir, df) {
                        moves.push(Move::quiet(sq, to));
                    }
                }
            }
            Piece::Knight => generate_attack_steps(pos, sq, &KNIGHT_OFFSETS, moves),
            Piece::King => generate_attack_steps(pos, sq, &KING_OFFSETS, moves),
            Piece::Bishop => generate_attack_slides(pos, sq, &BISHOP_DIRECTIONS, moves),
            Piece::Rook => generate_attack_slides(pos, sq, &ROOK_DIRECTIONS, moves),
            Piece::Queen => generate_attack_slides(pos, sq, &QUEEN_DIRECTIONS, moves),
        }
    }
}

fn generate_attack_steps(pos: &Position, sq: Square, offsets: &[(i32, i32)], moves: &mut MoveList) {
    let _ = pos;
    for &(dr, df) in offsets {
        if let Some(to) = offset(sq, dr, df) {
            moves.push(Move::quiet(sq, to));
        }
    }
}

fn generate_attack_slides(
    pos: &Position,
    sq: Square,
    directions: &[(i32, i32)],
    moves: &mut MoveList,
) {
    for &(dr, df) in directions {
        let mut current = sq;
        while let Some(to) = offset(current, dr, df) {
            moves.push(Move::quiet(sq, to));
            if pos.piece_at(to).is_some() {
                break;
            }
            current = to;
        }
    }
}

/// Pseudo-legal moves filtered by making each one and checking that the
/// mover's own king is not left in check.
pub fn generate_legal_moves(pos: &Position) -> MoveList {
    let mut pseudo = MoveList::new();
    generate_pseudo_legal_moves(pos, &mut pseudo);

    let color = pos.side_to_move;
    let mut legal = MoveList::new();
    let mut scratch = pos.clone();
    for mv in pseudo {
        let undo = scratch.make_move(&mv);
        if !rules::is_in_check(&scratch, color) {
            legal.push(mv);
        }
        scratch.undo_move(&mv, undo);
    }
    legal
}

/// Capture-only pseudo-legal moves (including en passant), legality-filtered
/// the same way as [`generate_legal_moves`]. Used by quiescence search.
pub fn generate_legal_captures(pos: &Position) -> MoveList {
    let mut all = generate_legal_moves(pos);
    all.retain(|mv| mv.is_capture());
    all
}

/// Resolves an external UCI-style move string against `pos`'s legal moves.
/// The move string itself carries no capture/castle/en-passant/promotion
/// information beyond the optional promotion letter (spec §3); those flags
/// are deduced by matching against the legal-move set rather than parsed
/// directly, so the returned `Move` is always internally consistent.
///
/// Returns `Err` when `uci` is not even well-formed algebraic notation
/// (wrong length, out-of-range square, unknown promotion letter). A
/// well-formed string that just doesn't match any legal move in `pos`
/// comes back as `Ok(None)` — that's a semantic rejection, not a parse
/// failure.
pub fn find_legal_move(pos: &Position, uci: &str) -> Result<Option<Move>, MoveParseError> {
    if uci.len() < 4 {
        return Err(MoveParseError::TooShort {
            found: uci.to_string(),
        });
    }
    if uci.len() > 5 {
        return Err(MoveParseError::TooLong {
            found: uci.to_string(),
        });
    }
    let from = Square::from_algebraic(&uci[0..2]).ok_or_else(|| MoveParseError::BadSquare {
        found: uci[0..2].to_string(),
    })?;
    let to = Square::from_algebraic(&uci[2..4]).ok_or_else(|| MoveParseError::BadSquare {
        found: uci[2..4].to_string(),
    })?;
    let promotion = match uci.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        Some(&c) => return Err(MoveParseError::BadPromotion { found: c as char }),
    };
    Ok(generate_legal_moves(pos)
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promotion == promotion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_legal_move_resolves_flags_from_the_position() {
        let pos = Position::startpos();
        let mv = find_legal_move(&pos, "e2e4").unwrap().unwrap();
        assert!(mv.is_double_pawn_push);
    }

    #[test]
    fn find_legal_move_rejects_illegal_strings() {
        let pos = Position::startpos();
        assert_eq!(find_legal_move(&pos, "e2e5").unwrap(), None);
        assert!(find_legal_move(&pos, "zz99").is_err());
    }

    #[test]
    fn find_legal_move_reports_malformed_input_as_a_parse_error() {
        let pos = Position::startpos();
        assert_eq!(
            find_legal_move(&pos, "e2"),
            Err(MoveParseError::TooShort {
                found: "e2".to_string()
            })
        );
        assert_eq!(
            find_legal_move(&pos, "e2e4qq"),
            Err(MoveParseError::TooLong {
                found: "e2e4qq".to_string()
            })
        );
        assert_eq!(
            find_legal_move(&pos, "z9e4"),
            Err(MoveParseError::BadSquare {
                found: "z9".to_string()
            })
        );
        assert_eq!(
            find_legal_move(&pos, "e7e8x"),
            Err(MoveParseError::BadPromotion { found: 'x' })
        );
    }

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let pos = Position::startpos();
        assert_eq!(generate_legal_moves(&pos).len(), 20);
    }

    #[test]
    fn promotion_emits_all_four_choices() {
        let pos = Position::from_fen("8/P6k/8/8/8/8/7p/6K1 w - - 0 1").unwrap();
        let moves = generate_legal_moves(&pos);
        let promo_count = moves
            .iter()
            .filter(|m| m.from == Square(1, 0) && m.to == Square(0, 0))
            .count();
        assert_eq!(promo_count, 4);
    }

    #[test]
    fn en_passant_capture_is_generated() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let moves = generate_legal_moves(&pos);
        assert!(moves
            .iter()
            .any(|m| m.is_en_passant && m.from == Square(3, 4) && m.to == Square(2, 3)));
    }

    #[test]
    fn king_in_check_only_allows_moves_that_resolve_it() {
        let pos = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert!(generate_legal_moves(&pos).is_empty());
    }

    #[test]
    fn capture_generation_only_returns_captures() {
        let pos = Position::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .unwrap();
        let captures = generate_legal_captures(&pos);
        assert!(captures.iter().all(|m| m.is_capture()));
        let full = generate_legal_moves(&pos);
        assert!(captures.len() < full.len());
    }
}
