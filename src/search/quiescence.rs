//! Quiescence search (spec §4.9): extends the main search past the
//! depth-0 horizon along capture lines only, to avoid mis-evaluating a
//! tactically unstable position (the horizon effect).

use super::SearchEnv;
use crate::movegen;
use crate::ordering;
use crate::position::Position;
use crate::types::Piece;

fn attacker_piece(pos: &Position, mv: crate::types::Move) -> Piece {
    pos.piece_at(mv.from).map(|(_, p)| p).unwrap_or(Piece::Pawn)
}

pub fn quiescence(
    pos: &mut Position,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    env: &SearchEnv,
) -> i32 {
    if env.control.should_stop() {
        return env.evaluator.evaluate(pos);
    }
    env.control.count_node();

    let stand_pat = env.evaluator.evaluate(pos);
    if maximizing {
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);
    } else {
        if stand_pat <= alpha {
            return alpha;
        }
        beta = beta.min(stand_pat);
    }

    let mut captures = movegen::generate_legal_captures(pos);
    if captures.is_empty() {
        return stand_pat;
    }
    ordering::order_moves(&mut captures, env.ordering, 0, |mv| attacker_piece(pos, mv));

    for mv in captures {
        if env.control.should_stop() {
            break;
        }
        let undo = pos.make_move(&mv);
        let score = quiescence(pos, alpha, beta, !maximizing, env);
        pos.undo_move(&mv, undo);

        if maximizing {
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                return beta;
            }
        } else {
            if score < beta {
                beta = score;
            }
            if beta <= alpha {
                return alpha;
            }
        }
    }

    if maximizing {
        alpha
    } else {
        beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MaterialEvaluator;
    use crate::ordering::OrderingContext;
    use crate::search::control::SearchControl;
    use crate::tt::TranspositionTable;
    use crate::zobrist::ZobristKeys;

    #[test]
    fn quiet_position_returns_stand_pat() {
        let tt = TranspositionTable::new(1);
        let zobrist = ZobristKeys::new();
        let ordering = OrderingContext::new(4);
        let evaluator = MaterialEvaluator::new();
        let control = SearchControl::new();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        let mut pos = Position::startpos();
        let score = quiescence(&mut pos, i32::MIN + 1, i32::MAX - 1, true, &env);
        assert_eq!(score, evaluator.evaluate(&pos));
    }

    #[test]
    fn hanging_queen_capture_is_resolved() {
        let tt = TranspositionTable::new(1);
        let zobrist = ZobristKeys::new();
        let ordering = OrderingContext::new(4);
        let evaluator = MaterialEvaluator::new();
        let control = SearchControl::new();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        // White rook can capture a hanging black queen.
        let mut pos = Position::from_fen("4k3/8/8/8/3q4/8/8/3RK3 w - - 0 1").unwrap();
        let static_eval = evaluator.evaluate(&pos);
        let score = quiescence(&mut pos, i32::MIN + 1, i32::MAX - 1, true, &env);
        assert!(score > static_eval);
    }
}
