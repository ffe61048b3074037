//! Root iterative-deepening driver (spec §4.7): loops depth 1..D, orders
//! root moves once and bubbles the previous iteration's PV move to the
//! front thereafter, and uses an aspiration window once the search is deep
//! enough to make one worthwhile.
//!
//! Per redesign flag 9 (`DESIGN.md`), ANY root score landing outside the
//! aspiration window triggers a full-window re-search of the same depth —
//! not just a one-sided check, which is the bug spec §9 calls out in the
//! source this crate is modeled on.

use std::time::{Duration, Instant};

use super::{SearchEnv, control};
use crate::config::search as cfg;
use crate::movegen;
use crate::ordering;
use crate::position::Position;
use crate::types::{Color, Move, Piece};
use crate::uci_info::{self, Info};

/// Result of a (possibly time- or depth-bounded) root search.
#[derive(Clone, Debug)]
pub struct RootResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth_completed: u32,
}

/// Caller-supplied time budget for the root driver. `start` anchors
/// `elapsed()`; the driver refuses to begin a new depth once `fraction` of
/// `limit` has passed (spec §5's 85-90% rule) and relies on
/// [`crate::search::control::SearchControl`] for per-node cancellation.
#[derive(Clone, Copy)]
pub struct TimeBudget {
    pub start: Instant,
    pub limit: Duration,
}

const STOP_BEFORE_NEW_DEPTH_FRACTION: f64 = 0.88;

#[cfg(feature = "logging")]
fn log_aspiration_research(depth: u32, score: i32, alpha: i32, beta: i32) {
    log::debug!(
        "aspiration re-search at depth {depth}: score {score} outside ({alpha}, {beta})"
    );
}

#[cfg(not(feature = "logging"))]
fn log_aspiration_research(_depth: u32, _score: i32, _alpha: i32, _beta: i32) {}

pub(crate) fn attacker_piece(pos: &Position, mv: Move) -> Piece {
    pos.piece_at(mv.from).map(|(_, p)| p).unwrap_or(Piece::Pawn)
}

/// Searches every root move at `depth` within `(alpha, beta)`, returning
/// the best score and move found. Moves are tried in the order given
/// (already sorted/PV-bubbled by the caller); siblings still narrow
/// `alpha`/`beta` for each other exactly as in the recursive search.
pub(crate) fn search_root_at_depth(
    pos: &mut Position,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    root_moves: &[Move],
    env: &SearchEnv,
) -> (i32, Option<Move>) {
    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
    let mut best_move = None;

    for &mv in root_moves {
        if env.control.should_stop() {
            break;
        }
        let undo = pos.make_move(&mv);
        let score = super::search(pos, depth - 1, alpha, beta, !maximizing, 1, env);
        pos.undo_move(&mv, undo);

        let improved = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if improved {
            best_score = score;
            best_move = Some(mv);
        }

        if maximizing {
            alpha = alpha.max(best_score);
        } else {
            beta = beta.min(best_score);
        }
        if beta <= alpha {
            break;
        }
    }

    (best_score, best_move)
}

/// Runs iterative deepening from `pos` up to `max_depth`, or until
/// `budget` says to stop. Pass `budget: None` for a pure depth-limited
/// search (`find_best_move`); pass `Some(_)` for a timed search
/// (`find_best_move_timed`).
pub fn iterative_deepening(
    pos: &Position,
    max_depth: u32,
    env: &SearchEnv,
    budget: Option<TimeBudget>,
) -> RootResult {
    let maximizing = pos.side_to_move == Color::White;
    let mut root_moves = movegen::generate_legal_moves(pos);
    if root_moves.is_empty() {
        return RootResult {
            best_move: None,
            score: 0,
            depth_completed: 0,
        };
    }

    let mut scratch = pos.clone();
    ordering::order_moves(&mut root_moves, env.ordering, 0, |mv| {
        attacker_piece(&scratch, mv)
    });

    let mut result = RootResult {
        best_move: Some(root_moves[0]),
        score: 0,
        depth_completed: 0,
    };
    let mut previous_score = 0;

    for depth in 1..=max_depth {
        if env.control.should_stop() {
            break;
        }
        if let Some(budget) = budget {
            if control::budget_mostly_spent(budget.start, budget.limit, STOP_BEFORE_NEW_DEPTH_FRACTION)
            {
                break;
            }
        }

        if let Some(pv) = result.best_move {
            if let Some(pos_in_list) = root_moves.iter().position(|m| *m == pv) {
                root_moves.swap(0, pos_in_list);
            }
        }

        let (mut alpha, mut beta) = if depth >= cfg::ASPIRATION_MIN_DEPTH {
            (
                previous_score - cfg::ASPIRATION_WINDOW,
                previous_score + cfg::ASPIRATION_WINDOW,
            )
        } else {
            (i32::MIN + 1, i32::MAX - 1)
        };

        let (score, best_move) = loop {
            let (score, best_move) =
                search_root_at_depth(&mut scratch, depth, alpha, beta, maximizing, &root_moves, env);
            if env.control.should_stop() {
                break (score, best_move);
            }
            let out_of_window = score <= alpha || score >= beta;
            let already_full_window = alpha <= i32::MIN + 1 && beta >= i32::MAX - 1;
            if out_of_window && !already_full_window {
                log_aspiration_research(depth, score, alpha, beta);
                alpha = i32::MIN + 1;
                beta = i32::MAX - 1;
                continue;
            }
            break (score, best_move);
        };

        let Some(best_move) = best_move else {
            break;
        };

        previous_score = score;
        result = RootResult {
            best_move: Some(best_move),
            score,
            depth_completed: depth,
        };
        uci_info::trace_iteration(&Info {
            depth: Some(depth),
            nodes: Some(env.control.nodes()),
            score_cp: Some(score),
            best_move: Some(best_move.to_string()),
            ..Info::default()
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MaterialEvaluator;
    use crate::ordering::OrderingContext;
    use crate::search::control::SearchControl;
    use crate::tt::TranspositionTable;
    use crate::zobrist::ZobristKeys;

    fn fixture() -> (TranspositionTable, ZobristKeys, OrderingContext, MaterialEvaluator, SearchControl) {
        (
            TranspositionTable::new(1),
            ZobristKeys::new(),
            OrderingContext::new(64),
            MaterialEvaluator::new(),
            SearchControl::new(),
        )
    }

    #[test]
    fn finds_mate_in_one_at_root() {
        let (tt, zobrist, ordering, evaluator, control) = fixture();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let result = iterative_deepening(&pos, 3, &env, None);
        assert_eq!(result.best_move.unwrap().to_string(), "a1a8");
    }

    #[test]
    fn stalemate_returns_no_move() {
        let (tt, zobrist, ordering, evaluator, control) = fixture();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = iterative_deepening(&pos, 3, &env, None);
        assert!(result.best_move.is_none());
    }

    #[test]
    fn deeper_iterations_never_regress_depth_completed() {
        let (tt, zobrist, ordering, evaluator, control) = fixture();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        let pos = Position::startpos();
        let result = iterative_deepening(&pos, 3, &env, None);
        assert_eq!(result.depth_completed, 3);
        assert!(result.best_move.is_some());
    }
}
