//! Lazy SMP parallel root search (spec §4.10): the root move list is split
//! contiguously across worker threads, each of which calls the ordinary
//! recursive `search` with the full `(-inf, +inf)` window. Threads share
//! one transposition table with no locking (`crate::tt` uses the XOR
//! trick to stay safe under torn reads); killer/history tables are shared
//! the same way. Iterative deepening across depths is managed by this
//! driver, not by the workers themselves, per spec §4.10.

use std::thread;

use super::iterative::{attacker_piece, search_root_at_depth, RootResult, TimeBudget};
use super::{control, SearchEnv};
use crate::config::threads as threads_cfg;
use crate::movegen;
use crate::ordering;
use crate::position::Position;
use crate::types::{Color, Move};

const STOP_BEFORE_NEW_DEPTH_FRACTION: f64 = 0.88;

/// Number of CPU cores visible to this process, per spec §6's
/// `get_cpu_cores`. Falls back to 1 if the platform can't report it.
pub fn available_parallelism() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Resolves the thread count actually used for a parallel search: never
/// more than requested, available cores, the crate's hard cap, or the
/// number of legal root moves (spec §4.10, §5).
fn resolve_thread_count(requested: usize, num_root_moves: usize) -> usize {
    requested
        .max(1)
        .min(available_parallelism())
        .min(threads_cfg::MAX_SEARCH_THREADS)
        .min(num_root_moves.max(1))
}

/// Searches every root move at `depth` by splitting `root_moves` across
/// `num_threads` contiguous slices. Depths 1-2 run single-threaded
/// regardless of `num_threads` (spec §4.10: "At depths 1-2, workers are
/// not used").
fn parallel_search_at_depth(
    base: &Position,
    depth: u32,
    maximizing: bool,
    root_moves: &[Move],
    num_threads: usize,
    env: &SearchEnv,
) -> (i32, Option<Move>) {
    if depth <= 2 || num_threads <= 1 {
        let mut scratch = base.clone();
        return search_root_at_depth(
            &mut scratch,
            depth,
            i32::MIN + 1,
            i32::MAX - 1,
            maximizing,
            root_moves,
            env,
        );
    }

    let chunk_size = root_moves.len().div_ceil(num_threads);
    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
    let mut best_move = None;

    thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .chunks(chunk_size.max(1))
            .map(|chunk| {
                scope.spawn(move || {
                    let mut scratch = base.clone();
                    search_root_at_depth(
                        &mut scratch,
                        depth,
                        i32::MIN + 1,
                        i32::MAX - 1,
                        maximizing,
                        chunk,
                        env,
                    )
                })
            })
            .collect();

        for handle in handles {
            let (score, mv) = handle.join().expect("search worker thread panicked");
            let Some(mv) = mv else { continue };
            let improved = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            if improved {
                best_score = score;
                best_move = Some(mv);
            }
        }
    });

    (best_score, best_move)
}

/// Parallel counterpart to [`super::iterative::iterative_deepening`].
/// `requested_threads` is clamped per spec §4.10/§5 before use.
pub fn parallel_iterative_deepening(
    pos: &Position,
    max_depth: u32,
    requested_threads: usize,
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

    let num_threads = resolve_thread_count(requested_threads, root_moves.len());
    ordering::order_moves(&mut root_moves, env.ordering, 0, |mv| attacker_piece(pos, mv));

    let mut result = RootResult {
        best_move: Some(root_moves[0]),
        score: 0,
        depth_completed: 0,
    };

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
            if let Some(index) = root_moves.iter().position(|m| *m == pv) {
                root_moves.swap(0, index);
            }
        }

        let (score, best_move) =
            parallel_search_at_depth(pos, depth, maximizing, &root_moves, num_threads, env);
        let Some(best_move) = best_move else {
            break;
        };

        result = RootResult {
            best_move: Some(best_move),
            score,
            depth_completed: depth,
        };
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

    #[test]
    fn thread_count_never_exceeds_root_move_count() {
        assert_eq!(resolve_thread_count(8, 1), 1);
    }

    #[test]
    fn thread_count_respects_the_hard_cap() {
        assert!(resolve_thread_count(64, 64) <= threads_cfg::MAX_SEARCH_THREADS);
    }

    #[test]
    fn parallel_search_finds_mate_in_one() {
        let tt = TranspositionTable::new(1);
        let zobrist = ZobristKeys::new();
        let ordering = OrderingContext::new(64);
        let evaluator = MaterialEvaluator::new();
        let control = SearchControl::new();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let result = parallel_iterative_deepening(&pos, 3, 4, &env, None);
        assert_eq!(result.best_move.unwrap().to_string(), "a1a8");
    }

    #[test]
    fn parallel_search_handles_no_legal_moves() {
        let tt = TranspositionTable::new(1);
        let zobrist = ZobristKeys::new();
        let ordering = OrderingContext::new(64);
        let evaluator = MaterialEvaluator::new();
        let control = SearchControl::new();
        let env = SearchEnv {
            tt: &tt,
            zobrist: &zobrist,
            ordering: &ordering,
            evaluator: &evaluator,
            control: &control,
        };
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = parallel_iterative_deepening(&pos, 3, 4, &env, None);
        assert!(result.best_move.is_none());
    }
}
