//! A chess engine library: position representation, move generation,
//! rules, and an alpha-beta search with a transposition table, null-move
//! pruning, late move reductions, and a Lazy SMP parallel root search.
//! `engine::EngineContext` is the entry point most callers want.

pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod movegen;
pub mod ordering;
pub mod position;
pub mod rules;
pub mod search;
pub mod tt;
pub mod types;
pub mod uci_info;
pub mod zobrist;

pub use engine::EngineContext;
pub use error::EngineError;
