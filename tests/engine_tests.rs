//! End-to-end scenarios from spec section 8's concrete-scenario table,
//! exercised through the public `EngineContext` surface.

use chess_engine::engine::{self, EngineContext};

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 3";
const MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1";
const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
const EN_PASSANT: &str = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
const CASTLING: &str =
    "r3k2r/pppq1ppp/2np1n2/2b1p3/2B1P3/2NP1N2/PPPQ1PPP/R3K2R w KQkq - 0 1";

#[test]
fn fools_mate_position_has_no_legal_reply() {
    let engine = EngineContext::new();
    assert_eq!(engine.find_best_move(FOOLS_MATE, 2).unwrap(), "0000");
}

#[test]
fn startpos_evaluates_near_zero_and_returns_a_legal_move() {
    let engine = EngineContext::new();
    let mv = engine.find_best_move(STARTPOS, 2).unwrap();
    assert_eq!(mv.len(), 4);
    let score = engine.evaluate_fen(STARTPOS).unwrap();
    assert!(score.abs() < 0.5);
}

#[test]
fn stalemate_returns_the_null_move_sentinel() {
    let engine = EngineContext::new();
    assert_eq!(engine.find_best_move(STALEMATE, 2).unwrap(), "0000");
}

#[test]
fn mate_in_one_is_found() {
    let engine = EngineContext::new();
    assert_eq!(engine.find_best_move(MATE_IN_ONE, 3).unwrap(), "a1a8");
}

#[test]
fn en_passant_square_is_among_the_legal_moves_considered() {
    let pos = chess_engine::position::Position::from_fen(EN_PASSANT).unwrap();
    let moves = chess_engine::movegen::generate_legal_moves(&pos);
    assert!(moves.iter().any(|m| m.to_string() == "e5d6"));
}

#[test]
fn castling_moves_are_legal_from_the_scenario_position() {
    let pos = chess_engine::position::Position::from_fen(CASTLING).unwrap();
    let moves = chess_engine::movegen::generate_legal_moves(&pos);
    let strings: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
    assert!(strings.contains(&"e1g1".to_string()));
    assert!(strings.contains(&"e1c1".to_string()));
}

/// Spec section 8, item 3: the returned move is always a member of the
/// position's legal-move set.
#[test]
fn returned_move_is_always_legal() {
    let positions = [STARTPOS, MATE_IN_ONE, CASTLING, EN_PASSANT];
    for fen in positions {
        let engine = EngineContext::new();
        let mv = engine.find_best_move(fen, 2).unwrap();
        if mv == "0000" {
            continue;
        }
        let pos = chess_engine::position::Position::from_fen(fen).unwrap();
        let legal = chess_engine::movegen::generate_legal_moves(&pos);
        assert!(
            legal.iter().any(|m| m.to_string() == mv),
            "{mv} is not legal in {fen}"
        );
    }
}

/// Spec section 8, item 6: single-threaded search is deterministic across
/// repeated runs with a fresh transposition table each time.
#[test]
fn single_threaded_search_is_deterministic_with_a_fresh_tt() {
    let first = EngineContext::new().find_best_move(CASTLING, 3).unwrap();
    let second = EngineContext::new().find_best_move(CASTLING, 3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn get_cpu_cores_reports_at_least_one() {
    assert!(engine::get_cpu_cores() >= 1);
}

#[test]
fn invalid_fen_is_a_contained_error_not_a_panic() {
    let engine = EngineContext::new();
    assert!(engine.find_best_move("garbage fen string", 2).is_err());
    assert!(engine.evaluate_fen("garbage fen string").is_err());
}
