//! Move-generation correctness via perft node counts, plus FEN round-trips.

use chess_engine::movegen;
use chess_engine::position::Position;

fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = movegen::generate_legal_moves(pos);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut scratch = pos.clone();
    let mut nodes = 0;
    for mv in moves {
        let undo = scratch.make_move(&mv);
        nodes += perft(&scratch, depth - 1);
        scratch.undo_move(&mv, undo);
    }
    nodes
}

struct PerftCase {
    name: &'static str,
    fen: &'static str,
    counts: &'static [u64],
}

const PERFT_CASES: &[PerftCase] = &[
    PerftCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        counts: &[20, 400, 8902],
    },
    PerftCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        counts: &[48, 2039, 97862],
    },
    PerftCase {
        // Position 3 from the standard perft test suite: isolated kings and
        // rooks, exercises en-passant-heavy pawn structures.
        name: "endgame_pawns",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        counts: &[14, 191, 2812],
    },
];

#[test]
fn perft_matches_known_node_counts() {
    for case in PERFT_CASES {
        let pos = Position::from_fen(case.fen).unwrap();
        for (i, &expected) in case.counts.iter().enumerate() {
            let depth = (i + 1) as u32;
            assert_eq!(
                perft(&pos, depth),
                expected,
                "{} perft({depth}) mismatch",
                case.name
            );
        }
    }
}

#[test]
fn fen_round_trips_through_parse_and_render() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        "8/8/8/8/8/8/8/K6k w - - 0 1",
    ];
    for fen in fens {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }
}

#[test]
fn castling_moves_are_present_when_rights_and_squares_allow() {
    let pos = Position::from_fen(
        "r3k2r/pppq1ppp/2np1n2/2b1p3/2B1P3/2NP1N2/PPPQ1PPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    let moves = movegen::generate_legal_moves(&pos);
    let has = |from: &str, to: &str| {
        moves.iter().any(|m| {
            m.from == chess_engine::types::Square::from_algebraic(from).unwrap()
                && m.to == chess_engine::types::Square::from_algebraic(to).unwrap()
                && m.is_castling
        })
    };
    assert!(has("e1", "g1"));
    assert!(has("e1", "c1"));
}

#[test]
fn en_passant_capture_is_offered_when_available() {
    let pos = Position::from_fen(
        "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
    )
    .unwrap();
    let moves = movegen::generate_legal_moves(&pos);
    assert!(moves.iter().any(|m| {
        m.is_en_passant
            && m.from == chess_engine::types::Square::from_algebraic("e5").unwrap()
            && m.to == chess_engine::types::Square::from_algebraic("d6").unwrap()
    }));
}
