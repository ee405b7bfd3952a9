//! End-to-end scenarios for each rule variant: the parts of play that are
//! genuinely different from standard chess rather than shared plumbing
//! already covered by `perft.rs` and `san.rs`.

use pabi::chess::core::{Color, Move, Role, Square, Termination};
use pabi::chess::position::{Position, Variant};
use pabi::chess::setup::Setup;
use pretty_assertions::assert_eq;

fn position(fen: &str, variant: Variant) -> Position {
    Position::from_setup(Setup::parse_fen(fen).expect("valid FEN"), variant, false)
        .expect("legal position")
}

#[test]
fn antichess_forces_captures_when_one_is_available() {
    // White pawn on d4 can capture the black pawn on e5; every other pawn
    // move must disappear from the legal set because a capture exists.
    let pos = position(
        "rnbqkbnr/pppp1ppp/8/4p3/3P4/8/PPP1PPPP/RNBQKBNR w - - 0 1",
        Variant::Antichess,
    );
    let moves = pos.legal_moves();
    assert_eq!(moves.len(), 1, "only the forced capture should remain: {moves:?}");
    let d4 = moves.get(&Square::D4).cloned().unwrap_or_default();
    assert!(d4.contains(Square::E5));
    assert!(!d4.contains(Square::D5));
}

#[test]
fn antichess_side_with_no_moves_wins() {
    // Black has a single pawn left and no legal moves against White's king
    // and rook; in Antichess that is a win for the side to move, not a loss.
    let pos = position("8/8/8/8/8/6k1/8/R6K b - - 0 1", Variant::Antichess);
    assert!(pos.legal_move_list().is_empty());
    let outcome = pos.outcome().expect("game over");
    assert_eq!(outcome.winner, Some(Color::Black));
    assert_eq!(outcome.termination, Termination::VariantWin);
}

#[test]
fn atomic_explosion_clears_non_pawns_around_the_capture_square() {
    // White's rook on d1 captures the knight on d5; every non-pawn piece
    // within one square of d5 (including the capturing rook itself and the
    // adjacent black king on e6) is removed, while the pawn on c6 survives.
    let pos = position("8/8/2p1k3/3n4/8/8/8/3RK3 w - - 0 1", Variant::Atomic);
    let capture = Move::Normal {
        from: Square::D1,
        to: Square::D5,
        promotion: None,
    };
    assert!(pos.is_legal(capture));
    let after = pos.play(capture).unwrap();
    assert_eq!(after.board().piece_at(Square::D5), None);
    assert_eq!(
        after.board().piece_at(Square::C6).map(|p| p.role),
        Some(Role::Pawn)
    );
    assert_eq!(after.board().king_of(Color::White), Some(Square::E1));
    assert_eq!(after.board().king_of(Color::Black), None);
    let outcome = after.outcome().expect("exploding the opponent's king ends the game");
    assert_eq!(outcome.winner, Some(Color::White));
    assert_eq!(outcome.termination, Termination::VariantLoss);
}

#[test]
fn atomic_move_that_would_explode_the_movers_own_king_is_illegal() {
    let pos = position("4k3/8/8/8/8/8/3n4/3RK3 w - - 0 1", Variant::Atomic);
    let suicidal = Move::Normal {
        from: Square::D1,
        to: Square::D2,
        promotion: None,
    };
    assert!(!pos.is_legal(suicidal));
}

#[test]
fn crazyhouse_capture_enters_the_pocket_and_can_be_dropped() {
    let pos = position(
        "r1bqk2r/pp2ppbp/2n2np1/2pp4/3P4/2N1PN2/PPP1BPPP/R1BQK2R w KQkq - 0 1",
        Variant::Crazyhouse,
    );
    let capture = Move::Normal {
        from: Square::D4,
        to: Square::C5,
        promotion: None,
    };
    assert!(pos.is_legal(capture));
    let after_capture = pos.play(capture).unwrap();
    assert_eq!(
        after_capture
            .pockets()
            .expect("crazyhouse carries pockets")
            .count(Color::White, Role::Pawn),
        1
    );
    // Black replies so it is White's turn again; drops are only offered for
    // the side to move.
    let reply = Move::Normal {
        from: Square::A7,
        to: Square::A6,
        promotion: None,
    };
    assert!(after_capture.is_legal(reply));
    let after = after_capture.play(reply).unwrap();

    let drops = after.legal_drops(Role::Pawn);
    assert!(drops.contains(Square::C5), "c5 is now empty after the capture");
    assert!(!drops.contains(Square::F8), "pawns can never drop on a backrank");

    let drop = Move::Drop {
        role: Role::Pawn,
        to: Square::C5,
    };
    assert!(after.is_legal(drop));
    let dropped = after.play(drop).unwrap();
    assert_eq!(
        dropped.board().piece_at(Square::C5).map(|p| p.role),
        Some(Role::Pawn)
    );
    assert_eq!(
        dropped.pockets().expect("still crazyhouse").count(Color::White, Role::Pawn),
        0
    );
}

#[test]
fn crazyhouse_promoted_piece_reverts_to_a_pawn_on_capture() {
    // Black has a promoted queen on g2 (originally a pawn); white's king
    // capturing it must pocket a pawn, not a queen.
    let mut setup = Setup::parse_fen("4k3/8/8/8/8/8/6q1/5K2 w - - 0 1").unwrap();
    setup.board = setup
        .board
        .without_piece_at(Square::G2)
        .with_piece_at(
            Square::G2,
            pabi::chess::core::Piece {
                color: Color::Black,
                role: Role::Queen,
                promoted: true,
            },
        );
    let pos = Position::from_setup(setup, Variant::Crazyhouse, false).unwrap();
    let capture = Move::Normal {
        from: Square::F1,
        to: Square::G2,
        promotion: None,
    };
    assert!(pos.is_legal(capture));
    let after = pos.play(capture).unwrap();
    assert_eq!(
        after.pockets().unwrap().count(Color::White, Role::Pawn),
        1
    );
    assert_eq!(after.pockets().unwrap().count(Color::White, Role::Queen), 0);
}

#[test]
fn king_of_the_hill_wins_by_reaching_a_center_square() {
    let pos = position("8/8/8/3K4/8/6k1/8/8 w - - 0 1", Variant::KingOfTheHill);
    assert!(pos.outcome().is_none());
    let step = Move::Normal {
        from: Square::D5,
        to: Square::D4,
        promotion: None,
    };
    assert!(pos.is_legal(step));
    let after = pos.play(step).unwrap();
    let outcome = after.outcome().expect("king reached a center square");
    assert_eq!(outcome.winner, Some(Color::White));
    assert_eq!(outcome.termination, Termination::VariantWin);
}

#[test]
fn three_check_win_by_giving_the_third_check() {
    let mut setup = Setup::parse_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    setup.remaining_checks = Some((1, 3));
    let pos = Position::from_setup(setup, Variant::ThreeCheck, false).unwrap();
    let check = Move::Normal {
        from: Square::A1,
        to: Square::A8,
        promotion: None,
    };
    assert!(pos.is_legal(check));
    let after = pos.play(check).unwrap();
    assert!(after.is_check());
    let outcome = after.outcome().expect("third check ends the game");
    assert_eq!(outcome.winner, Some(Color::White));
    assert_eq!(outcome.termination, Termination::VariantWin);
}

#[test]
fn chess960_castling_reaches_the_standard_squares_from_either_encoding() {
    // Black king on b8, rooks on a8 (queenside) and e8 (kingside).
    let pos = position(
        "rk2r3/pppbnppp/3p2n1/P2Pp3/4P2q/R5NP/1PP2PP1/1KNQRB2 b Kkq - 0 1",
        Variant::Standard,
    );
    let file_encoded = Move::Normal {
        from: Square::B8,
        to: Square::G8,
        promotion: None,
    };
    let rook_encoded = Move::Normal {
        from: Square::B8,
        to: Square::E8,
        promotion: None,
    };
    assert!(pos.is_legal(file_encoded));
    assert!(pos.is_legal(rook_encoded));
    for mv in [file_encoded, rook_encoded] {
        let after = pos.play(mv).unwrap();
        assert_eq!(after.board().king_of(Color::Black), Some(Square::G8));
        assert_eq!(
            after.board().piece_at(Square::F8).map(|p| p.role),
            Some(Role::Rook)
        );
    }
}
