//! FEN round-trip properties: `Setup::parse_fen(fen).fen() == fen`, and the
//! same property through a full `Position` for standard and variant-
//! extended FEN (pockets, remaining-checks, Shredder castling).

use pabi::chess::position::{Position, Variant};
use pabi::chess::setup::Setup;
use pretty_assertions::assert_eq;

fn check(fen: &str) {
    let setup = Setup::parse_fen(fen).unwrap_or_else(|e| panic!("parsing {fen}: {e}"));
    assert_eq!(setup.fen(), fen);
}

fn check_through_position(fen: &str, variant: Variant) {
    let setup = Setup::parse_fen(fen).unwrap_or_else(|e| panic!("parsing {fen}: {e}"));
    let position =
        Position::from_setup(setup, variant, false).unwrap_or_else(|e| panic!("{fen}: {e}"));
    assert_eq!(position.fen(), fen);
    assert_eq!(position.to_setup().fen(), fen);
}

#[test]
fn standard_positions_round_trip_through_setup_and_position() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34",
        "rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7",
        "r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7",
        "r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24",
    ] {
        check(fen);
        check_through_position(fen, Variant::Standard);
    }
}

#[test]
fn truncated_fen_parses_and_serializes_with_defaults_filled_in() {
    let setup = Setup::parse_fen("8/8/8/8/8/8/8/8").unwrap();
    assert_eq!(setup.fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
}

#[test]
fn shredder_castling_rights_survive_a_round_trip() {
    // Shredder letters (file-based, `AHah`) and classical letters (`KQkq`)
    // both describe the same rook squares when the king sits on its
    // classical e-file; the FEN this engine writes back out may canonicalize
    // to the classical form, so the round-trip property to check here is
    // that the *rights* survive, not the exact letters.
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w AHah - 0 1";
    let setup = Setup::parse_fen(fen).unwrap();
    let reparsed = Setup::parse_fen(&setup.fen()).unwrap();
    assert_eq!(setup, reparsed);
    assert!(setup.castling_rights.contains(pabi::chess::core::Square::A1));
    assert!(setup.castling_rights.contains(pabi::chess::core::Square::H1));
    assert!(setup.castling_rights.contains(pabi::chess::core::Square::A8));
    assert!(setup.castling_rights.contains(pabi::chess::core::Square::H8));
}

#[test]
fn crazyhouse_pockets_round_trip_through_position() {
    check_through_position(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[Pp] w KQkq - 0 1",
        Variant::Crazyhouse,
    );
}

#[test]
fn three_check_remaining_checks_round_trip_through_position() {
    check_through_position(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 +3+3",
        Variant::ThreeCheck,
    );
}

#[test]
fn en_passant_square_survives_round_trip() {
    check("rnbqkbnr/1ppppppp/8/p7/8/N7/PPPPPPPP/R1BQKBNR w KQkq a6 0 2");
}

#[test]
fn rejects_positions_with_the_wrong_side_in_check() {
    // Both kings adjacent is an impossible opposite-side check.
    let setup = Setup::parse_fen("8/8/8/3kK3/8/8/8/8 w - - 0 1").unwrap();
    assert!(Position::from_setup(setup, Variant::Standard, false).is_err());
}

#[test]
fn rejects_pawns_on_the_back_rank() {
    let setup = Setup::parse_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(Position::from_setup(setup, Variant::Standard, false).is_err());
}
