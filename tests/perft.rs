//! Perft (performance test / move-count verification) for the standard
//! starting position. These counts are the most widely cited chess
//! move-generator regression values; any deviation reliably indicates a
//! move-generation bug.

use pabi::chess::position::{perft, Position};
use pretty_assertions::assert_eq;

#[test]
fn starting_position_perft_depth_1_to_3() {
    let position = Position::new();
    assert_eq!(perft(&position, 1), 20);
    assert_eq!(perft(&position, 2), 400);
    assert_eq!(perft(&position, 3), 8_902);
}

#[test]
fn starting_position_perft_depth_4() {
    let position = Position::new();
    assert_eq!(perft(&position, 4), 197_281);
}

#[test]
fn kiwipete_perft_depth_2_exercises_castling_and_en_passant() {
    use pabi::chess::position::Variant;
    use pabi::chess::setup::Setup;

    let setup = Setup::parse_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .expect("well-formed FEN");
    let position =
        Position::from_setup(setup, Variant::Standard, false).expect("legal position");
    assert_eq!(perft(&position, 1), 48);
    assert_eq!(perft(&position, 2), 2_039);
}
