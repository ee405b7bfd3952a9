//! Black-box SAN read/write scenarios, including Scholar's Mate end to end.

use pabi::chess::position::Position;
use pretty_assertions::assert_eq;

#[test]
fn scholars_mate_produces_expected_san_sequence() {
    let mut position = Position::new();
    let expected = ["e4", "Nc6", "Bc4", "e6", "Qh5", "Ne5", "Qxf7#"];
    let mut rendered = Vec::new();
    for &san in &expected {
        let mv = position.parse_san(san).unwrap_or_else(|| panic!("{san} should be legal"));
        let (next, printed) = position.play_to_san(mv).expect("legal move plays");
        rendered.push(printed);
        position = next;
    }
    assert_eq!(rendered, expected);
    assert!(position.is_checkmate());
    assert_eq!(position.outcome().map(|o| o.to_pgn_result()), Some("1-0"));
}

#[test]
fn san_round_trips_through_every_opening_reply() {
    let position = Position::new();
    for mv in position.legal_move_list() {
        let san = position.make_san(mv);
        let parsed = position.parse_san(&san).unwrap_or_else(|| panic!("{san} should reparse"));
        assert_eq!(parsed, mv);
    }
}
