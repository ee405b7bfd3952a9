//! Typed error kinds for FEN parsing, position validation and move
//! application. Each carries the stable cause token from its variant name so
//! callers can match on failure kind without parsing message text; call
//! sites still build and propagate these through `anyhow::Error` so the
//! human-readable message and any `.context()` chain survive to the top.

/// Why a FEN string failed to parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum FenErrorKind {
    #[error("ERR_BOARD")]
    ErrBoard,
    #[error("ERR_TURN")]
    ErrTurn,
    #[error("ERR_CASTLING")]
    ErrCastling,
    #[error("ERR_EP_SQUARE")]
    ErrEpSquare,
    #[error("ERR_HALFMOVES")]
    ErrHalfmoves,
    #[error("ERR_FULLMOVES")]
    ErrFullmoves,
    #[error("ERR_POCKETS")]
    ErrPockets,
    #[error("ERR_REMAINING_CHECKS")]
    ErrRemainingChecks,
}

/// Why a [`crate::chess::setup::Setup`] failed semantic validation in
/// [`crate::chess::position::Position::from_setup`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum PositionErrorKind {
    #[error("EMPTY")]
    Empty,
    #[error("KINGS")]
    Kings,
    #[error("OPPOSITE_CHECK")]
    OppositeCheck,
    #[error("PAWNS_ON_BACKRANK")]
    PawnsOnBackrank,
    #[error("IMPOSSIBLE_CHECK")]
    ImpossibleCheck,
    #[error("VARIANT")]
    Variant,
}

/// Attempting to play a move that is not in the legal-moves set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("illegal move {mv} in position {fen}")]
pub struct PlayError {
    /// UCI form of the rejected move.
    pub mv: String,
    /// FEN of the position the move was rejected in, to aid debugging.
    pub fen: String,
}
