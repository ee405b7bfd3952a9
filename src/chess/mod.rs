//! Implementation of chess rules, its rule variants and specifics: board
//! representation, move generation, FEN, and SAN.

pub mod attacks;
pub mod board;
pub mod castles;
pub mod core;
pub mod error;
pub mod position;
pub mod san;
pub mod setup;
pub mod square_set;

pub use core::{CastlingSide, Color, Move, Outcome, Piece, Role};
pub use position::{Position, Variant};
pub use setup::Setup;
pub use square_set::SquareSet;
