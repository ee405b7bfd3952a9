//! PGN (Portable Game Notation) reading and writing: a variation-tree
//! [`PgnGame`] model, a tolerant tokenizing parser, a canonical-form
//! writer, and the structured comment sub-language
//! (`%clk`/`%emt`/`%eval`/`%csl`/`%cal`). This module knows nothing about
//! chess rules: SAN tokens are stored and emitted as plain text, never
//! validated against a [`crate::chess::position::Position`] (callers that
//! want that should feed each move through
//! [`crate::chess::position::Position::parse_san`] themselves).

pub mod comment;
pub mod model;
pub mod parser;
pub mod writer;

pub use comment::{PgnComment, PgnCommentShape, PgnEvaluation, ShapeColor};
pub use model::{Headers, PgnChildNode, PgnGame, PgnNode, PgnNodeData};
