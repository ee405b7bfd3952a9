//! Chess rules library: bitboard move generation, FEN, and PGN. For more
//! information, see
//!
//! - [README] explaining the design and implementation goals
//! - [ARCHITECTURE] for an introduction into the codebase and design choices.
//!
//! The crate covers standard chess plus six variants (Antichess, Atomic,
//! Crazyhouse, King-of-the-Hill, Three-Check, Chess960 castling). It does not
//! implement a chess engine: no search, no evaluation, no UCI driver.
//!
//! [README]: https://github.com/kirillbobyrev/pabi/blob/main/README.md
//! [ARCHITECTURE]: https://github.com/kirillbobyrev/pabi/wiki/ARCHITECTURE.md

// TODO: Gradually move most of warnings to deny.
#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// Performance is extremely important.
#![deny(clippy::perf)]

pub mod chess;
pub mod pgn;
