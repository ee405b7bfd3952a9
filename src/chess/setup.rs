//! [`Setup`]: the complete position descriptor decoded straight off a FEN
//! string, before any rule validation. [`crate::chess::position::Position`]
//! is built from a `Setup` plus a ruleset.

use std::fmt;

use anyhow::{anyhow, Context};
use strum::IntoEnumIterator;

use crate::chess::board::Board;
use crate::chess::core::{Color, File, Piece, Rank, Role, Square};
use crate::chess::error::FenErrorKind;
use crate::chess::square_set::SquareSet;

/// Per-color, per-role piece counts held off the board (Crazyhouse only).
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pockets {
    counts: [[u8; 6]; 2],
}

impl Pockets {
    /// Number of pieces of `role` in `color`'s pocket.
    #[must_use]
    pub const fn count(self, color: Color, role: Role) -> u8 {
        self.counts[color as usize][role as usize]
    }

    /// Returns a copy with one more `piece` in its owner's pocket. A
    /// `promoted` piece re-enters as a plain pawn, per Crazyhouse rules.
    #[must_use]
    pub fn with_added(mut self, piece: Piece) -> Self {
        let role = if piece.promoted { Role::Pawn } else { piece.role };
        self.counts[piece.color as usize][role as usize] += 1;
        self
    }

    /// Returns a copy with one `role` piece removed from `color`'s pocket,
    /// or `None` if there isn't one.
    #[must_use]
    pub fn with_removed(mut self, color: Color, role: Role) -> Option<Self> {
        let count = &mut self.counts[color as usize][role as usize];
        if *count == 0 {
            return None;
        }
        *count -= 1;
        Some(self)
    }

    fn fen(self) -> String {
        let mut result = String::new();
        for color in [Color::White, Color::Black] {
            for role in Role::iter() {
                let piece = Piece::new(color, role);
                for _ in 0..self.count(color, role) {
                    result.push(piece.letter());
                }
            }
        }
        result
    }

    fn parse_fen(field: &str) -> anyhow::Result<Self> {
        let mut pockets = Self::default();
        for ch in field.chars() {
            let piece = Piece::try_from(ch)
                .context("invalid pocket piece")
                .map_err(|e| e.context(FenErrorKind::ErrPockets))?;
            pockets = pockets.with_added(piece);
        }
        Ok(pockets)
    }
}

/// Complete, rule-agnostic position state, as decoded from a FEN string.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Setup {
    #[allow(missing_docs)]
    pub board: Board,
    #[allow(missing_docs)]
    pub turn: Color,
    /// Squares of rooks that have not yet moved and so retain castling
    /// rights (not a right per se, but the set this library derives rights
    /// from via [`crate::chess::castles::Castles`]).
    pub castling_rights: SquareSet,
    /// Target square of a pawn double push last move, if any.
    pub ep_square: Option<Square>,
    #[allow(missing_docs)]
    pub halfmoves: u32,
    #[allow(missing_docs)]
    pub fullmoves: u32,
    /// Crazyhouse pockets, `None` outside that variant.
    pub pockets: Option<Pockets>,
    /// Three-Check remaining-check counters `(white, black)`, `None` outside
    /// that variant.
    pub remaining_checks: Option<(u8, u8)>,
}

impl Setup {
    /// The standard starting position.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            board: Board::starting(),
            turn: Color::White,
            castling_rights: SquareSet::from_squares(&[
                Square::A1,
                Square::H1,
                Square::A8,
                Square::H8,
            ]),
            ep_square: None,
            halfmoves: 0,
            fullmoves: 1,
            pockets: None,
            remaining_checks: None,
        }
    }

    /// Drops all pockets (used when a position leaves Crazyhouse context).
    #[must_use]
    pub fn discard_pockets(mut self) -> Self {
        self.pockets = None;
        self
    }

    fn parse_castling_field(field: &str, board: &Board) -> anyhow::Result<SquareSet> {
        if field == "-" {
            return Ok(SquareSet::empty());
        }
        let mut rights = SquareSet::empty();
        for ch in field.chars() {
            let color = if ch.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let backrank = color.backrank();
            let upper = ch.to_ascii_uppercase();
            let square = match upper {
                'K' | 'Q' => {
                    let king_file = board.king_of(color).map(Square::file);
                    let rooks_on_backrank = (0..8).filter_map(|f| {
                        let sq = Square::new(File::try_from(f).ok()?, backrank);
                        if board.piece_at(sq) == Some(Piece::new(color, Role::Rook)) {
                            Some(sq)
                        } else {
                            None
                        }
                    });
                    let candidate = match (upper, king_file) {
                        ('K', Some(kf)) => rooks_on_backrank
                            .filter(|sq| sq.file() > kf)
                            .max_by_key(|sq| sq.file()),
                        ('Q', Some(kf)) => rooks_on_backrank
                            .filter(|sq| sq.file() < kf)
                            .min_by_key(|sq| sq.file()),
                        ('K', None) => rooks_on_backrank.max_by_key(|sq| sq.file()),
                        _ => rooks_on_backrank.min_by_key(|sq| sq.file()),
                    };
                    candidate.unwrap_or_else(|| {
                        Square::new(if upper == 'K' { File::H } else { File::A }, backrank)
                    })
                },
                'A'..='H' => {
                    let file = File::try_from(upper as u8 - b'A')?;
                    Square::new(file, backrank)
                },
                _ => {
                    return Err(anyhow!("unexpected castling letter '{ch}'")
                        .context(FenErrorKind::ErrCastling))
                },
            };
            rights |= SquareSet::from(square);
        }
        Ok(rights)
    }

    fn castling_fen(self) -> String {
        if self.castling_rights.is_empty() {
            return "-".to_owned();
        }
        let is_classical =
            |color: Color| self.board.king_of(color).map(Square::file) == Some(File::E);
        let mut result = String::new();
        for color in [Color::White, Color::Black] {
            let backrank = color.backrank();
            let king_file = self.board.king_of(color).map(Square::file);
            let mut files: Vec<File> = self
                .castling_rights
                .iter()
                .filter(|sq| sq.rank() == backrank)
                .map(Square::file)
                .collect();
            files.sort_unstable_by(|a, b| b.cmp(a));
            for file in files {
                let letter = if is_classical(color) {
                    match king_file {
                        Some(kf) if file > kf => 'K',
                        _ => 'Q',
                    }
                } else {
                    (b'A' + file as u8) as char
                };
                result.push(if color == Color::White {
                    letter.to_ascii_uppercase()
                } else {
                    letter.to_ascii_lowercase()
                });
            }
        }
        if result.is_empty() {
            "-".to_owned()
        } else {
            result
        }
    }

    /// Parses a complete FEN string. Tolerant of missing trailing fields:
    /// absent turn defaults to White, castling to none, ep to none,
    /// halfmoves to 0, fullmoves to 1.
    ///
    /// # Errors
    ///
    /// Returns an error tagged with the relevant `ERR_*` cause token if a
    /// present field is malformed.
    pub fn parse_fen(fen: &str) -> anyhow::Result<Self> {
        let mut fields = fen.split_whitespace();
        let board_field = fields
            .next()
            .ok_or_else(|| anyhow!("empty FEN").context(FenErrorKind::ErrBoard))?;
        let (board_field, pockets_field) = match board_field.find('[') {
            Some(start) => {
                let end = board_field.find(']').ok_or_else(|| {
                    anyhow!("unterminated pocket field").context(FenErrorKind::ErrPockets)
                })?;
                (&board_field[..start], Some(&board_field[start + 1..end]))
            },
            None => (board_field, None),
        };
        let board = Board::parse_fen(board_field)?;

        let turn = match fields.next() {
            Some(field) => {
                Color::try_from(field).map_err(|e| e.context(FenErrorKind::ErrTurn))?
            },
            None => Color::White,
        };
        let castling_rights = match fields.next() {
            Some(field) => Self::parse_castling_field(field, &board)?,
            None => SquareSet::empty(),
        };
        let ep_square = match fields.next() {
            Some("-") | None => None,
            Some(field) => Some(
                Square::try_from(field).map_err(|e| e.context(FenErrorKind::ErrEpSquare))?,
            ),
        };
        let halfmoves = match fields.next() {
            Some(field) => field.parse::<u32>().map_err(|_| {
                anyhow!("not a non-negative integer: '{field}'").context(FenErrorKind::ErrHalfmoves)
            })?,
            None => 0,
        };
        let fullmoves = match fields.next() {
            Some(field) => {
                let value: u32 = field.parse().map_err(|_| {
                    anyhow!("not a positive integer: '{field}'")
                        .context(FenErrorKind::ErrFullmoves)
                })?;
                if value == 0 {
                    return Err(anyhow!("fullmoves must be >= 1, got 0")
                        .context(FenErrorKind::ErrFullmoves));
                }
                value
            },
            None => 1,
        };
        let pockets = pockets_field.map(Pockets::parse_fen).transpose()?;
        let remaining_checks = match fields.next() {
            Some(field) => Some(Self::parse_remaining_checks(field)?),
            None => None,
        };

        Ok(Self {
            board,
            turn,
            castling_rights,
            ep_square,
            halfmoves,
            fullmoves,
            pockets,
            remaining_checks,
        })
    }

    fn parse_remaining_checks(field: &str) -> anyhow::Result<(u8, u8)> {
        let field = field.strip_prefix('+').unwrap_or(field);
        let (white, black) = field.split_once('+').ok_or_else(|| {
            anyhow!("expected '+w+b' form, got '{field}'").context(FenErrorKind::ErrRemainingChecks)
        })?;
        Ok((
            white.parse().map_err(|_| {
                anyhow!("invalid white count: '{white}'")
                    .context(FenErrorKind::ErrRemainingChecks)
            })?,
            black.parse().map_err(|_| {
                anyhow!("invalid black count: '{black}'")
                    .context(FenErrorKind::ErrRemainingChecks)
            })?,
        ))
    }

    /// Renders the complete FEN string for this setup.
    #[must_use]
    pub fn fen(self) -> String {
        let mut board_field = self.board.fen();
        if let Some(pockets) = self.pockets {
            board_field.push('[');
            board_field.push_str(&pockets.fen());
            board_field.push(']');
        }
        let ep = self
            .ep_square
            .map_or_else(|| "-".to_owned(), |sq| sq.to_string());
        let mut fen = format!(
            "{board_field} {} {} {ep} {} {}",
            self.turn,
            self.castling_fen(),
            self.halfmoves,
            self.fullmoves
        );
        if let Some((white, black)) = self.remaining_checks {
            fen.push_str(&format!(" +{white}+{black}"));
        }
        fen
    }
}

impl fmt::Debug for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}
