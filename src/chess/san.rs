//! Standard Algebraic Notation (SAN) read/write for [`Position`]: `Nf3`,
//! `exd5`, `O-O`, `Qxh7#`, and the Crazyhouse drop form `N@f3`.

use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::chess::core::{CastlingSide, Move, Role, Square};
use crate::chess::position::Position;

/// The regex backbone every serious SAN reader reaches for: an optional
/// piece letter, optional file/rank disambiguators, an optional capture
/// marker, the mandatory destination square, and an optional promotion
/// suffix. Castling and drops are matched separately before this ever runs.
fn san_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^
            (?P<role>[NBRQK])?
            (?P<file>[a-h])?
            (?P<rank>[1-8])?
            (?P<capture>x)?
            (?P<to>[a-h][1-8])
            (?:=(?P<promotion>[NBRQK]))?
            $",
        )
        .expect("SAN regex is valid")
    })
}

fn suffix(after: &Position) -> &'static str {
    if after.is_checkmate() {
        "#"
    } else if after.is_check() {
        "+"
    } else {
        ""
    }
}

impl Position {
    /// Legal moves with a piece of `role` landing on `to`: the candidate set
    /// both [`Self::make_san`]'s disambiguator and [`Self::parse_san`]'s
    /// resolver are built from, so the two stay consistent by construction.
    fn san_candidates(&self, role: Role, to: Square) -> Vec<Move> {
        self.legal_move_list()
            .into_iter()
            .filter(|mv| match mv {
                Move::Normal { from, to: dest, .. } => {
                    *dest == to && self.board().piece_at(*from).map(|p| p.role) == Some(role)
                },
                Move::Drop { .. } => false,
            })
            .collect()
    }

    /// The minimal disambiguator (none, file, rank, or full square) that
    /// distinguishes `from` among every other legal move of `role` landing
    /// on `to`.
    fn disambiguator(&self, from: Square, to: Square, role: Role) -> String {
        let others: Vec<Square> = self
            .san_candidates(role, to)
            .into_iter()
            .filter_map(|mv| mv.from())
            .filter(|&candidate| candidate != from)
            .collect();
        if others.is_empty() {
            String::new()
        } else if others.iter().all(|&o| o.file() != from.file()) {
            from.file().to_string()
        } else if others.iter().all(|&o| o.rank() != from.rank()) {
            from.rank().to_string()
        } else {
            from.to_string()
        }
    }

    /// Renders `mv` (assumed legal in this position) as SAN, including the
    /// trailing `+`/`#` check/mate suffix.
    #[must_use]
    pub fn make_san(&self, mv: Move) -> String {
        let mut out = String::new();
        if let Some(side) = self.castle_side_for(mv) {
            out.push_str(match side {
                CastlingSide::King => "O-O",
                CastlingSide::Queen => "O-O-O",
            });
        } else {
            match mv {
                Move::Drop { role, to } => {
                    if role != Role::Pawn {
                        out.push(role.letter());
                    }
                    out.push('@');
                    let _ = write!(out, "{to}");
                },
                Move::Normal {
                    from,
                    to,
                    promotion,
                } => {
                    let role = self
                        .board()
                        .piece_at(from)
                        .map_or(Role::Pawn, |piece| piece.role);
                    let is_capture = self.board().piece_at(to).is_some()
                        || (role == Role::Pawn && Some(to) == self.ep_square());
                    if role == Role::Pawn {
                        if is_capture {
                            let _ = write!(out, "{}", from.file());
                            out.push('x');
                        }
                        let _ = write!(out, "{to}");
                        if let Some(promoted) = promotion {
                            out.push('=');
                            out.push(promoted.letter());
                        }
                    } else {
                        out.push(role.letter());
                        out.push_str(&self.disambiguator(from, to, role));
                        if is_capture {
                            out.push('x');
                        }
                        let _ = write!(out, "{to}");
                    }
                },
            }
        }
        out.push_str(suffix(&self.play_unchecked(mv)));
        out
    }

    /// Parses `raw` against this position's legal moves, returning `None` if
    /// it does not uniquely identify one (malformed, ambiguous, or illegal).
    #[must_use]
    pub fn parse_san(&self, raw: &str) -> Option<Move> {
        let trimmed = raw.trim_end_matches(['+', '#', '!', '?']);
        if matches!(trimmed, "O-O" | "0-0") {
            return self
                .legal_move_list()
                .into_iter()
                .find(|&mv| self.castle_side_for(mv) == Some(CastlingSide::King));
        }
        if matches!(trimmed, "O-O-O" | "0-0-0") {
            return self
                .legal_move_list()
                .into_iter()
                .find(|&mv| self.castle_side_for(mv) == Some(CastlingSide::Queen));
        }
        if let Some((role_part, to_part)) = trimmed.split_once('@') {
            let role = if role_part.is_empty() {
                Role::Pawn
            } else {
                Role::try_from(role_part.chars().next()?).ok()?
            };
            let to = Square::try_from(to_part).ok()?;
            let mv = Move::Drop { role, to };
            return self.is_legal(mv).then_some(mv);
        }

        let caps = san_regex().captures(trimmed)?;
        let role = caps.name("role").map_or(Role::Pawn, |m| {
            Role::try_from(m.as_str().chars().next().expect("one letter")).expect("valid role")
        });
        let to = Square::try_from(caps.name("to")?.as_str()).ok()?;
        let promotion = caps.name("promotion").map(|m| {
            Role::try_from(m.as_str().chars().next().expect("one letter")).expect("valid role")
        });
        let file_hint = caps.name("file").map(|m| m.as_str());
        let rank_hint = caps.name("rank").map(|m| m.as_str());

        let mut candidates: Vec<Move> = self
            .san_candidates(role, to)
            .into_iter()
            .filter(|mv| mv.promotion() == promotion)
            .collect();
        if let Some(file) = file_hint {
            candidates.retain(|mv| mv.from().is_some_and(|from| from.file().to_string() == file));
        }
        if let Some(rank) = rank_hint {
            candidates.retain(|mv| mv.from().is_some_and(|from| from.rank().to_string() == rank));
        }

        match candidates.len() {
            1 => Some(candidates[0]),
            _ => None,
        }
    }

    /// Validates and applies `mv`, returning the resulting position together
    /// with its SAN rendering.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::chess::error::PlayError`] if `mv` is illegal.
    pub fn play_to_san(&self, mv: Move) -> anyhow::Result<(Self, String)> {
        let san = self.make_san(mv);
        let next = self.play(mv)?;
        Ok((next, san))
    }
}
