//! The structured sub-language that can appear inside a PGN brace comment:
//! board-drawing shapes (`[%csl ...]`, `[%cal ...]`), clock/elapsed-move-time
//! annotations (`[%clk ...]`, `[%emt ...]`) and engine evaluations
//! (`[%eval ...]`). [`PgnComment::from_pgn`] pulls these out of a raw comment
//! string; [`PgnComment::make_comment`] renders them back in the fixed order
//! viewers expect.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::chess::core::Square;

/// The four board-annotation colors supported by `[%csl]`/`[%cal]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeColor {
    /// `G`
    Green,
    /// `R`
    Red,
    /// `Y`
    Yellow,
    /// `B`
    Blue,
}

impl ShapeColor {
    const fn letter(self) -> char {
        match self {
            Self::Green => 'G',
            Self::Red => 'R',
            Self::Yellow => 'Y',
            Self::Blue => 'B',
        }
    }

    const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'G' => Some(Self::Green),
            'R' => Some(Self::Red),
            'Y' => Some(Self::Yellow),
            'B' => Some(Self::Blue),
            _ => None,
        }
    }
}

/// A single highlighted square (`from == to`, rendered via `[%csl]`) or
/// arrow (`from != to`, rendered via `[%cal]`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PgnCommentShape {
    /// Drawing color.
    pub color: ShapeColor,
    /// Origin square. Equal to `to` for a highlighted square.
    pub from: Square,
    /// Target square.
    pub to: Square,
}

impl PgnCommentShape {
    /// Whether this is a highlighted square rather than an arrow.
    #[must_use]
    pub fn is_circle(self) -> bool {
        self.from == self.to
    }
}

/// An engine evaluation: either a centipawn-scale score or a forced mate in
/// `moves` plies, each with an optional search depth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PgnEvaluation {
    /// A score in pawns, positive favoring White.
    Pawns {
        /// Score in pawns.
        value: f32,
        /// Search depth, if reported.
        depth: Option<u32>,
    },
    /// A forced mate in `moves` plies (negative favors Black).
    Mate {
        /// Signed mate distance in plies.
        moves: i32,
        /// Search depth, if reported.
        depth: Option<u32>,
    },
}

/// A brace comment's free text plus any structured annotations extracted
/// from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PgnComment {
    /// Remaining free text, with every recognized annotation stripped out.
    pub text: Option<String>,
    /// `[%csl]`/`[%cal]` board-drawing shapes, in the order they appeared.
    pub shapes: Vec<PgnCommentShape>,
    /// `[%clk]` clock annotation.
    pub clock: Option<Duration>,
    /// `[%emt]` elapsed-move-time annotation.
    pub emt: Option<Duration>,
    /// `[%eval]` engine evaluation.
    pub eval: Option<PgnEvaluation>,
}

fn annotation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            \[%clk\s+(?P<clk>\d+:\d{2}:\d{2}(?:\.\d+)?)\]
            |\[%emt\s+(?P<emt>\d+:\d{2}:\d{2}(?:\.\d+)?)\]
            |\[%eval\s+(?P<eval>\#?-?\d+(?:\.\d+)?)(?:,(?P<evaldepth>\d+))?\]
            |\[%csl\s+(?P<csl>[^\]]+)\]
            |\[%cal\s+(?P<cal>[^\]]+)\]
            ",
        )
        .expect("comment annotation regex is valid")
    })
}

fn parse_hms(raw: &str) -> Option<Duration> {
    let (hms, fraction) = raw.split_once('.').map_or((raw, None), |(a, b)| (a, Some(b)));
    let mut parts = hms.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    let millis: u64 = match fraction {
        Some(digits) => {
            let mut padded = digits.to_owned();
            while padded.len() < 3 {
                padded.push('0');
            }
            padded.truncate(3);
            padded.parse().ok()?
        },
        None => 0,
    };
    Some(Duration::from_millis(
        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis,
    ))
}

fn render_hms(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let total_secs = total_millis / 1000;
    let millis = total_millis % 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if millis == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

fn parse_eval(raw: &str, depth: Option<u32>) -> Option<PgnEvaluation> {
    if let Some(mate) = raw.strip_prefix('#') {
        mate.parse::<i32>()
            .ok()
            .map(|moves| PgnEvaluation::Mate { moves, depth })
    } else {
        raw.parse::<f32>()
            .ok()
            .map(|value| PgnEvaluation::Pawns { value, depth })
    }
}

fn render_eval(eval: PgnEvaluation) -> String {
    match eval {
        PgnEvaluation::Pawns { value, depth } => {
            let mut out = format!("{value:+.2}");
            if let Some(depth) = depth {
                out.push(',');
                out.push_str(&depth.to_string());
            }
            out
        },
        PgnEvaluation::Mate { moves, depth } => {
            let mut out = format!("#{moves:+}");
            if let Some(depth) = depth {
                out.push(',');
                out.push_str(&depth.to_string());
            }
            out
        },
    }
}

fn parse_shapes(field: &str) -> Vec<PgnCommentShape> {
    field
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let mut chars = entry.chars();
            let color = ShapeColor::from_letter(chars.next()?)?;
            let rest: String = chars.collect();
            match rest.len() {
                4 => {
                    let from = Square::try_from(&rest[0..2]).ok()?;
                    let to = Square::try_from(&rest[2..4]).ok()?;
                    Some(PgnCommentShape { color, from, to })
                },
                2 => {
                    let square = Square::try_from(rest.as_str()).ok()?;
                    Some(PgnCommentShape {
                        color,
                        from: square,
                        to: square,
                    })
                },
                _ => None,
            }
        })
        .collect()
}

fn render_shape(shape: PgnCommentShape) -> String {
    if shape.is_circle() {
        format!("{}{}", shape.color.letter(), shape.from)
    } else {
        format!("{}{}{}", shape.color.letter(), shape.from, shape.to)
    }
}

impl PgnComment {
    /// Extracts every recognized `[%...]` annotation from `raw`, leaving the
    /// rest as free text. Malformed tags that don't match the expected shape
    /// are left untouched in the free text rather than rejected.
    #[must_use]
    pub fn from_pgn(raw: &str) -> Self {
        let mut comment = Self::default();
        let mut text = String::new();
        let mut last_end = 0;
        for caps in annotation_regex().captures_iter(raw) {
            let whole = caps.get(0).expect("outer alternation always matches fully");
            text.push_str(&raw[last_end..whole.start()]);
            last_end = whole.end();
            if let Some(m) = caps.name("clk") {
                comment.clock = parse_hms(m.as_str());
            } else if let Some(m) = caps.name("emt") {
                comment.emt = parse_hms(m.as_str());
            } else if let Some(m) = caps.name("eval") {
                let depth = caps.name("evaldepth").and_then(|d| d.as_str().parse().ok());
                comment.eval = parse_eval(m.as_str(), depth);
            } else if let Some(m) = caps.name("csl") {
                comment.shapes.extend(parse_shapes(m.as_str()));
            } else if let Some(m) = caps.name("cal") {
                comment.shapes.extend(parse_shapes(m.as_str()));
            }
        }
        text.push_str(&raw[last_end..]);
        let trimmed = text.trim();
        comment.text = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        comment
    }

    /// Renders this comment's free text followed by its structured
    /// annotations in the conventional `%csl`, `%cal`, `%eval`, `%emt`,
    /// `%clk` order, ready to be wrapped in `{}` by the caller.
    #[must_use]
    pub fn make_comment(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            parts.push(text.to_owned());
        }
        let (circles, arrows): (Vec<_>, Vec<_>) =
            self.shapes.iter().copied().partition(PgnCommentShape::is_circle);
        if !circles.is_empty() {
            let rendered: Vec<String> = circles.into_iter().map(render_shape).collect();
            parts.push(format!("[%csl {}]", rendered.join(",")));
        }
        if !arrows.is_empty() {
            let rendered: Vec<String> = arrows.into_iter().map(render_shape).collect();
            parts.push(format!("[%cal {}]", rendered.join(",")));
        }
        if let Some(eval) = self.eval {
            parts.push(format!("[%eval {}]", render_eval(eval)));
        }
        if let Some(emt) = self.emt {
            parts.push(format!("[%emt {}]", render_hms(emt)));
        }
        if let Some(clock) = self.clock {
            parts.push(format!("[%clk {}]", render_hms(clock)));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{PgnComment, PgnCommentShape, PgnEvaluation, ShapeColor};
    use crate::chess::core::Square;

    #[test]
    fn extracts_clock_and_leaves_text() {
        let comment = PgnComment::from_pgn("only move [%clk 0:05:23]");
        assert_eq!(comment.text.as_deref(), Some("only move"));
        assert_eq!(comment.clock, Some(std::time::Duration::from_secs(5 * 60 + 23)));
    }

    #[test]
    fn extracts_mate_eval() {
        let comment = PgnComment::from_pgn("[%eval #-3,18]");
        assert_eq!(comment.eval, Some(PgnEvaluation::Mate {
            moves: -3,
            depth: Some(18)
        }));
    }

    #[test]
    fn extracts_pawns_eval() {
        let comment = PgnComment::from_pgn("[%eval 0.25]");
        assert_eq!(
            comment.eval,
            Some(PgnEvaluation::Pawns {
                value: 0.25,
                depth: None
            })
        );
    }

    #[test]
    fn parses_circle_and_arrow_shapes() {
        let comment = PgnComment::from_pgn("[%csl Ge5][%cal Gd2d4,Re5e4]");
        assert_eq!(comment.shapes.len(), 3);
        assert!(comment.shapes[0].is_circle());
        assert_eq!(comment.shapes[0].from, Square::E5);
        assert!(!comment.shapes[1].is_circle());
    }

    #[test]
    fn round_trips_shapes_and_clock() {
        let comment = PgnComment {
            text: Some("good".to_owned()),
            shapes: vec![
                PgnCommentShape {
                    color: ShapeColor::Green,
                    from: Square::E5,
                    to: Square::E5,
                },
                PgnCommentShape {
                    color: ShapeColor::Red,
                    from: Square::D2,
                    to: Square::D4,
                },
            ],
            clock: Some(std::time::Duration::from_millis(323_000)),
            emt: None,
            eval: None,
        };
        assert_eq!(
            comment.make_comment(),
            "good [%csl Ge5] [%cal Rd2d4] [%clk 0:05:23]"
        );
    }
}
