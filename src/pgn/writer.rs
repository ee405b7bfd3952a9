//! Serializes a [`PgnGame`] back to canonical PGN text: the header block,
//! a blank line, then the move tree walked depth-first with sidelines
//! parenthesized and move numbers elided wherever standard PGN allows it.

use std::fmt::Write as _;

use crate::pgn::model::{PgnChildNode, PgnGame, PgnNodeData};

fn escape_header(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_move(out: &mut Vec<String>, node: &PgnChildNode<PgnNodeData>, ply: u32, force_number: bool) {
    for comment in &node.data.starting_comments {
        out.push(format!("{{{comment}}}"));
    }
    let is_white = ply % 2 == 1;
    let fullmove = ply.div_ceil(2);
    if is_white {
        out.push(format!("{fullmove}."));
    } else if force_number || !node.data.starting_comments.is_empty() {
        out.push(format!("{fullmove}..."));
    }
    out.push(node.data.san.clone());
    for nag in &node.data.nags {
        out.push(format!("${nag}"));
    }
    for comment in &node.data.comments {
        out.push(format!("{{{comment}}}"));
    }
}

/// Writes `children` as a chain: the head move, then each sideline
/// (wrapped in parentheses and recursing into its own continuations), then
/// the head's own continuation. `force_number` carries into the head only;
/// sidelines and post-sideline continuations compute their own.
fn write_chain(out: &mut Vec<String>, children: &[PgnChildNode<PgnNodeData>], ply: u32, force_number: bool) {
    let Some(head) = children.first() else {
        return;
    };
    write_move(out, head, ply, force_number);
    for sideline in &children[1..] {
        out.push("(".to_owned());
        write_move(out, sideline, ply, true);
        write_chain(out, &sideline.children, ply + 1, false);
        out.push(")".to_owned());
    }
    let force_next = children.len() > 1;
    write_chain(out, &head.children, ply + 1, force_next);
}

impl PgnGame {
    /// Renders this game as PGN text: the header block, a blank line, the
    /// movetext, and a trailing newline.
    #[must_use]
    pub fn make_pgn(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.headers.iter() {
            let _ = writeln!(out, "[{key} \"{}\"]", escape_header(value));
        }
        out.push('\n');

        let mut tokens: Vec<String> = self
            .comments
            .iter()
            .map(|comment| format!("{{{comment}}}"))
            .collect();
        write_chain(&mut tokens, &self.moves.children, 1, false);
        tokens.push(self.headers.get("Result").unwrap_or("*").to_owned());

        out.push_str(&tokens.join(" "));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::pgn::model::PgnGame;

    #[test]
    fn round_trips_sideline_with_comment() {
        let source = "1. e4 ( 1. e3 ) 1... e5 ( 1... e6 2. Nf3 { a comment } ) 2. c4 *";
        let game = PgnGame::parse_pgn(source, None);
        let pgn = game.make_pgn();
        let movetext_start = pgn.find("1.").expect("movetext present");
        assert_eq!(pgn[movetext_start..].trim_end(), source);
    }

    #[test]
    fn writes_default_headers_then_blank_line_then_result() {
        let game = PgnGame::default();
        let pgn = game.make_pgn();
        assert!(pgn.starts_with("[Event \"?\"]\n"));
        assert!(pgn.contains("\n\n*\n"));
    }

    #[test]
    fn escapes_quotes_and_backslashes_in_header_values() {
        let mut game = PgnGame::default();
        game.headers.set("Event", "Round \"1\" \\ Final");
        let pgn = game.make_pgn();
        assert!(pgn.contains("[Event \"Round \\\"1\\\" \\\\ Final\"]"));
    }

    #[test]
    fn escaped_header_round_trips_through_parser() {
        let mut game = PgnGame::default();
        game.headers.set("Site", "Quote \" and backslash \\");
        let parsed = PgnGame::parse_pgn(&game.make_pgn(), None);
        assert_eq!(parsed.headers.get("Site"), Some("Quote \" and backslash \\"));
    }
}
