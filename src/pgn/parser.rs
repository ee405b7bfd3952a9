//! Tokenizes PGN text into a [`PgnGame`]. The tokenizer is deliberately
//! tolerant: unrecognized movetext is never a parse error, it is either
//! skipped (a stray move number) or stored verbatim and left for the caller
//! to judge. Do not "fix" this during maintenance — downstream databases
//! depend on malformed-but-recoverable PGN still producing a usable tree.

use std::sync::OnceLock;

use regex::Regex;

use crate::pgn::model::{Headers, PgnChildNode, PgnGame, PgnNode, PgnNodeData};

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\[([A-Za-z0-9][A-Za-z0-9_+#=:-]*)\s+"((?:[^"\\]|\\.)*)"\]"#)
            .expect("header regex is valid")
    })
}

fn movetext_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?P<result>1-0|0-1|1/2-1/2|\*)
            |(?P<lparen>\()
            |(?P<rparen>\))
            |\{(?P<comment>[^}]*)\}
            |;(?P<linecomment>[^\n]*)
            |\$(?P<nag>\d+)
            |(?P<suffix>!!|\?\?|!\?|\?!|!|\?)
            |(?P<nullmove>Z0|0000|@@@@)
            |(?P<castle>O-O-O[+\#]?|O-O[+\#]?|0-0-0[+\#]?|0-0[+\#]?)
            |(?P<drop>[NBRQK]?@[a-h][1-8])
            |(?P<normal>[NBRQK]?[a-h]?[1-8]?x?[a-h][1-8](?:=[NBRQK])?[+\#]?)
            |(?P<movenum>\d+\.+)
            ",
        )
        .expect("movetext regex is valid")
    })
}

fn multi_game_split_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The canonical split point is `\n\s+(?=[)`, but the `regex` crate has
    // no lookahead; instead we match through the opening bracket and put it
    // back when slicing (see `split_games`).
    RE.get_or_init(|| Regex::new(r"\n\s+\[").expect("split regex is valid"))
}

fn unescape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                },
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn normalize_castle(token: &str) -> String {
    let split_at = token.find(['+', '#']);
    let (body, suffix) = match split_at {
        Some(index) => (&token[..index], &token[index..]),
        None => (token, ""),
    };
    let normalized = if body.starts_with('0') {
        body.replace('0', "O")
    } else {
        body.to_owned()
    };
    format!("{normalized}{suffix}")
}

/// One open frame of the movetext parser: a path into the tree identifying
/// the last move placed in this frame (the anchor new moves attach under),
/// whether any move has been placed yet, and comments still waiting for a
/// node to attach to as `starting_comments`.
struct Frame {
    current: Vec<usize>,
    started: bool,
    pending_starting_comments: Vec<String>,
}

fn children_at_mut<'a>(
    root: &'a mut PgnNode<PgnNodeData>,
    path: &[usize],
) -> &'a mut Vec<PgnChildNode<PgnNodeData>> {
    let mut children = &mut root.children;
    for &index in path {
        children = &mut children[index].children;
    }
    children
}

fn node_at_mut<'a>(
    root: &'a mut PgnNode<PgnNodeData>,
    path: &[usize],
) -> Option<&'a mut PgnChildNode<PgnNodeData>> {
    let (&last, prefix) = path.split_last()?;
    let mut children = &mut root.children;
    for &index in prefix {
        children = &mut children[index].children;
    }
    Some(&mut children[last])
}

fn push_move(root: &mut PgnNode<PgnNodeData>, stack: &mut [Frame], san: String) {
    let top = stack.last_mut().expect("root frame always present");
    let parent_path = top.current.clone();
    let starting_comments = std::mem::take(&mut top.pending_starting_comments);
    let children = children_at_mut(root, &parent_path);
    let new_index = children.len();
    children.push(PgnChildNode {
        data: PgnNodeData {
            san,
            starting_comments,
            comments: Vec::new(),
            nags: Vec::new(),
        },
        children: Vec::new(),
    });
    let mut new_path = parent_path;
    new_path.push(new_index);
    top.current = new_path;
    top.started = true;
}

fn attach_comment(
    root: &mut PgnNode<PgnNodeData>,
    stack: &mut [Frame],
    game_comments: &mut Vec<String>,
    text: &str,
) {
    if stack.len() == 1 && !stack[0].started {
        game_comments.push(text.to_owned());
        return;
    }
    let top = stack.last_mut().expect("root frame always present");
    if top.started {
        let path = top.current.clone();
        if let Some(node) = node_at_mut(root, &path) {
            node.data.comments.push(text.to_owned());
        }
    } else {
        top.pending_starting_comments.push(text.to_owned());
    }
}

fn attach_nag(root: &mut PgnNode<PgnNodeData>, stack: &[Frame], code: u8) {
    let top = stack.last().expect("root frame always present");
    if top.started {
        if let Some(node) = node_at_mut(root, &top.current) {
            node.data.nags.push(code);
        }
    }
}

fn tokenize_movetext(movetext: &str, headers: &mut Headers) -> (Vec<String>, PgnNode<PgnNodeData>) {
    let mut root = PgnNode::<PgnNodeData>::default();
    let mut stack = vec![Frame {
        current: Vec::new(),
        started: false,
        pending_starting_comments: Vec::new(),
    }];
    let mut game_comments = Vec::new();

    for caps in movetext_regex().captures_iter(movetext) {
        if let Some(m) = caps.name("result") {
            if stack.len() == 1 && m.as_str() != "*" {
                headers.set("Result", m.as_str());
            }
        } else if caps.name("lparen").is_some() {
            let mut parent = stack.last().expect("root frame always present").current.clone();
            parent.pop();
            stack.push(Frame {
                current: parent,
                started: false,
                pending_starting_comments: Vec::new(),
            });
        } else if caps.name("rparen").is_some() {
            if stack.len() > 1 {
                let _ = stack.pop();
            }
        } else if let Some(m) = caps.name("comment") {
            attach_comment(&mut root, &mut stack, &mut game_comments, m.as_str());
        } else if caps.name("linecomment").is_some() {
            // Rest-of-line comments are discarded; PGN viewers don't
            // preserve them either.
        } else if let Some(m) = caps.name("nag") {
            if let Ok(code) = m.as_str().parse::<u8>() {
                attach_nag(&mut root, &stack, code);
            }
        } else if let Some(m) = caps.name("suffix") {
            let code = match m.as_str() {
                "!" => 1,
                "?" => 2,
                "!!" => 3,
                "??" => 4,
                "!?" => 5,
                "?!" => 6,
                _ => continue,
            };
            attach_nag(&mut root, &stack, code);
        } else if caps.name("nullmove").is_some() {
            push_move(&mut root, &mut stack, "--".to_owned());
        } else if let Some(m) = caps.name("castle") {
            push_move(&mut root, &mut stack, normalize_castle(m.as_str()));
        } else if let Some(m) = caps.name("drop") {
            push_move(&mut root, &mut stack, m.as_str().to_owned());
        } else if let Some(m) = caps.name("normal") {
            push_move(&mut root, &mut stack, m.as_str().to_owned());
        }
        // `movenum` (and anything else the regex never names) carries no
        // tree effect; move numbers are recomputed by the writer.
    }

    (game_comments, root)
}

fn parse_one(text: &str, mut headers: Headers) -> PgnGame {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines();
    let mut moves_start_line = None;
    for line in lines.by_ref() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let mut any_header = false;
        for caps in header_regex().captures_iter(line) {
            any_header = true;
            let key = caps.get(1).expect("group 1 always present on match").as_str();
            let value = unescape_header(caps.get(2).expect("group 2 always present on match").as_str());
            headers.set(key, value);
        }
        if !any_header {
            moves_start_line = Some(line);
            break;
        }
    }

    let mut movetext = String::new();
    if let Some(first) = moves_start_line {
        movetext.push_str(first);
        movetext.push('\n');
    }
    for line in lines {
        movetext.push_str(line);
        movetext.push('\n');
    }

    let (comments, moves) = tokenize_movetext(&movetext, &mut headers);
    PgnGame {
        headers,
        comments,
        moves,
    }
}

fn split_games(text: &str) -> Vec<&str> {
    let re = multi_game_split_regex();
    let mut result = Vec::new();
    let mut start = 0;
    for m in re.find_iter(text) {
        let bracket_pos = m.end() - 1;
        result.push(&text[start..bracket_pos]);
        start = bracket_pos;
    }
    result.push(&text[start..]);
    result
}

impl PgnGame {
    /// Parses a single game from `text`. If `init_headers` is given, its
    /// tags seed the result and are overwritten by any same-named tag found
    /// in `text`.
    #[must_use]
    pub fn parse_pgn(text: &str, init_headers: Option<Headers>) -> Self {
        parse_one(text, init_headers.unwrap_or_default())
    }

    /// Splits `text` on game boundaries (a header block beginning after a
    /// blank-ish gap) and parses each chunk independently.
    #[must_use]
    pub fn parse_multi_game_pgn(text: &str, init_headers: Option<Headers>) -> Vec<Self> {
        split_games(text)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .map(|chunk| parse_one(chunk, init_headers.clone().unwrap_or_default()))
            .collect()
    }
}
