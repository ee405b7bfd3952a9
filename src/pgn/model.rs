//! The PGN data model: an ordered header list, a recursive move tree where
//! the mainline is "always follow child 0" and everything else is a
//! sideline, and the annotations ([`PgnNodeData`]) attached to each move.

/// The Seven Tag Roster, in the order every PGN writer emits it, with the
/// placeholder values conventionally used when a field is unknown.
const DEFAULT_HEADERS: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// An ordered, case-sensitive key/value list of PGN tag pairs. Order is
/// preserved on insertion so a freshly parsed game round-trips with its
/// headers in their original order, new keys are appended after the Seven
/// Tag Roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Default for Headers {
    fn default() -> Self {
        Self(
            DEFAULT_HEADERS
                .iter()
                .map(|&(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        )
    }
}

impl Headers {
    /// An empty header list, with none of the Seven Tag Roster defaults.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// The value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Inserts or overwrites `key`, preserving its original position on
    /// update and appending it otherwise.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.into(),
            None => self.0.push((key, value.into())),
        }
    }

    /// Iterates tag pairs in their stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The annotations carried by one move in the tree: its SAN text, any
/// comments that precede or follow it, and its NAGs (`$1`, `$2`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PgnNodeData {
    /// SAN text of the move (`"Nf3"`, `"O-O"`, `"N@f3"`, or `"--"` for a
    /// null move).
    pub san: String,
    /// Comments that appeared before this move in the source, attached to
    /// the move that follows them rather than the one that precedes them.
    pub starting_comments: Vec<String>,
    /// Comments that appeared immediately after this move.
    pub comments: Vec<String>,
    /// Numeric Annotation Glyphs attached to this move.
    pub nags: Vec<u8>,
}

/// One move in the tree and everything that continues from it: `children[0]`
/// is the mainline continuation, `children[1..]` are sidelines branching at
/// this same ply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgnChildNode<T> {
    /// This move's own annotations.
    pub data: T,
    /// Continuations from this move (mainline first, sidelines after).
    pub children: Vec<PgnChildNode<T>>,
}

/// The root of a move tree. Carries no data of its own: `children[0]` is the
/// game's first move, `children[1..]` are alternatives to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgnNode<T> {
    /// The first move (mainline) and any alternatives to it.
    pub children: Vec<PgnChildNode<T>>,
}

impl<T> Default for PgnNode<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
        }
    }
}

impl<T> PgnNode<T> {
    /// Iterates the mainline: `children[0]`, then its `children[0]`, and so
    /// on, ignoring every sideline.
    pub fn mainline(&self) -> impl Iterator<Item = &T> {
        let mut current = self.children.first();
        std::iter::from_fn(move || {
            let node = current?;
            current = node.children.first();
            Some(&node.data)
        })
    }

    /// Walks the tree depth-first, rebuilding it with `f`.
    ///
    /// `f(ctx, data, child_index)` is called once per node (in the order a
    /// recursive pre-order walk would visit them) and returns either
    /// `None`, which prunes that node and its entire subtree, or
    /// `Some((next_ctx, new_data))`, which keeps the node with `new_data`
    /// and threads `next_ctx` into its descendants. Implemented with an
    /// explicit stack rather than recursion so pathologically deep PGN
    /// variation trees cannot blow the call stack.
    pub fn transform<C, U, F>(&self, ctx: C, mut f: F) -> PgnNode<U>
    where
        F: FnMut(&C, &T, usize) -> Option<(C, U)>,
    {
        struct Frame<'a, T, C, U> {
            children: &'a [PgnChildNode<T>],
            index: usize,
            ctx: C,
            own_data: Option<U>,
            built: Vec<PgnChildNode<U>>,
        }

        let mut stack = vec![Frame {
            children: self.children.as_slice(),
            index: 0,
            ctx,
            own_data: None,
            built: Vec::new(),
        }];

        loop {
            let top = stack.last_mut().expect("stack never empties mid-walk");
            if top.index < top.children.len() {
                let child_index = top.index;
                top.index += 1;
                let child = &top.children[child_index];
                if let Some((next_ctx, new_data)) = f(&top.ctx, &child.data, child_index) {
                    stack.push(Frame {
                        children: child.children.as_slice(),
                        index: 0,
                        ctx: next_ctx,
                        own_data: Some(new_data),
                        built: Vec::new(),
                    });
                }
                continue;
            }

            let finished = stack.pop().expect("checked non-empty above");
            match finished.own_data {
                Some(data) => {
                    let node = PgnChildNode {
                        data,
                        children: finished.built,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.built.push(node),
                        None => unreachable!("root frame carries no own_data"),
                    }
                },
                None => {
                    return PgnNode {
                        children: finished.built,
                    };
                },
            }
        }
    }
}

/// A complete game: tag pairs, any comments before the first move, and the
/// move tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgnGame {
    /// Tag pairs (`Event`, `Site`, ... plus any supplemental tags).
    pub headers: Headers,
    /// Comments appearing before the first move, attached to the game
    /// rather than to any particular move.
    pub comments: Vec<String>,
    /// The move tree.
    pub moves: PgnNode<PgnNodeData>,
}

impl Default for PgnGame {
    fn default() -> Self {
        Self {
            headers: Headers::default(),
            comments: Vec::new(),
            moves: PgnNode::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Headers, PgnChildNode, PgnNode, PgnNodeData};

    #[test]
    fn default_headers_are_seven_tag_roster() {
        let headers = Headers::default();
        assert_eq!(headers.get("Event"), Some("?"));
        assert_eq!(headers.get("Result"), Some("*"));
        assert_eq!(headers.get("ECO"), None);
    }

    #[test]
    fn set_preserves_position_on_update() {
        let mut headers = Headers::default();
        headers.set("Site", "London");
        headers.set("ECO", "C50");
        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![
            "Event", "Site", "Date", "Round", "White", "Black", "Result", "ECO"
        ]);
        assert_eq!(headers.get("Site"), Some("London"));
    }

    fn leaf(san: &str) -> PgnChildNode<PgnNodeData> {
        PgnChildNode {
            data: PgnNodeData {
                san: san.to_owned(),
                ..PgnNodeData::default()
            },
            children: Vec::new(),
        }
    }

    #[test]
    fn mainline_follows_child_zero() {
        let tree = PgnNode {
            children: vec![
                PgnChildNode {
                    children: vec![leaf("e5")],
                    ..leaf("e4")
                },
                leaf("c4"),
            ],
        };
        let sans: Vec<&str> = tree.mainline().map(|d| d.san.as_str()).collect();
        assert_eq!(sans, vec!["e4", "e5"]);
    }

    #[test]
    fn transform_can_prune_and_rewrite() {
        let tree = PgnNode {
            children: vec![
                PgnChildNode {
                    children: vec![leaf("e5"), leaf("c5")],
                    ..leaf("e4")
                },
                leaf("d4"),
            ],
        };
        let upper = tree.transform((), |(), data, _index| {
            if data.san == "c5" {
                None
            } else {
                Some(((), data.san.to_uppercase()))
            }
        });
        let root_sans: Vec<&String> = upper.children.iter().map(|c| &c.data).collect();
        assert_eq!(root_sans, vec!["E4", "D4"]);
        assert_eq!(upper.children[0].children.len(), 1);
        assert_eq!(upper.children[0].children[0].data, "E5");
    }
}
