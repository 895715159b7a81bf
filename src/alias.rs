use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::document::{Document, LANGUAGE_ID};

/// Alias name → raw expansion value, in definition order. Redefining a name
/// overwrites its value ("last write wins", like the runtime).
pub type AliasMap = IndexMap<String, String>;

/// Default expansion depth bound for [`AliasIndex::resolve`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// `alias <name> <value>` with quoted or bare name, and a quoted value
/// (backslash escapes allowed) or the bare remainder of the line.
static RE_ALIAS_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*alias\s+(?:"([^"]+)"|([^\s"]+))\s+(?:"((?:[^"\\]|\\.)*)"|(.+))\s*$"#)
        .expect("valid regex")
});

static RE_SEGMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+\-~]?[A-Za-z0-9_.]+)").expect("valid regex"));

/// Result of expanding an alias through its chain of nested aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasResolution {
    /// Chain proving a cycle, present iff a name repeated within the depth
    /// bound. Runs from the repeated name's first occurrence through the
    /// repeat, inclusive on both ends (`[a, b, c, a]`).
    pub cycle: Option<Vec<String>>,
    /// Terminal command tokens (prefix preserved) in execution order.
    pub flattened: Vec<String>,
    /// The root value's own `;`-split segments, one level deep.
    pub immediate_segments: Vec<String>,
    /// Alias names visited during expansion, excluding the root.
    pub steps: Vec<String>,
}

/// Handle returned by [`AliasIndex::on_update`]; pass it back to
/// [`AliasIndex::unsubscribe`] to remove the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type UpdateCallback = Box<dyn Fn(&str)>;

/// Per-document alias maps with nested resolution.
///
/// One map per document URI, rebuilt wholesale on every [`scan`] — readers
/// between scans always observe a complete map, never a partial one.
/// Subscribers are invoked synchronously after each scan or clear with the
/// affected document's URI.
///
/// [`scan`]: AliasIndex::scan
#[derive(Default)]
pub struct AliasIndex {
    by_doc: HashMap<String, AliasMap>,
    next_subscription: u64,
    subscribers: Vec<(u64, UpdateCallback)>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the alias map for a document. Documents in any language
    /// other than the recognized config dialect are ignored.
    pub fn scan(&mut self, document: &dyn Document) {
        if document.language_id() != LANGUAGE_ID {
            return;
        }

        let mut map = AliasMap::new();
        for i in 0..document.line_count() {
            let Some(line) = document.line(i) else {
                continue;
            };
            let Some((name, value)) = parse_alias_definition(line) else {
                continue;
            };
            map.insert(name, value);
        }

        tracing::debug!(uri = document.uri(), aliases = map.len(), "alias index rebuilt");
        self.by_doc.insert(document.uri().to_string(), map);
        self.emit(document.uri());
    }

    /// Drop a document's map entirely, e.g. when the document closes.
    pub fn clear(&mut self, document: &dyn Document) {
        tracing::debug!(uri = document.uri(), "alias index cleared");
        self.by_doc.remove(document.uri());
        self.emit(document.uri());
    }

    /// Current alias map for a document; empty for unknown documents.
    pub fn get_map(&self, document: &dyn Document) -> &AliasMap {
        static EMPTY: LazyLock<AliasMap> = LazyLock::new(AliasMap::new);
        self.by_doc.get(document.uri()).unwrap_or(&EMPTY)
    }

    pub fn is_alias(&self, document: &dyn Document, name: &str) -> bool {
        self.get_map(document).contains_key(name)
    }

    pub fn get_value<'a>(&'a self, document: &dyn Document, name: &str) -> Option<&'a str> {
        self.get_map(document).get(name).map(String::as_str)
    }

    /// Expand `name` through its alias chain, depth-first and left-to-right
    /// across `;`-segments — the order the runtime would execute them.
    ///
    /// Cycles and depth overruns are data, not errors: a repeated name is
    /// reported via [`AliasResolution::cycle`] and stops that branch; once
    /// the chain exceeds `max_depth` hops, deeper expansion is silently
    /// truncated and partial results are kept. `None` iff `name` is not a
    /// known alias.
    pub fn resolve(
        &self,
        document: &dyn Document,
        name: &str,
        max_depth: usize,
    ) -> Option<AliasResolution> {
        let map = self.get_map(document);
        let value = map.get(name)?;
        let immediate_segments = split_segments(value);

        let mut walk = Walk {
            cycle: None,
            flattened: Vec::new(),
            map,
            max_depth,
            root: name,
            seen: HashSet::from([name.to_string()]),
            steps: Vec::new(),
        };

        for segment in &immediate_segments {
            let Some(token) = first_segment_token(segment) else {
                continue;
            };
            walk.visit(token, 1);
            if walk.cycle.is_some() {
                break;
            }
        }

        if let Some(cycle) = &walk.cycle {
            tracing::trace!(root = name, ?cycle, "alias cycle detected");
        }

        Some(AliasResolution {
            cycle: walk.cycle,
            flattened: walk.flattened,
            immediate_segments,
            steps: walk.steps,
        })
    }

    /// Register a callback fired synchronously after every scan or clear,
    /// with the affected document URI. The returned handle removes it.
    pub fn on_update(&mut self, callback: impl Fn(&str) + 'static) -> Subscription {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.subscribers.push((id, Box::new(callback)));
        Subscription(id)
    }

    /// Remove a previously registered update callback.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscribers.retain(|(id, _)| *id != subscription.0);
    }

    fn emit(&self, uri: &str) {
        for (_, callback) in &self.subscribers {
            callback(uri);
        }
    }
}

/// Depth-first expansion state for one `resolve` call.
struct Walk<'a> {
    cycle: Option<Vec<String>>,
    flattened: Vec<String>,
    map: &'a AliasMap,
    max_depth: usize,
    root: &'a str,
    seen: HashSet<String>,
    steps: Vec<String>,
}

impl Walk<'_> {
    fn visit(&mut self, token: &str, depth: usize) {
        if depth > self.max_depth {
            return;
        }

        let bare = token
            .strip_prefix(['+', '-', '~'])
            .unwrap_or(token)
            .to_string();

        let Some(value) = self.map.get(&bare).cloned() else {
            // Terminal command; keep the prefixed spelling.
            self.flattened.push(token.to_string());
            return;
        };

        if self.seen.contains(&bare) {
            self.cycle = Some(self.cycle_chain(&bare));
            return;
        }
        self.seen.insert(bare.clone());
        self.steps.push(bare.clone());

        for segment in split_segments(&value) {
            let Some(next) = first_segment_token(&segment) else {
                continue;
            };
            self.visit(next, depth + 1);
            if self.cycle.is_some() {
                return;
            }
        }
    }

    /// Chain from the repeated name's first visit through the repeat. The
    /// root counts as visited first even though `steps` excludes it.
    fn cycle_chain(&self, repeated: &str) -> Vec<String> {
        let mut chain: Vec<String> = std::iter::once(self.root.to_string())
            .chain(self.steps.iter().cloned())
            .collect();
        let first = chain.iter().position(|n| n == repeated).unwrap_or(0);
        chain.drain(..first);
        chain.push(repeated.to_string());
        chain
    }
}

/// Parse one line as an alias definition, unescaping quoted values.
fn parse_alias_definition(line: &str) -> Option<(String, String)> {
    let caps = RE_ALIAS_DEF.captures(line)?;
    let name = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim())
        .unwrap_or("");
    if name.is_empty() {
        return None;
    }

    let value = match (caps.get(3), caps.get(4)) {
        (Some(quoted), _) => unescape_value(quoted.as_str().trim()),
        (None, Some(bare)) => bare.as_str().trim().to_string(),
        (None, None) => String::new(),
    };

    Some((name.to_string(), value))
}

fn unescape_value(s: &str) -> String {
    s.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// Split an alias value into `;`-delimited, trimmed, quote-stripped segments.
fn split_segments(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(|s| strip_outer_quotes(s.trim()).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_outer_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Leading `[+-~]?[A-Za-z0-9_.]+` run of a segment — the unit treated as
/// either a nested alias reference or a terminal command.
fn first_segment_token(segment: &str) -> Option<&str> {
    RE_SEGMENT_TOKEN
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
