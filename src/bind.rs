use std::sync::LazyLock;

use regex::Regex;

static RE_BIND_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*bind\b").expect("valid regex"));

/// Parse result of one line's code portion. A tagged union so consumers
/// must handle the non-bind case explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAst {
    /// A recognized `bind <key> <value>` statement.
    Bind(BindStmt),
    /// Anything else.
    Other,
}

/// A parsed bind statement. `key` and `value` hold the unquoted, unescaped
/// text; the quoting flags and leading whitespace are retained so a
/// formatter can reconstruct the statement faithfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindStmt {
    pub key: String,
    pub leading: String,
    pub raw_key_quoted: bool,
    pub raw_value_quoted: bool,
    pub value: String,
}

/// Read one token starting at `from`: either a double-quoted string (escape
/// sequences preserved as written) or a bare word running to the next
/// whitespace. Unterminated quotes consume the rest of the input. Returns
/// the raw token and the index after it.
fn read_token(chars: &[char], from: usize) -> Option<(String, usize)> {
    let mut i = from;
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if i >= chars.len() {
        return None;
    }

    if chars[i] == '"' {
        let mut out = String::new();
        let mut j = i + 1;
        while j < chars.len() {
            let c = chars[j];
            if c == '"' && chars[j - 1] != '\\' {
                return Some((format!("\"{out}\""), j + 1));
            }
            if c == '\\' && j + 1 < chars.len() {
                out.push('\\');
                out.push(chars[j + 1]);
                j += 2;
            } else {
                out.push(c);
                j += 1;
            }
        }
        // Unterminated quote: take the rest.
        return Some((chars[i..].iter().collect(), chars.len()));
    }

    let mut j = i;
    while j < chars.len() && !chars[j].is_whitespace() {
        j += 1;
    }
    Some((chars[i..j].iter().collect(), j))
}

/// Undo the two escape sequences a quoted token may carry.
fn unescape_token(s: &str) -> String {
    s.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// Strip one clean outer quote pair and unescape the contents. Bare tokens
/// pass through trimmed.
fn unquote(raw: &str) -> (String, bool) {
    let t = raw.trim();
    if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
        (unescape_token(&t[1..t.len() - 1]), true)
    } else {
        (t.to_string(), false)
    }
}

/// Parse a bind statement from a line's code portion (comment already
/// removed). Total function: anything that is not a bind yields
/// [`BindAst::Other`]; a bind with a key but no value still parses, with an
/// empty `value`.
pub fn parse_bind(code: &str) -> BindAst {
    if !RE_BIND_START.is_match(code) {
        return BindAst::Other;
    }

    let chars: Vec<char> = code.chars().collect();
    let leading: String = chars.iter().take_while(|c| c.is_whitespace()).collect();
    let after_keyword = leading.chars().count() + "bind".len();

    let Some((raw_key, after_key)) = read_token(&chars, after_keyword) else {
        return BindAst::Other;
    };

    let (key, raw_key_quoted) = unquote(&raw_key);

    let Some((raw_value, _)) = read_token(&chars, after_key) else {
        return BindAst::Bind(BindStmt {
            key,
            leading,
            raw_key_quoted,
            raw_value_quoted: false,
            value: String::new(),
        });
    };

    let (value, raw_value_quoted) = unquote(&raw_value);

    BindAst::Bind(BindStmt {
        key,
        leading,
        raw_key_quoted,
        raw_value_quoted,
        value,
    })
}
