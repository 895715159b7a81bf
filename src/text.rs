use std::sync::LazyLock;

use regex::Regex;

/// A token located in a line, with character offsets (`start..end`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHit {
    /// End offset, exclusive.
    pub end: usize,
    /// Start offset, inclusive.
    pub start: usize,
    /// The matched token text.
    pub token: String,
}

static RE_FIRST_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_.]+)").expect("valid regex"));

/// True iff the line is a comment: after leading whitespace it starts with
/// `//` or `#`.
pub fn is_comment_line(text: &str) -> bool {
    let t = text.trim_start();
    t.starts_with("//") || t.starts_with('#')
}

/// Split raw text into lines the way editors do: on `\n`, tolerating `\r\n`,
/// keeping a trailing empty line after a final newline.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// First word-like token of a line (`[A-Za-z0-9_.]+`, no `+`/`-`/`~` prefix),
/// so real statement heads like `alias`, `bind`, or `r_fullscreen_gamma` are
/// hit. `None` for empty, whitespace-only, or comment lines.
pub fn first_token(line: &str) -> Option<TokenHit> {
    if line.is_empty() || is_comment_line(line) {
        return None;
    }

    let caps = RE_FIRST_TOKEN.captures(line)?;
    let m = caps.get(1)?;
    let start = line[..m.start()].chars().count();
    let end = start + m.as_str().chars().count();

    Some(TokenHit {
        end,
        start,
        token: m.as_str().to_string(),
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_prefix_char(c: char) -> bool {
    matches!(c, '+' | '-' | '~')
}

/// Token owning the cursor offset `offset` (in characters, clamped to
/// `0..=len`), including a single `+`/`-`/`~` prefix directly before the
/// word, e.g. `+attack`. When the cursor sits between characters the one to
/// its left is consulted first. `None` when no word or prefix character is
/// adjacent.
pub fn token_at(line: &str, offset: usize) -> Option<TokenHit> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return None;
    }
    let len = chars.len();
    let ch = offset.min(len);

    // Cursor on a word character wins; otherwise fall back to the left
    // neighbor (also at end-of-line).
    let mut i = ch;
    if i > 0 && (i == len || !is_word_char(chars[i])) {
        i -= 1;
    }

    let at_token = i < len && (is_word_char(chars[i]) || is_prefix_char(chars[i]));
    let before_prefixed_word =
        i < len && is_prefix_char(chars[i]) && i + 1 < len && is_word_char(chars[i + 1]);
    if !at_token && !before_prefixed_word {
        return None;
    }

    let mut start = i;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    if start > 0 && is_prefix_char(chars[start - 1]) {
        start -= 1;
    }

    let mut end = i;
    while end < len && is_word_char(chars[end]) {
        end += 1;
    }

    let token: String = chars[start..end].iter().collect();
    if token.is_empty() {
        return None;
    }

    Some(TokenHit { end, start, token })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_lines_detected_with_leading_spaces() {
        assert!(is_comment_line("// hi"));
        assert!(is_comment_line("   // hi"));
        assert!(is_comment_line("# hi"));
        assert!(is_comment_line("   # hi"));
        assert!(!is_comment_line("not a comment // tail"));
    }

    #[test]
    fn first_token_none_for_empty_or_comment() {
        assert_eq!(first_token(""), None);
        assert_eq!(first_token("   "), None);
        assert_eq!(first_token(" // x"), None);
        assert_eq!(first_token("# x"), None);
    }

    #[test]
    fn first_token_extracts_leading_word_with_offsets() {
        let hit = first_token("   r_fullscreen_gamma 2.2").unwrap();
        assert_eq!(hit.token, "r_fullscreen_gamma");
        assert_eq!(hit.start, 3);
        assert_eq!(hit.end, 3 + "r_fullscreen_gamma".len());
    }

    #[test]
    fn first_token_accepts_dots_and_underscores() {
        let hit = first_token("   some.var_name 1").unwrap();
        assert_eq!(hit.token, "some.var_name");
    }

    #[test]
    fn token_at_includes_action_prefix() {
        let line = "  +attack; -duck; ~aliasName";
        assert_eq!(token_at(line, 3).unwrap().token, "+attack");
        assert_eq!(token_at(line, 13).unwrap().token, "-duck");
        let tilde = line.find("~aliasName").unwrap();
        assert_eq!(token_at(line, tilde + 1).unwrap().token, "~aliasName");
    }

    #[test]
    fn token_at_reports_offsets_of_prefixed_token() {
        let hit = token_at("  +attack; -duck", 3).unwrap();
        assert_eq!(hit.start, 2);
        assert_eq!(hit.end, 9);
    }

    #[test]
    fn token_at_null_away_from_tokens() {
        assert_eq!(token_at("   ; ; ;   ", 0), None);
        assert_eq!(token_at("", 0), None);
    }

    #[test]
    fn token_at_clamps_cursor_to_line_bounds() {
        let line = "bind \"e\" +use";
        assert_eq!(token_at(line, 0).unwrap().token, "bind");
        assert_eq!(token_at(line, 999).unwrap().token, "+use");
    }

    #[test]
    fn token_at_between_prefix_and_word_captures_both() {
        // Cursor exactly between '+' and 'a'.
        let hit = token_at("+attack", 1).unwrap();
        assert_eq!(hit.token, "+attack");
        assert_eq!(hit.start, 0);
    }

    #[test]
    fn split_lines_handles_crlf_and_trailing_newline() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }
}
