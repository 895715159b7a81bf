use std::sync::LazyLock;

use regex::Regex;

use crate::bind::{parse_bind, BindAst, BindStmt};
use crate::split::{split_comment_smart, SplitLine};
use crate::text::split_lines;

static RE_ALIAS_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*alias\b").expect("valid regex"));

static RE_COMMENT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//\s*").expect("valid regex"));

/// Where trailing comments land after a formatted bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(from = "CommentColumnRepr")]
pub enum CommentColumn {
    /// Two spaces after the code.
    Auto,
    /// A fixed 1-based column, with a minimum two-space gap when the code
    /// already runs past it.
    Column(u32),
}

/// Raw settings shape: a number, or any string (read as auto).
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CommentColumnRepr {
    Fixed(u32),
    Keyword(String),
}

impl From<CommentColumnRepr> for CommentColumn {
    fn from(repr: CommentColumnRepr) -> Self {
        match repr {
            CommentColumnRepr::Fixed(column) => CommentColumn::Column(column),
            CommentColumnRepr::Keyword(_) => CommentColumn::Auto,
        }
    }
}

/// Formatter configuration. Defaults mirror the editor settings: aligned
/// bind groups, auto comment placement, at most one blank line, alias
/// spacing normalization on.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    /// Align consecutive bind lines into key/value columns.
    pub align_binds: bool,
    /// Trailing-comment placement policy.
    pub comment_column: CommentColumn,
    /// Normalize `;` spacing in alias values (outside strings).
    pub format_alias_spacing: bool,
    /// Cap on consecutive blank lines.
    pub max_blank_lines: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            align_binds: true,
            comment_column: CommentColumn::Auto,
            format_alias_spacing: true,
            max_blank_lines: 1,
        }
    }
}

/// One preprocessed line: code/comment split done, alias spacing applied,
/// bind statement parsed.
struct Row<'a> {
    bind: BindAst,
    code: String,
    comment: Option<&'a str>,
}

impl Row<'_> {
    fn is_blank(&self) -> bool {
        self.code.trim().is_empty() && self.comment.is_none()
    }
}

/// Normalize `;` spacing in an alias statement to exactly `"; "` and
/// collapse whitespace runs, leaving quoted regions untouched. Non-alias
/// code is only right-trimmed. The in-string state toggles on unescaped
/// `"` exactly like [`split_comment_smart`].
pub fn normalize_alias_value_spacing(code: &str) -> String {
    if !RE_ALIAS_START.is_match(code) {
        return code.trim_end().to_string();
    }

    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' && (i == 0 || chars[i - 1] != '\\') {
            in_string = !in_string;
            out.push(c);
            i += 1;
        } else if !in_string && c == ';' {
            out.push_str("; ");
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
        } else if !in_string && c.is_whitespace() {
            out.push(' ');
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
        } else {
            out.push(c);
            i += 1;
        }
    }

    out.trim_end().to_string()
}

/// Format a whole document: per-line normalization, bind-group alignment
/// with enforced quoting, then the blank-line cap. Pure and idempotent —
/// formatting already-formatted text returns it unchanged, which is what
/// lets a formatting provider skip the edit when nothing would change.
pub fn format_cfg(text: &str, options: &FormatOptions) -> String {
    let lines = split_lines(text);

    let rows: Vec<Row<'_>> = lines
        .iter()
        .map(|line| {
            let SplitLine { code, comment } = split_comment_smart(line);
            let code = if options.format_alias_spacing {
                normalize_alias_value_spacing(code)
            } else {
                code.trim_end().to_string()
            };
            Row {
                bind: parse_bind(&code),
                code,
                comment,
            }
        })
        .collect();

    let mut rendered: Vec<String> = Vec::with_capacity(rows.len());
    let mut i = 0;
    while i < rows.len() {
        if rows[i].is_blank() {
            rendered.push(String::new());
            i += 1;
            continue;
        }

        if matches!(rows[i].bind, BindAst::Bind(_)) {
            let start = i;
            while i < rows.len() && matches!(rows[i].bind, BindAst::Bind(_)) {
                i += 1;
            }
            flush_bind_group(&rows[start..i], options, &mut rendered);
            continue;
        }

        rendered.push(reconstruct_non_bind(&rows[i]));
        i += 1;
    }

    apply_blank_line_cap(rendered, options.max_blank_lines)
}

/// Render a run of consecutive bind lines, optionally padding values to a
/// shared column derived from the longest key in the group.
fn flush_bind_group(group: &[Row<'_>], options: &FormatOptions, out: &mut Vec<String>) {
    let pad_to = if options.align_binds {
        group
            .iter()
            .filter_map(|row| match &row.bind {
                BindAst::Bind(stmt) => Some(stmt.key.chars().count()),
                BindAst::Other => None,
            })
            .max()
    } else {
        None
    };

    for row in group {
        if let BindAst::Bind(stmt) = &row.bind {
            out.push(render_bind(stmt, row.comment, options.comment_column, pad_to));
        }
    }
}

/// Render one bind with enforced double-quoting on key and value.
fn render_bind(
    stmt: &BindStmt,
    comment: Option<&str>,
    comment_column: CommentColumn,
    pad_to: Option<usize>,
) -> String {
    let key_out = format!("\"{}\"", escape_for_quotes(&stmt.key));
    let value_out = format!("\"{}\"", escape_for_quotes(&stmt.value));

    let key_len = stmt.key.chars().count();
    let gap = match pad_to {
        Some(max) => 1 + max.saturating_sub(key_len),
        None => 1,
    };

    let mut line = format!("bind {key_out}{}{value_out}", " ".repeat(gap));

    if let Some(comment) = comment {
        let normalized = RE_COMMENT_MARKER.replace(comment, "// ");
        match comment_column {
            CommentColumn::Auto => {
                line.push_str("  ");
            },
            CommentColumn::Column(target) => {
                let target = usize::try_from(target.max(1)).unwrap_or(usize::MAX);
                let current = line.chars().count() + 1; // 1-based
                if current < target {
                    line.push_str(&" ".repeat(target - current));
                } else {
                    line.push_str("  ");
                }
            },
        }
        line.push_str(&normalized);
    }

    line.trim_end().to_string()
}

/// Reassemble a non-bind line: code, then the comment two spaces behind it.
fn reconstruct_non_bind(row: &Row<'_>) -> String {
    let code = row.code.trim_end();
    match row.comment {
        Some(comment) if !comment.is_empty() => {
            if code.is_empty() {
                comment.to_string()
            } else {
                format!("{code}  {comment}")
            }
        },
        _ => code.to_string(),
    }
}

/// Collapse runs of blank lines beyond the cap; strip trailing whitespace
/// from every line on the way out.
fn apply_blank_line_cap(lines: Vec<String>, max_blank_lines: usize) -> String {
    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    let mut blank_run = 0usize;

    for line in lines {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= max_blank_lines {
                kept.push(String::new());
            }
        } else {
            blank_run = 0;
            kept.push(line.trim_end().to_string());
        }
    }

    kept.join("\n")
}

/// Escape backslashes and embedded quotes for a double-quoted rendering.
fn escape_for_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn alias_spacing_normalized_outside_strings_only() {
        let n = normalize_alias_value_spacing("alias a b;  c;d");
        assert_eq!(n, "alias a b; c; d");

        // Semicolons inside a quoted value are untouched.
        let n = normalize_alias_value_spacing(r#"alias x "a;b"; y"#);
        assert_eq!(n, r#"alias x "a;b"; y"#);
    }

    #[test]
    fn alias_spacing_collapses_interior_whitespace_runs() {
        let n = normalize_alias_value_spacing("alias   jt   b;c");
        assert_eq!(n, "alias jt b; c");
    }

    #[test]
    fn non_alias_code_is_only_right_trimmed() {
        assert_eq!(normalize_alias_value_spacing("echo a;b   "), "echo a;b");
    }

    #[test]
    fn formats_binds_with_enforced_quoting() {
        let out = format_cfg("bind w +forward", &FormatOptions::default());
        assert_eq!(out, r#"bind "w" "+forward""#);
    }

    #[test]
    fn aligns_bind_group_on_longest_key() {
        let src = "bind w +forward\nbind \"mouse1\" +attack\nbind d \"+moveright\"";
        let out = format_cfg(src, &FormatOptions::default());
        assert_eq!(
            out,
            [
                r#"bind "w"      "+forward""#,
                r#"bind "mouse1" "+attack""#,
                r#"bind "d"      "+moveright""#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn uniform_keys_share_a_single_space_column() {
        let src = "bind w +forward\nbind \"a\" \"+moveleft\"\nbind d \"+moveright\"";
        let out = format_cfg(src, &FormatOptions::default());
        assert_eq!(
            out,
            [
                r#"bind "w" "+forward""#,
                r#"bind "a" "+moveleft""#,
                r#"bind "d" "+moveright""#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn groups_align_independently_across_breaks() {
        let src = [
            "bind w +forward",
            "bind \"mouse1\" +attack",
            "",
            "bind k +jump",
        ]
        .join("\n");
        let out = format_cfg(&src, &FormatOptions::default());
        assert_eq!(
            out,
            [
                r#"bind "w"      "+forward""#,
                r#"bind "mouse1" "+attack""#,
                "",
                r#"bind "k" "+jump""#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn comments_reattach_two_spaces_after_code() {
        let out = format_cfg("bind w +forward // move", &FormatOptions::default());
        assert_eq!(out, r#"bind "w" "+forward"  // move"#);
    }

    #[test]
    fn fixed_comment_column_pads_to_target() {
        let options = FormatOptions {
            comment_column: CommentColumn::Column(30),
            ..FormatOptions::default()
        };
        let out = format_cfg("bind w +forward // move", &options);
        let comment_at = out.find("//").unwrap();
        assert_eq!(comment_at, 29); // 1-based column 30
    }

    #[test]
    fn fixed_comment_column_keeps_two_space_minimum() {
        let options = FormatOptions {
            comment_column: CommentColumn::Column(5),
            ..FormatOptions::default()
        };
        let out = format_cfg("bind w +forward // move", &options);
        assert_eq!(out, r#"bind "w" "+forward"  // move"#);
    }

    #[test]
    fn comment_inside_quoted_value_stays_in_the_value() {
        let out = format_cfg(
            r#"bind "k" "say //hello" // outside"#,
            &FormatOptions::default(),
        );
        assert_eq!(out, r#"bind "k" "say //hello"  // outside"#);
    }

    #[test]
    fn escaped_quotes_round_trip_through_the_formatter() {
        let src = r#"bind "k" "say \"hi\"""#;
        let out = format_cfg(src, &FormatOptions::default());
        assert_eq!(out, src);
    }

    #[test]
    fn blank_lines_collapse_to_cap() {
        let out = format_cfg("bind w +forward\n\n\n\nbind k +jump", &FormatOptions::default());
        assert_eq!(
            out,
            [r#"bind "w" "+forward""#, "", r#"bind "k" "+jump""#].join("\n")
        );
    }

    #[test]
    fn trailing_blank_run_leaves_single_trailing_newline() {
        let out = format_cfg("bind w +forward\n\n\n", &FormatOptions::default());
        assert_eq!(out, "bind \"w\" \"+forward\"\n");
    }

    #[test]
    fn formatting_is_idempotent() {
        let src = [
            "// group 1",
            "bind w +forward // move",
            "bind \"a\" \"+moveleft\"",
            "bind d  \"+moveright\"",
            "",
            "alias jt +jump;-attack;-attack2 // test",
            "",
            "",
            "// group 2",
            "bind \"mouse1\" +attack",
            "bind mouse2 \"+attack2\" // alt",
            "bind  \"mouse3\"    \"player_ping\"    ",
            "",
            r#"bind "k" "say //hello" // outside"#,
        ]
        .join("\n");

        let options = FormatOptions::default();
        let once = format_cfg(&src, &options);
        let twice = format_cfg(&once, &options);
        assert_eq!(once, twice);
    }

    #[test]
    fn end_to_end_scenario() {
        let src = [
            "// group 1",
            "bind w +forward // move",
            "bind \"a\" \"+moveleft\"",
            "bind d  \"+moveright\"",
            "",
            "alias jt +jump;-attack;-attack2 // test",
            "",
            "",
            "bind \"mouse1\" +attack",
        ]
        .join("\n");

        let out = format_cfg(&src, &FormatOptions::default());
        assert_eq!(
            out,
            [
                "// group 1",
                r#"bind "w" "+forward"  // move"#,
                r#"bind "a" "+moveleft""#,
                r#"bind "d" "+moveright""#,
                "",
                "alias jt +jump; -attack; -attack2  // test",
                "",
                r#"bind "mouse1" "+attack""#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn options_deserialize_from_editor_settings_shape() {
        let options: FormatOptions = serde_json::from_str(
            r#"{"alignBinds": false, "commentColumn": 48, "maxBlankLines": 2}"#,
        )
        .unwrap();
        assert!(!options.align_binds);
        assert_eq!(options.comment_column, CommentColumn::Column(48));
        assert_eq!(options.max_blank_lines, 2);
        assert!(options.format_alias_spacing);

        let auto: FormatOptions = serde_json::from_str(r#"{"commentColumn": "auto"}"#).unwrap();
        assert_eq!(auto.comment_column, CommentColumn::Auto);
    }
}
