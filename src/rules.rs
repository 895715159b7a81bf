//! The fixed set of lint rules. Each rule is a pure function from the
//! shared [`LintContext`] to a list of findings; registration order here is
//! the only ordering the runner guarantees.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::json;

use crate::bind::{parse_bind, BindAst};
use crate::format::normalize_alias_value_spacing;
use crate::lint::{LintContext, LintFinding, LintSeverity};
use crate::split::split_comment_smart;

/// A registered rule: identity, default severity, and its check function.
pub struct RuleDef {
    pub default_severity: LintSeverity,
    pub description: &'static str,
    pub id: &'static str,
    pub run: fn(&LintContext<'_>) -> Vec<LintFinding>,
}

pub const ALL_RULES: &[RuleDef] = &[
    RuleDef {
        default_severity: LintSeverity::Warning,
        description: "Disallow 'exec *.cfg' and 'script' lines in curated configs.",
        id: "exec-script-forbidden",
        run: rule_exec_script,
    },
    RuleDef {
        default_severity: LintSeverity::Warning,
        description: "Detect multiple binds for the same key.",
        id: "duplicate-bind-key",
        run: rule_duplicate_bind,
    },
    RuleDef {
        default_severity: LintSeverity::Error,
        description: "Detect cyclic alias definitions.",
        id: "alias-cycle",
        run: rule_alias_cycle,
    },
    RuleDef {
        default_severity: LintSeverity::Hint,
        description: "Normalize ';' spacing in alias values (outside strings).",
        id: "alias-spacing",
        run: rule_alias_spacing,
    },
    RuleDef {
        default_severity: LintSeverity::Info,
        description: "Detect aliases that are defined but never referenced.",
        id: "alias-unused",
        run: rule_unused_alias,
    },
];

/// Depth bound used when probing alias chains for cycles. Deeper than the
/// resolution default so long legitimate chains don't mask real cycles.
const CYCLE_PROBE_DEPTH: usize = 50;

static RE_EXEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*exec\s+.+\.cfg\b").expect("valid regex"));

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*script\b").expect("valid regex"));

static RE_ALIAS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*alias\b").expect("valid regex"));

/// Name of an alias-definition line, quoted or bare.
static RE_ALIAS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*alias\s+(?:"([^\s"]+)"|([^\s"]+))"#).expect("valid regex")
});

fn line_range(line: &str) -> std::ops::Range<usize> {
    0..line.chars().count()
}

fn rule_exec_script(ctx: &LintContext<'_>) -> Vec<LintFinding> {
    let config = ctx.config_of("exec-script-forbidden");
    let mut findings = Vec::new();

    for (i, line) in ctx.lines.iter().enumerate() {
        let is_exec = RE_EXEC.is_match(line);
        if !is_exec && !RE_SCRIPT.is_match(line) {
            continue;
        }
        let (kind, message) = if is_exec {
            ("exec", "Use of 'exec … .cfg' is discouraged here.")
        } else {
            ("script", "Use of 'script' is discouraged here.")
        };
        findings.push(LintFinding {
            data: Some(json!({ "kind": kind })),
            line: i,
            message: message.to_string(),
            range: line_range(line),
            rule_id: "exec-script-forbidden",
            severity: config.severity,
        });
    }
    findings
}

/// Flag every bind of a key except the last one — the runtime convention is
/// "last binding wins", so earlier binds are dead.
fn rule_duplicate_bind(ctx: &LintContext<'_>) -> Vec<LintFinding> {
    let config = ctx.config_of("duplicate-bind-key");
    let mut occurrences: IndexMap<String, Vec<usize>> = IndexMap::new();

    for (i, line) in ctx.lines.iter().enumerate() {
        let code = split_comment_smart(line).code;
        if let BindAst::Bind(stmt) = parse_bind(code) {
            occurrences.entry(stmt.key).or_default().push(i);
        }
    }

    let mut findings = Vec::new();
    for (key, lines) in &occurrences {
        if lines.len() <= 1 {
            continue;
        }
        for &line in &lines[..lines.len() - 1] {
            findings.push(LintFinding {
                data: Some(json!({ "key": key, "line": line })),
                line,
                message: format!(
                    "Key \"{key}\" is bound multiple times; later binding takes precedence."
                ),
                range: line_range(ctx.lines[line]),
                rule_id: "duplicate-bind-key",
                severity: config.severity,
            });
        }
    }
    findings
}

/// One finding per cyclic definition, naming the full chain.
fn rule_alias_cycle(ctx: &LintContext<'_>) -> Vec<LintFinding> {
    let config = ctx.config_of("alias-cycle");
    let definitions = alias_definition_lines(&ctx.lines);

    let mut findings = Vec::new();
    for (name, line) in &definitions {
        let Some(resolution) = ctx.alias_index.resolve(ctx.document, name, CYCLE_PROBE_DEPTH)
        else {
            continue;
        };
        let Some(cycle) = resolution.cycle else {
            continue;
        };
        if cycle.len() < 2 {
            continue;
        }
        findings.push(LintFinding {
            data: Some(json!({ "cycle": cycle })),
            line: *line,
            message: format!("Alias cycle detected: {}", cycle.join(" -> ")),
            range: line_range(ctx.lines[*line]),
            rule_id: "alias-cycle",
            severity: config.severity,
        });
    }
    findings
}

/// Flag alias lines whose `;` spacing differs from the normalized form; the
/// fix payload carries the fully reconstructed replacement line.
fn rule_alias_spacing(ctx: &LintContext<'_>) -> Vec<LintFinding> {
    let config = ctx.config_of("alias-spacing");
    let mut findings = Vec::new();

    for (i, line) in ctx.lines.iter().enumerate() {
        if !RE_ALIAS_LINE.is_match(line) {
            continue;
        }
        let split = split_comment_smart(line);
        let normalized = normalize_alias_value_spacing(split.code);
        if normalized == split.code.trim_end() {
            continue;
        }

        let replacement = match split.comment {
            Some(comment) => format!("{normalized}  {comment}"),
            None => normalized.clone(),
        };
        findings.push(LintFinding {
            data: Some(json!({ "replacement": replacement.trim_end() })),
            line: i,
            message: "Normalize ';' spacing in alias line.".to_string(),
            range: line_range(line),
            rule_id: "alias-spacing",
            severity: config.severity,
        });
    }
    findings
}

/// Heuristic: an alias whose name appears at most once in the whole document
/// text (its own definition) is likely unused. Occurrences are counted as
/// whole words anywhere in the raw text, comments and strings included.
fn rule_unused_alias(ctx: &LintContext<'_>) -> Vec<LintFinding> {
    let config = ctx.config_of("alias-unused");
    let mut findings = Vec::new();

    for (name, line) in &alias_definition_lines(&ctx.lines) {
        if count_whole_word(ctx.text, name) > 1 {
            continue;
        }
        findings.push(LintFinding {
            data: Some(json!({ "name": name })),
            line: *line,
            message: format!("Alias \"{name}\" seems to be unused."),
            range: line_range(ctx.lines[*line]),
            rule_id: "alias-unused",
            severity: config.severity,
        });
    }
    findings
}

/// All alias-definition lines, name → line, in document order with the
/// last definition winning the line number.
fn alias_definition_lines(lines: &[&str]) -> IndexMap<String, usize> {
    let mut definitions = IndexMap::new();
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = RE_ALIAS_NAME.captures(line) else {
            continue;
        };
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        definitions.insert(name.as_str().to_string(), i);
    }
    definitions
}

/// Count whole-word occurrences of `word`, delimited by anything outside
/// `[A-Za-z0-9_]`.
fn count_whole_word(text: &str, word: &str) -> usize {
    if word.is_empty() {
        return 0;
    }
    let boundary = |c: char| !c.is_ascii_alphanumeric() && c != '_';

    let mut count = 0;
    let mut from = 0;
    while let Some(pos) = text[from..].find(word) {
        let start = from + pos;
        let end = start + word.len();
        let left_ok = text[..start].chars().next_back().is_none_or(boundary);
        let right_ok = text[end..].chars().next().is_none_or(boundary);
        if left_ok && right_ok {
            count += 1;
        }
        from = start + word.len();
    }
    count
}
