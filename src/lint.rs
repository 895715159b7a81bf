use std::collections::HashMap;
use std::ops::Range;
use std::str::FromStr;

use crate::alias::AliasIndex;
use crate::document::Document;
use crate::rules::ALL_RULES;
use crate::text::split_lines;

/// Diagnostic severity. No automatic escalation between levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Hint,
    Info,
    Warning,
}

impl FromStr for LintSeverity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(LintSeverity::Error),
            "hint" => Ok(LintSeverity::Hint),
            "info" => Ok(LintSeverity::Info),
            "warning" => Ok(LintSeverity::Warning),
            _ => Err(()),
        }
    }
}

/// Per-rule toggle and severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintRuleConfig {
    pub enabled: bool,
    pub severity: LintSeverity,
}

/// One diagnostic produced by a rule. Findings are pure values: fixes are
/// described in `data` (e.g. a precomputed replacement line) for a consumer
/// to apply, never applied here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    /// Optional fix payload, rule-specific.
    pub data: Option<serde_json::Value>,
    /// 0-based line number.
    pub line: usize,
    pub message: String,
    /// Character range `[start, end)` on that line.
    pub range: Range<usize>,
    pub rule_id: &'static str,
    pub severity: LintSeverity,
}

/// Lint configuration: a master switch plus per-rule overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSettings {
    pub enabled: bool,
    pub rules: HashMap<String, LintRuleConfig>,
}

impl Default for LintSettings {
    fn default() -> Self {
        let mut rules = HashMap::new();
        for rule in ALL_RULES {
            rules.insert(
                rule.id.to_string(),
                LintRuleConfig {
                    enabled: true,
                    severity: rule.default_severity,
                },
            );
        }
        Self { enabled: true, rules }
    }
}

impl LintSettings {
    /// Apply host overrides on top of the defaults. An override of `"off"`
    /// disables the rule; any other string enables it with that severity
    /// (unparseable strings fall back to `warning`). Rule ids not in the
    /// default table start from `{enabled: true, severity: warning}`.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut settings = Self::default();
        for (rule_id, value) in overrides {
            let entry = settings
                .rules
                .entry(rule_id.clone())
                .or_insert(LintRuleConfig {
                    enabled: true,
                    severity: LintSeverity::Warning,
                });
            if value == "off" {
                entry.enabled = false;
            } else {
                *entry = LintRuleConfig {
                    enabled: true,
                    severity: LintSeverity::from_str(value).unwrap_or(LintSeverity::Warning),
                };
            }
        }
        settings
    }

    /// Effective config for a rule; unknown ids lint as enabled warnings.
    pub fn config_of(&self, rule_id: &str) -> LintRuleConfig {
        self.rules.get(rule_id).copied().unwrap_or(LintRuleConfig {
            enabled: true,
            severity: LintSeverity::Warning,
        })
    }
}

/// Raw settings shape a host reads from its configuration store.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct LintSettingsOverrides {
    pub enabled: Option<bool>,
    pub rules: HashMap<String, String>,
}

impl From<LintSettingsOverrides> for LintSettings {
    fn from(raw: LintSettingsOverrides) -> Self {
        let mut settings = LintSettings::with_overrides(&raw.rules);
        if let Some(enabled) = raw.enabled {
            settings.enabled = enabled;
        }
        settings
    }
}

/// Shared read-only context handed to every rule in a run.
pub struct LintContext<'a> {
    pub alias_index: &'a AliasIndex,
    pub document: &'a dyn Document,
    pub lines: Vec<&'a str>,
    pub settings: &'a LintSettings,
    pub text: &'a str,
}

impl LintContext<'_> {
    pub fn config_of(&self, rule_id: &str) -> LintRuleConfig {
        self.settings.config_of(rule_id)
    }
}

/// Identity, description, and default severity of every registered rule,
/// in registration order — for host UIs that list per-rule toggles.
pub fn available_rules() -> Vec<(&'static str, &'static str, LintSeverity)> {
    ALL_RULES
        .iter()
        .map(|rule| (rule.id, rule.description, rule.default_severity))
        .collect()
}

/// Run every enabled rule over the document and concatenate the findings in
/// rule registration order. Rules are independent and stateless; a disabled
/// rule contributes nothing.
pub fn run_linter(
    document: &dyn Document,
    alias_index: &AliasIndex,
    settings: &LintSettings,
) -> Vec<LintFinding> {
    if !settings.enabled {
        return Vec::new();
    }

    let text = document.text();
    let ctx = LintContext {
        alias_index,
        document,
        lines: split_lines(&text),
        settings,
        text: &text,
    };

    let mut findings = Vec::new();
    for rule in ALL_RULES {
        if ctx.config_of(rule.id).enabled {
            findings.extend((rule.run)(&ctx));
        }
    }

    tracing::debug!(uri = document.uri(), count = findings.len(), "lint run finished");
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    #[test]
    fn default_settings_cover_all_rules() {
        let settings = LintSettings::default();
        assert_eq!(settings.rules.len(), ALL_RULES.len());
        assert_eq!(
            settings.config_of("alias-cycle").severity,
            LintSeverity::Error
        );
        assert_eq!(
            settings.config_of("alias-spacing").severity,
            LintSeverity::Hint
        );
    }

    #[test]
    fn off_override_disables_a_rule() {
        let overrides =
            HashMap::from([("duplicate-bind-key".to_string(), "off".to_string())]);
        let settings = LintSettings::with_overrides(&overrides);
        assert!(!settings.config_of("duplicate-bind-key").enabled);
        assert!(settings.config_of("alias-cycle").enabled);
    }

    #[test]
    fn severity_override_reenables_with_new_level() {
        let overrides = HashMap::from([("alias-unused".to_string(), "error".to_string())]);
        let settings = LintSettings::with_overrides(&overrides);
        let config = settings.config_of("alias-unused");
        assert!(config.enabled);
        assert_eq!(config.severity, LintSeverity::Error);
    }

    #[test]
    fn unknown_rule_override_defaults_to_warning() {
        let overrides = HashMap::from([("future-rule".to_string(), "bogus".to_string())]);
        let settings = LintSettings::with_overrides(&overrides);
        let config = settings.config_of("future-rule");
        assert!(config.enabled);
        assert_eq!(config.severity, LintSeverity::Warning);
    }

    #[test]
    fn overrides_deserialize_from_settings_blob() {
        let raw: LintSettingsOverrides = serde_json::from_str(
            r#"{"enabled": true, "rules": {"alias-cycle": "off", "alias-spacing": "info"}}"#,
        )
        .unwrap();
        let settings = LintSettings::from(raw);
        assert!(!settings.config_of("alias-cycle").enabled);
        assert_eq!(
            settings.config_of("alias-spacing").severity,
            LintSeverity::Info
        );
    }

    #[test]
    fn master_switch_silences_everything() {
        let doc = TextDocument::cfg("test://doc.cfg", "exec nasty.cfg");
        let index = AliasIndex::new();
        let settings = LintSettings {
            enabled: false,
            ..LintSettings::default()
        };
        assert!(run_linter(&doc, &index, &settings).is_empty());
    }
}
