//! Spelling and slang correction rules applied by the tidy pass.
//!
//! The default dictionary is versioned data in `corrections.json`, embedded at
//! build time. Rules run in file order; a later rule sees the output of the
//! earlier ones, so reordering the file changes results.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One whole-word correction: every match of `pattern` becomes `replacement`.
///
/// `pattern` is a regular-expression fragment; it is anchored on word
/// boundaries when compiled. The replacement is inserted literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

impl CorrectionRule {
    /// Creates a case-insensitive rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            case_insensitive: true,
        }
    }

    /// Makes the rule match case-sensitively.
    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }

    /// The full expression this rule compiles to.
    pub fn whole_word_pattern(&self) -> String {
        format!(r"\b(?:{})\b", self.pattern)
    }
}

fn default_case_insensitive() -> bool {
    true
}

/// The embedded correction dictionary file.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionSet {
    pub version: u32,
    pub rules: Vec<CorrectionRule>,
}

static DEFAULT_CORRECTIONS: Lazy<CorrectionSet> = Lazy::new(|| {
    serde_json::from_str(include_str!("corrections.json"))
        .unwrap_or_else(|e| panic!("Failed to parse embedded corrections.json: {}", e))
});

/// Returns the default ordered correction rules.
pub fn default_rules() -> Vec<CorrectionRule> {
    DEFAULT_CORRECTIONS.rules.clone()
}

/// Returns the version of the embedded dictionary.
pub fn default_rules_version() -> u32 {
    DEFAULT_CORRECTIONS.version
}
