//! Deterministic text cleanup for generated articles.

mod normalizer;
mod rules;

pub use normalizer::{normalize, Normalizer, TidyError, NOTHING_TO_CLEAN};
pub use rules::{default_rules, default_rules_version, CorrectionRule, CorrectionSet};
