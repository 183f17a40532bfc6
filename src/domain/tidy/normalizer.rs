//! The tidy pass: deterministic whitespace, punctuation, spelling and
//! capitalization cleanup.
//!
//! The passes run in a fixed order and each one sees the output of the one
//! before it. Reordering them changes results.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};
use thiserror::Error;
use tracing::warn;

use super::rules::{default_rules, CorrectionRule};

/// Returned instead of running the pipeline when there is no text.
pub const NOTHING_TO_CLEAN: &str = "Nothing to clean: the article is empty.";

static HORIZONTAL_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("horizontal whitespace regex"));
static SPACE_BEFORE_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+\n").expect("space before newline regex"));
static SPACE_AFTER_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]+").expect("space after newline regex"));
static BLANK_LINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line run regex"));
static PUNCTUATION_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([.,!?])\s*").expect("punctuation spacing regex"));
static SPACED_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\w+)\s*-\s*(\w+)\b").expect("spaced hyphen regex"));
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?] +").expect("sentence boundary regex"));

/// Internal failure of one tidy pass.
#[derive(Debug, Clone, Error)]
pub enum TidyError {
    #[error("correction rule '{pattern}' is invalid: {reason}")]
    InvalidRule { pattern: String, reason: String },
}

struct CompiledRule {
    rule: CorrectionRule,
    regex: Result<Regex, regex::Error>,
}

/// Text normalizer with an ordered correction dictionary.
///
/// `normalize` never fails: if any pass errors, the input comes back unchanged.
pub struct Normalizer {
    rules: Vec<CompiledRule>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Normalizer {
    /// Creates a normalizer with the given rules, applied in order.
    ///
    /// Rules that fail to compile are kept; they make `normalize` fail open.
    pub fn new(rules: Vec<CorrectionRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let regex = RegexBuilder::new(&rule.whole_word_pattern())
                    .case_insensitive(rule.case_insensitive)
                    .build();
                CompiledRule { rule, regex }
            })
            .collect();
        Self { rules }
    }

    /// Cleans `text`.
    ///
    /// Blank input yields [`NOTHING_TO_CLEAN`]. Any internal failure yields
    /// the original input.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return NOTHING_TO_CLEAN.to_string();
        }

        match self.run_pipeline(text) {
            Ok(cleaned) => cleaned,
            Err(err) => {
                warn!(error = %err, "tidy pass failed, keeping original text");
                text.to_string()
            }
        }
    }

    fn run_pipeline(&self, text: &str) -> Result<String, TidyError> {
        let text = HORIZONTAL_WHITESPACE.replace_all(text, " ");
        let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
        let text = SPACE_AFTER_NEWLINE.replace_all(&text, "\n");
        let text = BLANK_LINE_RUN.replace_all(&text, "\n\n");

        // Every mark gets one trailing space; trimming removes it at the very end.
        let text = PUNCTUATION_SPACING.replace_all(&text, "$1 ");
        let text = text.trim();

        let text = SPACED_HYPHEN.replace_all(text, "${1}-${2}");
        let text = self.apply_corrections(text.into_owned())?;
        let text = capitalize_sentences(&text);

        Ok(text.trim().to_string())
    }

    fn apply_corrections(&self, mut text: String) -> Result<String, TidyError> {
        for compiled in &self.rules {
            let regex = compiled
                .regex
                .as_ref()
                .map_err(|e| TidyError::InvalidRule {
                    pattern: compiled.rule.pattern.clone(),
                    reason: e.to_string(),
                })?;
            text = regex
                .replace_all(&text, NoExpand(&compiled.rule.replacement))
                .into_owned();
        }
        Ok(text)
    }
}

/// Cleans `text` with the default dictionary.
pub fn normalize(text: &str) -> String {
    static DEFAULT: Lazy<Normalizer> = Lazy::new(Normalizer::default);
    DEFAULT.normalize(text)
}

fn capitalize_sentences(text: &str) -> String {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The mark is one ASCII byte and stays with its sentence.
        sentences.push(uppercase_first(&text[start..=boundary.start()]));
        start = boundary.end();
    }
    sentences.push(uppercase_first(&text[start..]));
    sentences.join(" ")
}

fn uppercase_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod whitespace {
        use super::*;

        #[test]
        fn collapses_spaces_and_tabs() {
            assert_eq!(normalize("satu \t  dua\t\ttiga"), "Satu dua tiga");
        }

        #[test]
        fn strips_spaces_around_newlines() {
            assert_eq!(normalize("baris satu   \n   baris dua"), "Baris satu\nbaris dua");
        }

        #[test]
        fn caps_blank_lines_at_one() {
            assert_eq!(normalize("atas\n\n\n\n\nbawah"), "Atas\n\nbawah");
        }

        #[test]
        fn keeps_a_single_blank_line() {
            assert_eq!(normalize("atas\n\nbawah"), "Atas\n\nbawah");
        }
    }

    mod punctuation {
        use super::*;

        #[test]
        fn normalizes_the_reference_sentence() {
            assert_eq!(
                normalize("  Hi   there .is  this   ok?no.  "),
                "Hi there. Is this ok? No."
            );
        }

        #[test]
        fn adds_space_after_comma() {
            assert_eq!(normalize("satu,dua , tiga"), "Satu, dua, tiga");
        }

        #[test]
        fn no_trailing_space_after_final_mark() {
            assert_eq!(normalize("selesai !"), "Selesai!");
        }

        #[test]
        fn punctuation_swallows_adjacent_newlines() {
            assert_eq!(normalize("akhir.\n\nawal baru"), "Akhir. Awal baru");
        }
    }

    mod hyphens {
        use super::*;

        #[test]
        fn joins_spaced_hyphenated_words() {
            assert_eq!(normalize("bosen - bosen"), "Bosen-bosen");
        }

        #[test]
        fn leaves_dangling_hyphen_alone() {
            assert_eq!(normalize("nilai - "), "Nilai -");
        }

        #[test]
        fn joins_pairs_without_overlap() {
            assert_eq!(normalize("a - b - c"), "A-b - c");
        }
    }

    mod corrections {
        use super::*;

        #[test]
        fn applies_default_dictionary() {
            assert_eq!(
                normalize("ikan di aku arium perlu per hatian"),
                "Ikan di akuarium perlu perhatian"
            );
        }

        #[test]
        fn default_order_handles_ng_gak_before_gak() {
            assert_eq!(
                normalize("gak ng gak nemu gimana caranya"),
                "Tidak nggak nemu bagaimana caranya"
            );
        }

        #[test]
        fn pinned_order_gak_first_shadows_ng_gak() {
            let normalizer = Normalizer::new(vec![
                CorrectionRule::new("gak", "tidak"),
                CorrectionRule::new("ng gak", "nggak"),
                CorrectionRule::new("gimana", "bagaimana"),
            ]);
            assert_eq!(
                normalizer.normalize("gak ng gak nemu gimana caranya"),
                "Tidak ng tidak nemu bagaimana caranya"
            );
        }

        #[test]
        fn matching_ignores_case() {
            assert_eq!(normalize("GIMANA dong"), "Bagaimana dong");
        }

        #[test]
        fn case_sensitive_rule_skips_other_casing() {
            let normalizer = Normalizer::new(vec![CorrectionRule::new("gak", "tidak").case_sensitive()]);
            assert_eq!(normalizer.normalize("GAK dan gak"), "GAK dan tidak");
        }

        #[test]
        fn matches_whole_words_only() {
            assert_eq!(normalize("gaknya enggak"), "Gaknya enggak");
        }

        #[test]
        fn replacement_is_literal() {
            let normalizer = Normalizer::new(vec![CorrectionRule::new("harga", "$1 rupiah")]);
            assert_eq!(normalizer.normalize("harga naik"), "$1 rupiah naik");
        }
    }

    mod capitalization {
        use super::*;

        #[test]
        fn uppercases_only_the_first_character() {
            assert_eq!(normalize("pakai API dari NASA. lalu SEO"), "Pakai API dari NASA. Lalu SEO");
        }

        #[test]
        fn capitalizes_after_question_and_exclamation() {
            assert_eq!(normalize("benar? ya! oke"), "Benar? Ya! Oke");
        }

        #[test]
        fn handles_non_ascii_first_letter() {
            assert_eq!(normalize("éclair enak. ñam"), "Éclair enak. Ñam");
        }
    }

    mod edge_cases {
        use super::*;

        #[test]
        fn empty_input_returns_notice() {
            assert_eq!(normalize(""), NOTHING_TO_CLEAN);
        }

        #[test]
        fn whitespace_only_input_returns_notice() {
            assert_eq!(normalize(" \n\t  \n"), NOTHING_TO_CLEAN);
        }

        #[test]
        fn notice_is_a_fixed_point() {
            assert_eq!(normalize(NOTHING_TO_CLEAN), NOTHING_TO_CLEAN);
        }

        #[test]
        fn punctuation_only_input() {
            assert_eq!(normalize(" . "), ".");
        }

        #[test]
        fn invalid_rule_fails_open_with_original_text() {
            let normalizer = Normalizer::new(vec![
                CorrectionRule::new("gimana", "bagaimana"),
                CorrectionRule::new("(gak", "tidak"),
            ]);
            let original = "  gimana   ini .  ";
            assert_eq!(normalizer.normalize(original), original);
        }

        #[test]
        fn empty_dictionary_still_cleans() {
            let normalizer = Normalizer::new(Vec::new());
            assert_eq!(normalizer.normalize("gak  apa ."), "Gak apa.");
        }
    }

    mod idempotence {
        use super::*;

        #[test]
        fn representative_inputs_are_fixed_points() {
            let samples = [
                "  Hi   there .is  this   ok?no.  ",
                "gak ng gak nemu gimana caranya",
                "oke, ini dia teks.\n\n\n\ngue mau ngomongin \"slot\" nih , biar nggak bosen - bosen.",
                "wait... what?! really",
                "angka 3.5 dan 1,000 orang",
                "a - b - c",
            ];
            for sample in samples {
                let once = normalize(sample);
                assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
            }
        }
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(text in "\\PC*") {
            let _ = normalize(&text);
        }

        #[test]
        fn output_is_a_fixed_point(text in "[a-zA-Z ,.!?\n\t-]{0,80}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn output_has_no_edge_whitespace(text in "[a-z ,.!?\n\t-]{0,80}") {
            let cleaned = normalize(&text);
            prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        }
    }
}
