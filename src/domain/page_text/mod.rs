//! Turning fetched page markup into plain text for analysis.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Characters of page text kept for the analysis prompt.
pub const DEFAULT_MAX_CHARS: usize = 3500;

static NON_CONTENT_ELEMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["style", "script", "nav", "footer", "header"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}.*?</{tag}>"))
                .expect("non-content element regex")
        })
        .collect()
});
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// An address accepted for page analysis: non-empty, `http://` or `https://`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageUrl(String);

impl PageUrl {
    /// Validates and wraps a page address. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` for a blank address, `InvalidFormat` for any other
    /// scheme.
    pub fn new(url: impl AsRef<str>) -> Result<Self, ValidationError> {
        let url = url.as_ref().trim();
        if url.is_empty() {
            return Err(ValidationError::empty_field("url"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::invalid_format(
                "url",
                "must start with http:// or https://",
            ));
        }
        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PageUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageUrl> for String {
    fn from(url: PageUrl) -> Self {
        url.0
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracts readable text from page markup.
///
/// Drops style, script, nav, footer and header elements, replaces the
/// remaining tags with spaces, collapses whitespace and keeps at most
/// `max_chars` characters. May return an empty string.
pub fn extract_text(markup: &str, max_chars: usize) -> String {
    let mut text = markup.to_string();
    for element in NON_CONTENT_ELEMENTS.iter() {
        text = element.replace_all(&text, "").into_owned();
    }
    let text = ANY_TAG.replace_all(&text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    truncate_chars(text.trim(), max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod url {
        use super::*;

        #[test]
        fn accepts_http_and_https() {
            assert_eq!(PageUrl::new("https://contoh.id").unwrap().as_str(), "https://contoh.id");
            assert!(PageUrl::new("http://contoh.id/halaman").is_ok());
        }

        #[test]
        fn trims_surrounding_whitespace() {
            assert_eq!(PageUrl::new("  https://contoh.id ").unwrap().as_str(), "https://contoh.id");
        }

        #[test]
        fn rejects_blank() {
            assert_eq!(PageUrl::new("  "), Err(ValidationError::empty_field("url")));
        }

        #[test]
        fn rejects_other_schemes() {
            assert!(matches!(
                PageUrl::new("ftp://contoh.id"),
                Err(ValidationError::InvalidFormat { .. })
            ));
            assert!(PageUrl::new("contoh.id").is_err());
        }

        #[test]
        fn deserializes_with_validation() {
            let ok: Result<PageUrl, _> = serde_json::from_str("\"https://contoh.id\"");
            assert!(ok.is_ok());
            let bad: Result<PageUrl, _> = serde_json::from_str("\"contoh.id\"");
            assert!(bad.is_err());
        }
    }

    mod extraction {
        use super::*;

        #[test]
        fn drops_non_content_elements_across_lines() {
            let markup = "<HEADER>menu\natas</HEADER><p>Isi</p>\n<script type=\"x\">\nvar a = 1;\n</script><Nav>link</Nav><footer>kaki</footer><style>p{}</style>";
            assert_eq!(extract_text(markup, DEFAULT_MAX_CHARS), "Isi");
        }

        #[test]
        fn tags_become_spaces_and_whitespace_collapses() {
            let markup = "<h1>Judul</h1><p>Paragraf\n\n  satu</p><br/>dua";
            assert_eq!(extract_text(markup, DEFAULT_MAX_CHARS), "Judul Paragraf satu dua");
        }

        #[test]
        fn truncates_by_characters() {
            let markup = format!("<p>{}</p>", "é".repeat(10));
            assert_eq!(extract_text(&markup, 4), "éééé");
        }

        #[test]
        fn markup_without_text_is_empty() {
            assert_eq!(extract_text("<script>x()</script><div> </div>", DEFAULT_MAX_CHARS), "");
        }

        #[test]
        fn default_limit_is_applied() {
            let markup = "a ".repeat(5000);
            assert_eq!(extract_text(&markup, DEFAULT_MAX_CHARS).chars().count(), DEFAULT_MAX_CHARS);
        }
    }
}
