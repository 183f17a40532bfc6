//! The article the workflow builds up.

use serde::{Deserialize, Serialize};

use super::state::Stage;
use crate::domain::foundation::Timestamp;

/// The committed text. Replaced whole by every completed stage, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Article {
    content: String,
    revision: u64,
    committed_at: Option<Timestamp>,
    produced_by: Option<Stage>,
}

impl Article {
    /// An empty article that has never been committed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of commits so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn committed_at(&self) -> Option<Timestamp> {
        self.committed_at
    }

    /// The stage whose output is the current content.
    pub fn produced_by(&self) -> Option<Stage> {
        self.produced_by
    }

    /// Returns true if the content is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Replaces the content with a stage's output and bumps the revision.
    pub fn commit(&mut self, content: String, stage: Stage) {
        self.content = content;
        self.revision += 1;
        self.committed_at = Some(Timestamp::now());
        self.produced_by = Some(stage);
    }

    /// Empties the content without counting a commit.
    pub fn clear(&mut self) {
        self.content.clear();
        self.produced_by = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_article_is_blank_revision_zero() {
        let article = Article::new();
        assert!(article.is_blank());
        assert_eq!(article.revision(), 0);
        assert!(article.committed_at().is_none());
        assert!(article.produced_by().is_none());
    }

    #[test]
    fn commit_replaces_content_and_bumps_revision() {
        let mut article = Article::new();
        article.commit("draf pertama".to_string(), Stage::Generate);
        article.commit("draf kedua".to_string(), Stage::Humanize);

        assert_eq!(article.content(), "draf kedua");
        assert_eq!(article.revision(), 2);
        assert_eq!(article.produced_by(), Some(Stage::Humanize));
        assert!(article.committed_at().is_some());
    }

    #[test]
    fn clear_keeps_revision() {
        let mut article = Article::new();
        article.commit("isi".to_string(), Stage::Generate);
        article.clear();

        assert!(article.is_blank());
        assert_eq!(article.revision(), 1);
        assert!(article.produced_by().is_none());
    }

    #[test]
    fn whitespace_content_is_blank() {
        let mut article = Article::new();
        article.commit(" \n ".to_string(), Stage::Generate);
        assert!(article.is_blank());
    }

    #[test]
    fn char_count_counts_characters() {
        let mut article = Article::new();
        article.commit("naïve".to_string(), Stage::Generate);
        assert_eq!(article.char_count(), 5);
    }
}
