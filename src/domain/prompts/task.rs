//! The kinds of generation task the application runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A generation task. Each task has its own prompt template, token budget
/// rule and expected stream length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Keywords,
    MetaTitle,
    MetaDescription,
    ArticleDraft,
    Humanize,
    SeoAnalysis,
    ChatTurn,
}

impl TaskKind {
    /// All task kinds in display order.
    pub const ALL: [TaskKind; 7] = [
        TaskKind::Keywords,
        TaskKind::MetaTitle,
        TaskKind::MetaDescription,
        TaskKind::ArticleDraft,
        TaskKind::Humanize,
        TaskKind::SeoAnalysis,
        TaskKind::ChatTurn,
    ];

    /// Number of streamed tokens after which progress is expected to be done.
    ///
    /// Rough calibration per task; the projection saturates when a stream runs
    /// longer.
    pub fn expected_steps(&self) -> u32 {
        match self {
            TaskKind::Keywords => 30,
            TaskKind::MetaTitle => 20,
            TaskKind::MetaDescription => 35,
            TaskKind::ArticleDraft => 70,
            TaskKind::Humanize => 60,
            TaskKind::SeoAnalysis => 5,
            TaskKind::ChatTurn => 40,
        }
    }

    /// Whether the task takes a caller-supplied numeric limit.
    pub fn takes_limit(&self) -> bool {
        matches!(
            self,
            TaskKind::Keywords
                | TaskKind::MetaTitle
                | TaskKind::MetaDescription
                | TaskKind::ArticleDraft
        )
    }

    /// Short lowercase label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Keywords => "keywords",
            TaskKind::MetaTitle => "meta title",
            TaskKind::MetaDescription => "meta description",
            TaskKind::ArticleDraft => "article draft",
            TaskKind::Humanize => "humanize",
            TaskKind::SeoAnalysis => "seo analysis",
            TaskKind::ChatTurn => "chat turn",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
