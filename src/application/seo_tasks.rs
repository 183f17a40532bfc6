//! Standalone SEO tasks.
//!
//! Keyword lists, meta tags and chat turns stream through a [`TaskRun`];
//! page analysis fetches a page, extracts its text and asks for a review in
//! one non-streaming call. None of these touch the article.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::task_run::TaskRun;
use crate::domain::foundation::{Percentage, ValidationError};
use crate::domain::page_text::{extract_text, PageUrl, DEFAULT_MAX_CHARS};
use crate::domain::progress::ProgressEstimate;
use crate::domain::prompts::{PromptBuilder, PromptError, TaskKind};
use crate::ports::{GenerationRequest, PageFetcher, TextGenerator};

/// Shown when a fetched page has no text left after extraction.
pub const NO_TEXT_NOTICE: &str = "Could not extract any meaningful text from this URL.";

/// Shown when the model answers an analysis request with nothing.
pub const NO_ANALYSIS_NOTICE: &str = "No analysis was received from the model.";

/// Inputs the tasks refuse before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ValidationError),
}

/// Where page analysis has got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Fetching,
    Extracting,
    Analyzing,
    Done,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisPhase::Fetching => "Fetching page",
            AnalysisPhase::Extracting => "Extracting text",
            AnalysisPhase::Analyzing => "Analyzing",
            AnalysisPhase::Done => "Done",
        };
        write!(f, "{}", label)
    }
}

/// How page analysis ended. Network and backend failures are values here,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Analysis(String),
    NoText,
    Failed(String),
}

impl AnalysisOutcome {
    /// Text to show the user.
    pub fn message(&self) -> &str {
        match self {
            AnalysisOutcome::Analysis(text) | AnalysisOutcome::Failed(text) => text,
            AnalysisOutcome::NoText => NO_TEXT_NOTICE,
        }
    }

    pub fn is_analysis(&self) -> bool {
        matches!(self, AnalysisOutcome::Analysis(_))
    }
}

/// Runs the SEO tasks against one generator and one page fetcher.
pub struct SeoTasks<G: TextGenerator + ?Sized, F: PageFetcher + ?Sized> {
    generator: Arc<G>,
    fetcher: Arc<F>,
    prompts: PromptBuilder,
    page_max_chars: usize,
}

impl<G: TextGenerator + ?Sized, F: PageFetcher + ?Sized> SeoTasks<G, F> {
    pub fn new(generator: Arc<G>, fetcher: Arc<F>) -> Self {
        Self {
            generator,
            fetcher,
            prompts: PromptBuilder::default(),
            page_max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Caps how much extracted page text goes into the analysis prompt.
    pub fn with_page_max_chars(mut self, max_chars: usize) -> Self {
        self.page_max_chars = max_chars;
        self
    }

    /// Streams a comma-separated keyword list for `topic`.
    pub fn keywords(&self, topic: &str, count: u32) -> Result<TaskRun, TaskError> {
        let prompt = self.prompts.keywords(topic, count)?;
        Ok(TaskRun::start(self.generator.as_ref(), prompt))
    }

    pub fn meta_title(&self, topic: &str, max_chars: u32) -> Result<TaskRun, TaskError> {
        let prompt = self.prompts.meta_title(topic, max_chars)?;
        Ok(TaskRun::start(self.generator.as_ref(), prompt))
    }

    pub fn meta_description(&self, topic: &str, max_chars: u32) -> Result<TaskRun, TaskError> {
        let prompt = self.prompts.meta_description(topic, max_chars)?;
        Ok(TaskRun::start(self.generator.as_ref(), prompt))
    }

    /// Streams one chat reply. Earlier turns are not sent.
    pub fn chat_turn(&self, utterance: &str) -> Result<TaskRun, TaskError> {
        let prompt = self.prompts.chat_turn(utterance)?;
        Ok(TaskRun::start(self.generator.as_ref(), prompt))
    }

    /// Fetches `url`, extracts its text and asks for an SEO review.
    ///
    /// `on_progress` is called as each phase starts and once more with
    /// [`AnalysisPhase::Done`] at 100.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for a blank or non-HTTP URL. Fetch and
    /// generation failures come back as [`AnalysisOutcome::Failed`].
    pub async fn analyze_page<P>(
        &self,
        url: &str,
        mut on_progress: P,
    ) -> Result<AnalysisOutcome, TaskError>
    where
        P: FnMut(AnalysisPhase, Percentage),
    {
        let url = PageUrl::new(url)?;
        let mut progress = ProgressEstimate::for_task(TaskKind::SeoAnalysis);

        progress = enter(&mut on_progress, AnalysisPhase::Fetching, progress);
        debug!(url = %url, "Fetching page");
        let markup = match self.fetcher.fetch(&url).await {
            Ok(markup) => markup,
            Err(err) => {
                warn!(url = %url, error = %err, "Page fetch failed");
                on_progress(AnalysisPhase::Done, progress.finish());
                return Ok(AnalysisOutcome::Failed(err.to_string()));
            }
        };

        progress = enter(&mut on_progress, AnalysisPhase::Extracting, progress);
        let text = extract_text(&markup, self.page_max_chars);
        if text.is_empty() {
            info!(url = %url, "Page has no extractable text");
            on_progress(AnalysisPhase::Done, progress.finish());
            return Ok(AnalysisOutcome::NoText);
        }

        progress = enter(&mut on_progress, AnalysisPhase::Analyzing, progress);
        let prompt = self.prompts.seo_analysis(&text)?;
        let outcome = match self.generator.generate(GenerationRequest::from(prompt)).await {
            Ok(analysis) if analysis.trim().is_empty() => {
                warn!(url = %url, "Model returned an empty analysis");
                AnalysisOutcome::Failed(NO_ANALYSIS_NOTICE.to_string())
            }
            Ok(analysis) => AnalysisOutcome::Analysis(analysis.trim().to_string()),
            Err(err) => {
                warn!(url = %url, error = %err, "Page analysis failed");
                AnalysisOutcome::Failed(err.to_string())
            }
        };

        on_progress(AnalysisPhase::Done, progress.finish());
        Ok(outcome)
    }
}

fn enter<P>(on_progress: &mut P, phase: AnalysisPhase, progress: ProgressEstimate) -> ProgressEstimate
where
    P: FnMut(AnalysisPhase, Percentage),
{
    let (progress, percentage) = progress.advance();
    on_progress(phase, percentage);
    progress
}
