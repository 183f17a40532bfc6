//! The article workflow: Generate, Humanize and Tidy over one article.
//!
//! Streaming stages hand back a [`StageRun`] that holds the workflow's
//! exclusive borrow until it settles. The article is only written when a
//! stage completes; failures restore the pre-stage value and leave a notice.
//!
//! # Example
//!
//! ```ignore
//! let mut workflow = ArticleWorkflow::new(Arc::new(generator));
//! let mut run = workflow.generate_draft("kopi susu gula aren", 400)?;
//! while let Some(update) = run.next().await {
//!     if let StageUpdate::Partial { delta, .. } = update {
//!         print!("{delta}");
//!     }
//! }
//! drop(run);
//! workflow.tidy()?;
//! ```

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::task_run::{TaskRun, TaskUpdate};
use crate::domain::article::{Article, Stage, WorkflowState};
use crate::domain::foundation::{Percentage, RunId, StateMachine};
use crate::domain::prompts::{PromptBuilder, PromptError, RenderedPrompt};
use crate::domain::tidy::Normalizer;
use crate::ports::TextGenerator;

/// Requests the workflow refuses. Nothing changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Another stage is still running ({0}).")]
    StageInProgress(WorkflowState),

    #[error("There is no article yet. Generate one first.")]
    EmptyArticle,

    #[error("Cannot {stage} while the workflow is {state}.")]
    InvalidTransition { stage: Stage, state: WorkflowState },

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// One step of a streaming stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageUpdate {
    /// A text token arrived; the article is not touched yet.
    Partial { delta: String, progress: Percentage },
    /// The stage's output is now the article.
    Completed { revision: u64, progress: Percentage },
    /// The stage failed; the article is back to its pre-stage value.
    Failed { message: String, progress: Percentage },
}

/// How a drained stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Committed { revision: u64 },
    Failed { message: String },
}

/// Owns the article and runs stages on it, one at a time.
pub struct ArticleWorkflow<G: TextGenerator + ?Sized> {
    generator: Arc<G>,
    prompts: PromptBuilder,
    normalizer: Normalizer,
    article: Article,
    state: WorkflowState,
    last_notice: Option<String>,
}

impl<G: TextGenerator + ?Sized> ArticleWorkflow<G> {
    /// Creates an idle workflow with default prompts and corrections.
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            generator,
            prompts: PromptBuilder::default(),
            normalizer: Normalizer::default(),
            article: Article::new(),
            state: WorkflowState::Idle,
            last_notice: None,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    /// Message left by the last failed stage, cleared when a stage starts.
    pub fn last_notice(&self) -> Option<&str> {
        self.last_notice.as_deref()
    }

    pub fn generator(&self) -> &Arc<G> {
        &self.generator
    }

    /// Starts drafting an article from `idea`.
    ///
    /// The current article is cleared immediately. If the stream fails it is
    /// restored; if the run is dropped early it stays empty.
    ///
    /// # Errors
    ///
    /// - `StageInProgress` if a stage is running
    /// - `Prompt` if the idea is blank or `approx_tokens` is zero
    pub fn generate_draft(
        &mut self,
        idea: &str,
        approx_tokens: u32,
    ) -> Result<StageRun<'_, G>, WorkflowError> {
        self.ensure_not_busy()?;
        let prompt = self.prompts.article_draft(idea, approx_tokens)?;
        self.begin(Stage::Generate)?;

        let snapshot = self.article.clone();
        self.article.clear();
        Ok(StageRun::start(self, Stage::Generate, prompt, Some(snapshot)))
    }

    /// Starts rewriting the article in a conversational register.
    ///
    /// The article keeps its current text until the rewrite completes.
    ///
    /// # Errors
    ///
    /// - `StageInProgress` if a stage is running
    /// - `EmptyArticle` if there is nothing to rewrite
    /// - `Prompt(TooShort)` if the article is under the minimum length; no
    ///   request is made
    pub fn humanize(&mut self) -> Result<StageRun<'_, G>, WorkflowError> {
        self.ensure_not_busy()?;
        if self.article.is_blank() {
            return Err(WorkflowError::EmptyArticle);
        }
        let prompt = self.prompts.humanize(self.article.content())?;
        self.begin(Stage::Humanize)?;
        Ok(StageRun::start(self, Stage::Humanize, prompt, None))
    }

    /// Normalizes the article and commits the result.
    ///
    /// # Errors
    ///
    /// - `StageInProgress` if a stage is running
    /// - `EmptyArticle` if there is nothing to clean
    pub fn tidy(&mut self) -> Result<&Article, WorkflowError> {
        self.ensure_not_busy()?;
        if self.article.is_blank() {
            return Err(WorkflowError::EmptyArticle);
        }
        self.begin(Stage::Tidy)?;

        let cleaned = self.normalizer.normalize(self.article.content());
        self.article.commit(cleaned, Stage::Tidy);
        self.settle(WorkflowState::Ready);
        info!(revision = self.article.revision(), "Article tidied");
        Ok(&self.article)
    }

    fn ensure_not_busy(&self) -> Result<(), WorkflowError> {
        if self.state.is_busy() {
            return Err(WorkflowError::StageInProgress(self.state));
        }
        Ok(())
    }

    fn begin(&mut self, stage: Stage) -> Result<(), WorkflowError> {
        self.state = self
            .state
            .transition_to(stage.running_state())
            .map_err(|_| WorkflowError::InvalidTransition {
                stage,
                state: self.state,
            })?;
        self.last_notice = None;
        Ok(())
    }

    /// Leaves a running stage for `target`.
    fn settle(&mut self, target: WorkflowState) {
        self.state = self.state.transition_to(target).unwrap_or_else(|err| {
            warn!(error = %err, "Unexpected workflow transition");
            target
        });
    }
}

/// A streaming stage in flight.
///
/// Drive it with [`StageRun::next`]. Dropping it before the terminal update
/// abandons the stage and returns the workflow to a resting state.
pub struct StageRun<'a, G: TextGenerator + ?Sized> {
    workflow: &'a mut ArticleWorkflow<G>,
    stage: Stage,
    run: TaskRun,
    snapshot: Option<Article>,
    settled: bool,
}

impl<'a, G: TextGenerator + ?Sized> StageRun<'a, G> {
    fn start(
        workflow: &'a mut ArticleWorkflow<G>,
        stage: Stage,
        prompt: RenderedPrompt,
        snapshot: Option<Article>,
    ) -> Self {
        let run = TaskRun::start(workflow.generator.as_ref(), prompt);
        debug!(run_id = %run.id(), stage = %stage, "Stage started");
        Self {
            workflow,
            stage,
            run,
            snapshot,
            settled: false,
        }
    }

    pub fn id(&self) -> RunId {
        self.run.id()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Text streamed so far. Not yet part of the article.
    pub fn partial_text(&self) -> &str {
        self.run.partial_text()
    }

    /// The committed article as it stands during the stage.
    pub fn article(&self) -> &Article {
        &self.workflow.article
    }

    /// Waits for the next update. Returns `None` once the stage has settled.
    pub async fn next(&mut self) -> Option<StageUpdate> {
        if self.settled {
            return None;
        }

        let update = match self.run.next().await? {
            TaskUpdate::Partial { delta, progress } => StageUpdate::Partial { delta, progress },
            TaskUpdate::Completed { text, progress } => StageUpdate::Completed {
                revision: self.commit(text),
                progress,
            },
            TaskUpdate::Failed { message, progress } => {
                self.fail(message.clone());
                StageUpdate::Failed { message, progress }
            }
        };
        Some(update)
    }

    /// Drives the stage to its end.
    pub async fn finish(mut self) -> StageOutcome {
        while let Some(update) = self.next().await {
            match update {
                StageUpdate::Partial { .. } => {}
                StageUpdate::Completed { revision, .. } => {
                    return StageOutcome::Committed { revision }
                }
                StageUpdate::Failed { message, .. } => return StageOutcome::Failed { message },
            }
        }
        StageOutcome::Committed {
            revision: self.workflow.article.revision(),
        }
    }

    fn commit(&mut self, text: String) -> u64 {
        let workflow = &mut *self.workflow;
        workflow.article.commit(text, self.stage);
        workflow.settle(WorkflowState::Ready);
        self.settled = true;
        info!(
            run_id = %self.run.id(),
            stage = %self.stage,
            revision = workflow.article.revision(),
            chars = workflow.article.char_count(),
            committed_at = ?workflow.article.committed_at().map(|at| at.as_datetime().to_rfc3339()),
            "Stage committed"
        );
        workflow.article.revision()
    }

    fn fail(&mut self, message: String) {
        let workflow = &mut *self.workflow;
        if let Some(snapshot) = self.snapshot.take() {
            workflow.article = snapshot;
        }
        workflow.last_notice = Some(message);
        workflow.settle(WorkflowState::Ready);
        self.settled = true;
    }
}

impl<'a, G: TextGenerator + ?Sized> Drop for StageRun<'a, G> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(
            run_id = %self.run.id(),
            stage = %self.stage,
            received_chars = self.run.partial_text().chars().count(),
            "Stage abandoned before completion"
        );
        // Nothing was ever committed: back to where the session started.
        let target = if self.workflow.article.revision() == 0 {
            WorkflowState::Idle
        } else {
            WorkflowState::Ready
        };
        self.workflow.settle(target);
        self.settled = true;
    }
}
