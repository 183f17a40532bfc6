//! Pull-based consumption of one generation stream.
//!
//! A [`TaskRun`] accumulates streamed text and projects progress. The caller
//! drives it with [`TaskRun::next`] and regains control after every token;
//! dropping the run cancels the stream.

use futures::StreamExt;
use tracing::{debug, warn};

use crate::domain::foundation::{Percentage, RunId};
use crate::domain::progress::ProgressEstimate;
use crate::domain::prompts::{RenderedPrompt, TaskKind};
use crate::ports::{GenerationRequest, StreamResult, TextGenerator, Token, TokenStream};

/// What happened on one step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    /// A text token arrived.
    Partial { delta: String, progress: Percentage },
    /// The stream ended normally. `text` is everything received.
    Completed { text: String, progress: Percentage },
    /// The stream ended with an error message.
    Failed { message: String, progress: Percentage },
}

impl TaskUpdate {
    pub fn progress(&self) -> Percentage {
        match self {
            TaskUpdate::Partial { progress, .. }
            | TaskUpdate::Completed { progress, .. }
            | TaskUpdate::Failed { progress, .. } => *progress,
        }
    }

    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskUpdate::Partial { .. })
    }
}

/// One in-flight generation: the token stream plus its accumulator and
/// progress estimate.
pub struct TaskRun {
    id: RunId,
    task: TaskKind,
    stream: TokenStream,
    text: String,
    progress: ProgressEstimate,
    finished: bool,
}

impl TaskRun {
    /// Starts streaming `prompt` from `generator`.
    ///
    /// Nothing is sent until the first call to [`TaskRun::next`].
    pub fn start<G>(generator: &G, prompt: RenderedPrompt) -> Self
    where
        G: TextGenerator + ?Sized,
    {
        let task = prompt.task;
        let id = RunId::new();
        debug!(run_id = %id, task = %task, max_tokens = prompt.token_budget, "Starting run");
        Self {
            id,
            task,
            stream: generator.stream(GenerationRequest::from(prompt)),
            text: String::new(),
            progress: ProgressEstimate::for_task(task),
            finished: false,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// Text received so far.
    pub fn partial_text(&self) -> &str {
        &self.text
    }

    /// Returns true once a terminal update has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Waits for the next token. Returns `None` after the terminal update.
    pub async fn next(&mut self) -> Option<TaskUpdate> {
        if self.finished {
            return None;
        }

        match self.stream.next().await {
            Some(Token::Text(delta)) => {
                self.text.push_str(&delta);
                let (progress, percentage) = self.progress.advance();
                self.progress = progress;
                Some(TaskUpdate::Partial {
                    delta,
                    progress: percentage,
                })
            }
            Some(Token::Error(message)) => {
                self.finished = true;
                warn!(run_id = %self.id, task = %self.task, error = %message, "Run failed");
                Some(TaskUpdate::Failed {
                    message,
                    progress: self.progress.finish(),
                })
            }
            None => {
                self.finished = true;
                debug!(
                    run_id = %self.id,
                    task = %self.task,
                    tokens = self.progress.steps_seen(),
                    "Run completed"
                );
                Some(TaskUpdate::Completed {
                    text: self.text.clone(),
                    progress: self.progress.finish(),
                })
            }
        }
    }

    /// Drains the run and returns how it ended.
    pub async fn finish(mut self) -> StreamResult {
        while let Some(update) = self.next().await {
            match update {
                TaskUpdate::Partial { .. } => {}
                TaskUpdate::Completed { text, .. } => return StreamResult::Completed(text),
                TaskUpdate::Failed { message, .. } => return StreamResult::Failed(message),
            }
        }
        StreamResult::Completed(std::mem::take(&mut self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockTextGenerator;
    use crate::domain::prompts::PromptBuilder;
    use crate::ports::GenerationError;

    fn chat_prompt() -> RenderedPrompt {
        PromptBuilder::default().chat_turn("halo").unwrap()
    }

    #[tokio::test]
    async fn partial_updates_accumulate_text() {
        let generator = MockTextGenerator::new().with_tokens(["Hello, ", "world!"]);
        let mut run = TaskRun::start(&generator, chat_prompt());

        let first = run.next().await.unwrap();
        assert!(matches!(first, TaskUpdate::Partial { ref delta, .. } if delta == "Hello, "));
        assert_eq!(run.partial_text(), "Hello, ");

        run.next().await.unwrap();
        assert_eq!(run.partial_text(), "Hello, world!");

        let last = run.next().await.unwrap();
        assert_eq!(
            last,
            TaskUpdate::Completed {
                text: "Hello, world!".to_string(),
                progress: Percentage::HUNDRED
            }
        );
        assert!(run.next().await.is_none());
    }

    #[tokio::test]
    async fn error_token_is_terminal() {
        let generator = MockTextGenerator::new()
            .with_failure_after(["a"], GenerationError::backend("boom"));
        let mut run = TaskRun::start(&generator, chat_prompt());

        run.next().await.unwrap();
        let update = run.next().await.unwrap();

        assert!(update.is_terminal());
        assert_eq!(
            update,
            TaskUpdate::Failed {
                message: "Backend reported an error: boom".to_string(),
                progress: Percentage::HUNDRED
            }
        );
        assert!(run.is_finished());
        assert!(run.next().await.is_none());
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_hundred_only_at_end() {
        let fragments: Vec<String> = (0..100).map(|i| format!("t{} ", i)).collect();
        let generator = MockTextGenerator::new().with_tokens(fragments);
        let mut run = TaskRun::start(&generator, chat_prompt());

        let mut last = Percentage::ZERO;
        let mut hundreds = 0;
        while let Some(update) = run.next().await {
            assert!(update.progress() >= last);
            if update.progress().is_complete() {
                hundreds += 1;
                assert!(update.is_terminal());
            }
            last = update.progress();
        }
        assert_eq!(hundreds, 1);
    }

    #[tokio::test]
    async fn finish_drains_to_result() {
        let generator = MockTextGenerator::new().with_tokens(["seo, ", "kopi"]);
        let run = TaskRun::start(&generator, chat_prompt());

        assert_eq!(run.finish().await, StreamResult::Completed("seo, kopi".to_string()));
    }

    #[tokio::test]
    async fn run_carries_task_and_budget() {
        let generator = MockTextGenerator::new();
        let prompt = PromptBuilder::default().keywords("kopi", 4).unwrap();
        let run = TaskRun::start(&generator, prompt);

        assert_eq!(run.task(), TaskKind::Keywords);
        assert_eq!(generator.get_calls()[0].max_tokens, 60);
    }
}
