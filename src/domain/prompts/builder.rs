//! Prompt builders: task parameters in, prompt text and token budget out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::TaskKind;
use super::templates::{self, DEFAULT_STYLE_INSTRUCTION};

/// Humanize refuses input shorter than this many characters.
pub const MIN_HUMANIZE_CHARS: usize = 10;

/// Shown instead of calling the backend when the humanize input is too short.
pub const TOO_SHORT_NOTICE: &str = "The text is too short to rewrite in a conversational style.";

const HUMANIZE_BUDGET_BASE: u32 = 250;
const CHAT_TURN_BUDGET: u32 = 400;
const SEO_ANALYSIS_BUDGET: u32 = 400;

/// Input rejected before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("The {field} for the {task} cannot be empty.")]
    EmptyInput { task: TaskKind, field: &'static str },

    #[error("{}", TOO_SHORT_NOTICE)]
    TooShort { min_chars: usize, actual: usize },

    #[error("The {task} limit must be at least 1, got {limit}.")]
    InvalidLimit { task: TaskKind, limit: u32 },
}

/// What the caller asked for: a task, its text input and, for sized tasks,
/// a numeric limit (keyword count, max characters or approximate tokens).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub task: TaskKind,
    pub text: String,
    pub limit: Option<u32>,
}

impl PromptSpec {
    pub fn new(task: TaskKind, text: impl Into<String>) -> Self {
        Self {
            task,
            text: text.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A prompt ready to send, with the token budget to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub task: TaskKind,
    pub text: String,
    pub token_budget: u32,
}

/// Builds prompts with a fixed style instruction.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    style: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STYLE_INSTRUCTION)
    }
}

impl PromptBuilder {
    /// Creates a builder that appends `style` to every prompt.
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
        }
    }

    /// The style instruction embedded in every prompt.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Builds the prompt for any task from a [`PromptSpec`].
    ///
    /// Sized tasks without a limit fall back to their usual default.
    pub fn build(&self, spec: &PromptSpec) -> Result<RenderedPrompt, PromptError> {
        match spec.task {
            TaskKind::Keywords => self.keywords(&spec.text, spec.limit.unwrap_or(10)),
            TaskKind::MetaTitle => self.meta_title(&spec.text, spec.limit.unwrap_or(60)),
            TaskKind::MetaDescription => {
                self.meta_description(&spec.text, spec.limit.unwrap_or(160))
            }
            TaskKind::ArticleDraft => self.article_draft(&spec.text, spec.limit.unwrap_or(400)),
            TaskKind::Humanize => self.humanize(&spec.text),
            TaskKind::SeoAnalysis => self.seo_analysis(&spec.text),
            TaskKind::ChatTurn => self.chat_turn(&spec.text),
        }
    }

    /// Keyword list; budget is 15 tokens per keyword.
    pub fn keywords(&self, topic: &str, count: u32) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::Keywords;
        let topic = require_text(task, "topic", topic)?;
        require_limit(task, count)?;
        Ok(rendered(
            task,
            templates::keywords(topic, count, &self.style),
            count.saturating_mul(15),
        ))
    }

    /// Meta title; budget is a third of the character limit.
    pub fn meta_title(&self, topic: &str, max_chars: u32) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::MetaTitle;
        let topic = require_text(task, "topic", topic)?;
        require_limit(task, max_chars)?;
        Ok(rendered(
            task,
            templates::meta_title(topic, max_chars, &self.style),
            max_chars / 3,
        ))
    }

    /// Meta description; budget is a third of the character limit.
    pub fn meta_description(
        &self,
        topic: &str,
        max_chars: u32,
    ) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::MetaDescription;
        let topic = require_text(task, "topic", topic)?;
        require_limit(task, max_chars)?;
        Ok(rendered(
            task,
            templates::meta_description(topic, max_chars, &self.style),
            max_chars / 3,
        ))
    }

    /// Article draft; the caller's approximate length is the budget.
    pub fn article_draft(
        &self,
        idea: &str,
        approx_tokens: u32,
    ) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::ArticleDraft;
        let idea = require_text(task, "idea", idea)?;
        require_limit(task, approx_tokens)?;
        Ok(rendered(
            task,
            templates::article_draft(idea, approx_tokens, &self.style),
            approx_tokens,
        ))
    }

    /// Humanize rewrite; budget is half the source length plus a fixed margin.
    ///
    /// The source is embedded untrimmed.
    pub fn humanize(&self, source: &str) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::Humanize;
        require_text(task, "text", source)?;
        let chars = source.chars().count();
        if chars < MIN_HUMANIZE_CHARS {
            return Err(PromptError::TooShort {
                min_chars: MIN_HUMANIZE_CHARS,
                actual: chars,
            });
        }
        let half = u32::try_from(chars / 2).unwrap_or(u32::MAX);
        Ok(rendered(
            task,
            templates::humanize(source, &self.style),
            half.saturating_add(HUMANIZE_BUDGET_BASE),
        ))
    }

    /// Basic on-page SEO review of extracted page text.
    pub fn seo_analysis(&self, page_text: &str) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::SeoAnalysis;
        let page_text = require_text(task, "page text", page_text)?;
        Ok(rendered(
            task,
            templates::seo_analysis(page_text, &self.style),
            SEO_ANALYSIS_BUDGET,
        ))
    }

    /// One chat reply; history is not carried between turns.
    pub fn chat_turn(&self, utterance: &str) -> Result<RenderedPrompt, PromptError> {
        let task = TaskKind::ChatTurn;
        let utterance = require_text(task, "message", utterance)?;
        Ok(rendered(
            task,
            templates::chat_turn(utterance, &self.style),
            CHAT_TURN_BUDGET,
        ))
    }
}

fn require_text<'a>(
    task: TaskKind,
    field: &'static str,
    text: &'a str,
) -> Result<&'a str, PromptError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(PromptError::EmptyInput { task, field })
    } else {
        Ok(trimmed)
    }
}

fn require_limit(task: TaskKind, limit: u32) -> Result<(), PromptError> {
    if limit == 0 {
        Err(PromptError::InvalidLimit { task, limit })
    } else {
        Ok(())
    }
}

fn rendered(task: TaskKind, text: String, token_budget: u32) -> RenderedPrompt {
    RenderedPrompt {
        task,
        text,
        token_budget,
    }
}
