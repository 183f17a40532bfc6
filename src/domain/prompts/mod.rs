//! Prompt construction for every generation task.

mod builder;
mod task;
mod templates;

pub use builder::{
    PromptBuilder, PromptError, PromptSpec, RenderedPrompt, MIN_HUMANIZE_CHARS, TOO_SHORT_NOTICE,
};
pub use task::TaskKind;
pub use templates::DEFAULT_STYLE_INSTRUCTION;
