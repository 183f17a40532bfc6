//! Writing style configuration

use serde::Deserialize;

use super::error::ConfigValidationError;
use crate::domain::prompts::{PromptBuilder, DEFAULT_STYLE_INSTRUCTION};

/// Writing style configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WritingConfig {
    /// Instruction appended to every prompt
    #[serde(default = "default_style_instruction")]
    pub style_instruction: String,
}

impl WritingConfig {
    /// Prompt builder using the configured style.
    pub fn prompt_builder(&self) -> PromptBuilder {
        PromptBuilder::new(self.style_instruction.trim())
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.style_instruction.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("WRITING__STYLE_INSTRUCTION"));
        }
        Ok(())
    }
}

impl Default for WritingConfig {
    fn default() -> Self {
        Self {
            style_instruction: default_style_instruction(),
        }
    }
}

fn default_style_instruction() -> String {
    DEFAULT_STYLE_INSTRUCTION.to_string()
}
