//! Workflow lifecycle states and the stages that move between them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// A transformation the workflow can run on the article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    Humanize,
    Tidy,
}

impl Stage {
    /// The state the workflow is in while this stage runs.
    pub fn running_state(&self) -> WorkflowState {
        match self {
            Stage::Generate => WorkflowState::Generating,
            Stage::Humanize => WorkflowState::Humanizing,
            Stage::Tidy => WorkflowState::Tidying,
        }
    }

    /// Returns true if the stage consumes a token stream.
    pub fn is_streaming(&self) -> bool {
        !matches!(self, Stage::Tidy)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Generate => "generate",
            Stage::Humanize => "humanize",
            Stage::Tidy => "tidy",
        };
        write!(f, "{}", s)
    }
}

/// Where the article workflow currently is.
///
/// `Idle` until the first article is committed; a first generate that is
/// abandoned falls back to it. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    Generating,
    Ready,
    Humanizing,
    Tidying,
}

impl WorkflowState {
    /// Returns true while a stage is running.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Generating | WorkflowState::Humanizing | WorkflowState::Tidying
        )
    }
}

impl StateMachine for WorkflowState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use WorkflowState::*;
        matches!(
            (self, target),
            (Idle, Generating)
                | (Generating, Ready)
                | (Generating, Idle)
                | (Ready, Generating)
                | (Ready, Humanizing)
                | (Ready, Tidying)
                | (Humanizing, Ready)
                | (Tidying, Ready)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use WorkflowState::*;
        match self {
            Idle => vec![Generating],
            Generating => vec![Ready, Idle],
            Ready => vec![Generating, Humanizing, Tidying],
            Humanizing => vec![Ready],
            Tidying => vec![Ready],
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::Generating => "Generating",
            WorkflowState::Ready => "Ready",
            WorkflowState::Humanizing => "Humanizing",
            WorkflowState::Tidying => "Tidying",
        };
        write!(f, "{}", s)
    }
}
