//! State machine trait for lifecycle enums.
//!
//! Gives every lifecycle enum the same validated `transition_to` so callers never
//! assign a new state without checking the transition table first.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors define the transition table; `transition_to` is provided.
///
/// ```ignore
/// let next = WorkflowState::Ready.transition_to(WorkflowState::Humanizing)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state has no outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Upload {
        Queued,
        Sending,
        Sent,
    }

    impl StateMachine for Upload {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Upload::*;
            match self {
                Queued => vec![Sending],
                Sending => vec![Queued, Sent],
                Sent => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Upload::Queued.transition_to(Upload::Sending), Ok(Upload::Sending));
    }

    #[test]
    fn transition_to_reports_both_states_on_failure() {
        let err = Upload::Queued.transition_to(Upload::Sent).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'state_transition' has invalid format: Cannot transition from Queued to Sent"
        );
    }

    #[test]
    fn is_terminal_follows_transition_table() {
        assert!(Upload::Sent.is_terminal());
        assert!(!Upload::Sending.is_terminal());
    }
}
