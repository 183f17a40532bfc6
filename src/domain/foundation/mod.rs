//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and error types
//! that form the vocabulary of the article workflow.

mod errors;
mod ids;
mod percentage;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::RunId;
pub use percentage::Percentage;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
