//! The article and the lifecycle of the workflow that produces it.

#[allow(clippy::module_inception)]
mod article;
mod state;

pub use article::Article;
pub use state::{Stage, WorkflowState};
