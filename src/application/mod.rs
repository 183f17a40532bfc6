//! Application layer - stage orchestration and standalone tasks.
//!
//! This layer drives the domain through the ports:
//! - `workflow` - Generate, Humanize and Tidy over the current article
//! - `seo_tasks` - keywords, meta tags, chat and page analysis
//! - `task_run` - pull-based consumption of one generation stream

pub mod seo_tasks;
pub mod task_run;
pub mod workflow;

pub use seo_tasks::{AnalysisOutcome, AnalysisPhase, SeoTasks, TaskError, NO_ANALYSIS_NOTICE,
    NO_TEXT_NOTICE,
};
pub use task_run::{TaskRun, TaskUpdate};
pub use workflow::{ArticleWorkflow, StageOutcome, StageRun, StageUpdate, WorkflowError};
