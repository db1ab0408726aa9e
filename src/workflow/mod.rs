//! The promote workflow: which steps run, and running them.

pub mod plan;
pub mod runner;

pub use plan::Workflow;
pub use runner::{RunReport, StepFailure, StepOutcome, WorkflowRunner};
