pub mod orchestration;

pub use orchestration::{Backend, PromoteWorkflowArgs};
