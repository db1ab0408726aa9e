use tracing::{debug, info, warn};

use crate::domain::Step;
use crate::git::VersionControl;
use crate::workflow::Workflow;

/// Why a single step did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub message: String,
    /// Exit status of the external tool, when it reported one
    pub exit_code: Option<i32>,
}

/// A step together with what happened when it ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub result: Result<(), StepFailure>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of one run, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub outcomes: Vec<StepOutcome>,
    /// Branch checked out after the last step, if it could be determined
    pub final_branch: Option<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit code: that of the final step.
    ///
    /// Earlier failures do not affect it.
    pub fn exit_code(&self) -> i32 {
        match self.outcomes.last().map(|o| &o.result) {
            Some(Err(failure)) => failure.exit_code.filter(|code| *code != 0).unwrap_or(1),
            _ => 0,
        }
    }
}

/// Runs every step of a workflow in order, whatever the earlier steps did.
pub struct WorkflowRunner {
    workflow: Workflow,
}

impl WorkflowRunner {
    pub fn new(workflow: Workflow) -> Self {
        WorkflowRunner { workflow }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn run<V: VersionControl + ?Sized>(&self, vcs: &mut V) -> RunReport {
        let total = self.workflow.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, step) in self.workflow.steps().iter().enumerate() {
            info!(step = index + 1, total, command = %step, "Running step");

            let result = vcs.apply(step).map_err(|err| {
                warn!(command = %step, error = %err, "Step failed, continuing");
                StepFailure {
                    message: err.to_string(),
                    exit_code: err.exit_code(),
                }
            });

            outcomes.push(StepOutcome {
                step: step.clone(),
                result,
            });
        }

        let final_branch = match vcs.current_branch() {
            Ok(branch) => branch,
            Err(err) => {
                debug!(error = %err, "Could not read the current branch");
                None
            }
        };

        RunReport {
            outcomes,
            final_branch,
        }
    }
}
