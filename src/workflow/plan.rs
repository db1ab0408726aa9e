use crate::config::Config;
use crate::domain::Step;

/// Ordered list of steps executed by a promote run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    steps: Vec<Step>,
}

impl Workflow {
    /// Build the promote sequence from configuration.
    ///
    /// checkout(target), merge(source), checkout(source), then one push per
    /// remote in the configured order.
    pub fn from_config(config: &Config) -> Self {
        let target = &config.branches.target;
        let source = &config.branches.source;

        let mut steps = vec![
            Step::checkout(target.as_str()),
            Step::merge(source.as_str()),
            Step::checkout(source.as_str()),
        ];
        steps.extend(
            config
                .resolved_remotes()
                .into_iter()
                .map(|remote| Step::push(remote.name, remote.branches)),
        );

        Workflow { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Workflow::from_config(&Config::default())
    }
}
