//! Formatting functions for terminal output.
//!
//! Everything here renders to a `String` first so the layout is testable;
//! the `display_*` functions only print.

use console::style;

use crate::workflow::{RunReport, StepOutcome};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// One summary line for a step: mark, command, and failure reason.
pub fn format_outcome(outcome: &StepOutcome) -> String {
    match &outcome.result {
        Ok(()) => format!("{} {}", style("✓").green(), outcome.step),
        Err(failure) => format!(
            "{} {} {}",
            style("✗").red(),
            outcome.step,
            style(format!("({})", failure.message)).dim()
        ),
    }
}

/// Totals line plus the branch left checked out.
pub fn format_totals(report: &RunReport) -> String {
    let counts = format!(
        "{} of {} steps succeeded",
        report.succeeded(),
        report.outcomes.len()
    );
    let counts = if report.all_succeeded() {
        style(counts).green().bold().to_string()
    } else {
        style(counts).yellow().bold().to_string()
    };

    match &report.final_branch {
        Some(branch) => format!("{}, now on '{}'", counts, branch),
        None => format!("{}, HEAD is detached or unknown", counts),
    }
}

/// Print a per-step summary of a run to stderr.
pub fn display_report(report: &RunReport) {
    eprintln!();
    eprintln!("{}", style("Promote summary:").bold());
    for outcome in &report.outcomes {
        eprintln!("  {}", format_outcome(outcome));
    }
    eprintln!("{}", format_totals(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Step;
    use crate::workflow::StepFailure;

    fn plain(text: String) -> String {
        console::strip_ansi_codes(&text).into_owned()
    }

    #[test]
    fn test_format_successful_outcome() {
        let outcome = StepOutcome {
            step: Step::merge("develop"),
            result: Ok(()),
        };
        assert_eq!(plain(format_outcome(&outcome)), "✓ git merge develop");
    }

    #[test]
    fn test_format_failed_outcome() {
        let outcome = StepOutcome {
            step: Step::push("github", ["master"]),
            result: Err(StepFailure {
                message: "rejected".to_string(),
                exit_code: Some(1),
            }),
        };
        assert_eq!(
            plain(format_outcome(&outcome)),
            "✗ git push github master (rejected)"
        );
    }

    #[test]
    fn test_format_totals() {
        let report = RunReport {
            outcomes: vec![StepOutcome {
                step: Step::checkout("develop"),
                result: Ok(()),
            }],
            final_branch: Some("develop".to_string()),
        };
        assert_eq!(
            plain(format_totals(&report)),
            "1 of 1 steps succeeded, now on 'develop'"
        );
    }

    #[test]
    fn test_format_totals_without_branch() {
        let report = RunReport::default();
        assert!(plain(format_totals(&report)).ends_with("HEAD is detached or unknown"));
    }
}
