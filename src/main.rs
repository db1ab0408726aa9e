use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use git_promote::cli::{Backend, PromoteWorkflowArgs};
use git_promote::cli::orchestration::run_promote_workflow;
use git_promote::logging::init_logging;
use git_promote::ui;
use git_promote::workflow::RunReport;

/// Exit code for failures that happen before any git step runs
const SETUP_FAILURE: u8 = 2;

#[derive(clap::Parser)]
#[command(
    name = "git-promote",
    version,
    about = "Merge develop into master and push both branches to every remote"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, default_value = ".", help = "Repository to operate on; its gitpromote.toml is used when --config is not given")]
    repo: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Git, help = "How git operations are performed")]
    backend: Backend,

    #[arg(long, help = "Print a per-step summary after the run")]
    summary: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(report) => {
            if args.summary {
                ui::display_report(&report);
            }
            ExitCode::from(exit_status(&report))
        }
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::from(SETUP_FAILURE)
        }
    }
}

fn run(args: &Args) -> Result<RunReport> {
    let workflow_args = PromoteWorkflowArgs {
        config_path: args.config.clone(),
        repo: args.repo.clone(),
        backend: args.backend,
    };

    run_promote_workflow(&workflow_args)
        .with_context(|| format!("cannot promote in {}", args.repo.display()))
}

fn exit_status(report: &RunReport) -> u8 {
    u8::try_from(report.exit_code()).unwrap_or(1)
}
