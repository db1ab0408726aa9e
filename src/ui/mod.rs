//! User interface module.
//!
//! git-promote never prompts; output is limited to errors and the optional
//! run summary.

pub mod formatter;

pub use formatter::{display_error, display_report, format_outcome, format_totals};
