// CLI output formatting with consistent styling using colored.
// Engine logs go to stderr through tracing; everything here is stdout.

use crate::error::CheckIssue;
use colored::Colorize as _;
use miette::Diagnostic as _;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

/// Plain `severity[code]: message` line for an issue.
pub fn describe_issue(issue: &CheckIssue) -> String {
    let code = issue.code().map(|code| code.to_string()).unwrap_or_default();
    let severity = if issue.is_error() { "error" } else { "warning" };
    format!("{}[{}]: {}", severity, code, issue)
}

pub fn print_check_header(assets_dir: &Path, languages: &[String]) {
    println!(
        "{} {} ({})",
        "Checking".dimmed(),
        assets_dir.display().to_string().green(),
        languages.join(", ").cyan()
    );
}

pub fn print_issue(issue: &CheckIssue) {
    let code = issue.code().map(|code| code.to_string()).unwrap_or_default();
    let severity = if issue.is_error() {
        "error".red().bold()
    } else {
        "warning".yellow().bold()
    };
    println!("{}{}: {}", severity, format!("[{}]", code).dimmed(), issue);
}

pub fn print_check_summary(error_count: usize, warning_count: usize) {
    let errors = format!("{} error(s)", error_count);
    let warnings = format!("{} warning(s)", warning_count);
    println!(
        "{}, {}",
        if error_count > 0 { errors.red() } else { errors.green() },
        if warning_count > 0 {
            warnings.yellow()
        } else {
            warnings.green()
        }
    );
}

pub fn print_check_success() {
    println!("{}", "No issues found".green());
}

pub fn print_resolved(value: &str) {
    println!("{}", value);
}
