//! Terminal side of execution: per-node progress, confirmation and summaries

use anyhow::Result;
use colored::{ColoredString, Colorize};
use declarative::{ApplyError, ApplyResult, ExecuteSummary, LogicalId, ProgressCallback};

/// Prints one line per processed node
pub struct TerminalProgress {
    verbose: bool,
    quiet: bool,
}

impl TerminalProgress {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_resource_start(&mut self, id: &LogicalId, description: &str) {
        if self.verbose && !self.quiet {
            println!("  {} {} {}", "→".cyan(), id, description.dimmed());
        }
    }

    fn on_resource_complete(&mut self, id: &LogicalId, result: &ApplyResult) {
        if self.quiet && result.is_success() {
            return;
        }
        println!(
            "    {} {:<22} {}",
            result_symbol(result),
            id.as_str(),
            result_label(result)
        );
    }
}

fn result_symbol(result: &ApplyResult) -> ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => "✓".green(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

fn result_label(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => "unchanged".to_string(),
        ApplyResult::Created => "created".to_string(),
        ApplyResult::Modified => "updated".to_string(),
        ApplyResult::Removed => "removed".to_string(),
        ApplyResult::Failed { error } => error.clone(),
        ApplyResult::Skipped { reason } => format!("skipped ({reason})"),
    }
}

/// Confirm with user
pub fn confirm_proceed(prompt: &str, default: bool) -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary, verb: &str) {
    println!();
    if summary.is_success() {
        println!("  {} Stack {} successfully!", "✓".green().bold(), verb);
    } else {
        println!("  {} Stack {} with errors", "⚠".yellow().bold(), verb);
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} resources updated", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} resources removed", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} resources unchanged", summary.no_change);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

/// Print each failure with its error category
pub fn print_failures(failures: &[ApplyError]) {
    if failures.is_empty() {
        return;
    }

    println!();
    for failure in failures {
        eprintln!("  {} {}", "✗".red(), failure_line(failure));
    }
}

fn failure_line(failure: &ApplyError) -> String {
    format!(
        "{} ({})",
        failure,
        failure.source.category().description().dimmed()
    )
}
