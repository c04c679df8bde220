//! CLI console utilities

use colored::*;
use snipbox_core::{OutcomeKind, Report, SyntaxReport};

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print table header
    pub fn print_table_header(&self, headers: &[&str]) {
        let row = headers
            .iter()
            .map(|h| format!("{:<14}", h))
            .collect::<String>();
        println!("{}", row.bold());
        println!("{}", "-".repeat(row.len()).dimmed());
    }

    /// Print table row
    pub fn print_table_row(&self, columns: &[&str]) {
        let row = columns
            .iter()
            .map(|c| format!("{:<14}", c))
            .collect::<String>();
        println!("{}", row);
    }

    /// Print an execution report with a colored status line
    pub fn print_report(&self, report: &Report) {
        let result = &report.result;
        let status = match result.kind() {
            OutcomeKind::Success => "✓ success".green().bold(),
            OutcomeKind::CompileFailure => "✗ did not compile".red().bold(),
            OutcomeKind::RuntimeFailure => "✗ ran but failed".red().bold(),
            OutcomeKind::Timeout => "⏱ timed out".yellow().bold(),
            OutcomeKind::OutputExceeded => "⚠ too much output".yellow().bold(),
            OutcomeKind::LaunchFailed => "✗ could not start".red().bold(),
        };
        println!("{} {}", status, format!("[{}]", result.language).dimmed());

        if self.verbose {
            if let Some(compile) = result.compile_duration {
                println!("{}", format!("compile: {:.2?}", compile).dimmed());
            }
            println!("{}", format!("run: {:.2?}", result.execute_duration).dimmed());
        }

        println!("{}", report.render());
    }

    pub fn print_syntax_report(&self, report: &SyntaxReport) {
        if report.ok() {
            self.success(&report.render());
        } else {
            self.error(&report.render());
        }
    }
}
