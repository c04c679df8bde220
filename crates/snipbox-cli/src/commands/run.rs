//! Run, code and check commands

use crate::console::CliConsole;
use anyhow::Result;
use snipbox_core::Environment;
use std::path::Path;

/// Output settings shared by the one-shot commands
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub verbose: bool,
}

/// Execute a file; returns whether the program succeeded
pub async fn run_file(env: &Environment, file: &Path, output: OutputOptions) -> Result<bool> {
    let report = env.execute(file).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report.result)?);
    } else {
        CliConsole::new(output.verbose).print_report(&report);
    }
    Ok(report.success())
}

/// Execute inline code; returns whether the program succeeded
pub async fn run_code(
    env: &Environment,
    language: &str,
    code: &str,
    output: OutputOptions,
) -> Result<bool> {
    let report = env.execute_code(code, language).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report.result)?);
    } else {
        CliConsole::new(output.verbose).print_report(&report);
    }
    Ok(report.success())
}

/// Syntax-check a file; returns whether the check passed
pub async fn check_file(env: &Environment, file: &Path, output: OutputOptions) -> Result<bool> {
    let report = env.check_syntax(file).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        CliConsole::new(output.verbose).print_syntax_report(&report);
    }
    Ok(report.ok())
}
