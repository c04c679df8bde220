//! Interactive mode

use super::run::{OutputOptions, check_file, run_code, run_file};
use crate::console::CliConsole;
use anyhow::Result;
use colored::*;
use snipbox_core::Environment;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// How often the background sweep runs while the prompt is open
const CLEANUP_PERIOD: Duration = Duration::from_secs(600);

/// Line that ends a multi-line `/code` block
const END_OF_CODE: &str = "/end";

/// One line of input at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Run(PathBuf),
    /// Inline code; `None` starts a multi-line block closed by `/end`
    Code {
        language: String,
        code: Option<String>,
    },
    Check(PathBuf),
    Languages,
    Metrics,
    Help,
    Exit,
    Empty,
    Invalid(String),
}

/// Parse one prompt line
pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if matches!(line, "exit" | "quit" | "/exit" | "/quit") {
        return ReplCommand::Exit;
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/run" if !rest.is_empty() => ReplCommand::Run(PathBuf::from(rest)),
        "/check" if !rest.is_empty() => ReplCommand::Check(PathBuf::from(rest)),
        "/code" if !rest.is_empty() => {
            let (language, code) = match rest.split_once(char::is_whitespace) {
                Some((language, code)) => (language, Some(code.trim().to_string())),
                None => (rest, None),
            };
            ReplCommand::Code {
                language: language.to_string(),
                code,
            }
        }
        "/run" | "/check" | "/code" => {
            ReplCommand::Invalid(format!("{} needs an argument (see /help)", command))
        }
        "/languages" => ReplCommand::Languages,
        "/metrics" => ReplCommand::Metrics,
        "/help" => ReplCommand::Help,
        _ => ReplCommand::Invalid(format!("Unknown command: {}", command)),
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /run <file>             execute a source file");
    println!("  /code <lang> <code>     execute one line of code");
    println!("  /code <lang>            execute the following lines, ended by {}", END_OF_CODE);
    println!("  /check <file>           check syntax without running");
    println!("  /languages              list supported languages");
    println!("  /metrics                show execution counters");
    println!("  /help                   show this help");
    println!("  exit                    leave");
}

fn prompt() {
    print!("{} ", "snipbox>".cyan().bold());
    let _ = std::io::stdout().flush();
}

/// Run the prompt until `exit` or end of input
pub async fn interactive_mode(env: &Environment, output: OutputOptions) -> Result<()> {
    let console = CliConsole::new(output.verbose);
    console.print_header("Snipbox Interactive Mode");
    println!("Type /help for commands, exit to leave.");

    let cancel = CancellationToken::new();
    let sweeper = env.spawn_cleanup(CLEANUP_PERIOD, cancel.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = match parse_line(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Help => {
                print_help();
                continue;
            }
            ReplCommand::Invalid(message) => {
                console.error(&message);
                continue;
            }
            ReplCommand::Languages => super::languages::show_languages(env, output.json),
            ReplCommand::Metrics => {
                println!("{}", env.metrics().to_json()?);
                continue;
            }
            ReplCommand::Run(file) => run_file(env, &file, output).await.map(|_| ()),
            ReplCommand::Check(file) => check_file(env, &file, output).await.map(|_| ()),
            ReplCommand::Code {
                language,
                code: Some(code),
            } => run_code(env, &language, &code, output).await.map(|_| ()),
            ReplCommand::Code {
                language,
                code: None,
            } => {
                let mut block = String::new();
                while let Some(line) = lines.next_line().await? {
                    if line.trim() == END_OF_CODE {
                        break;
                    }
                    block.push_str(&line);
                    block.push('\n');
                }
                run_code(env, &language, &block, output).await.map(|_| ())
            }
        };

        // Request errors are shown and the prompt continues
        if let Err(e) = outcome {
            console.error(&e.to_string());
        }
    }

    cancel.cancel();
    let _ = sweeper.await;
    console.info("Goodbye!");
    Ok(())
}
