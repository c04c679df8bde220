//! CLI argument definitions using clap
//!
//! - snipbox                        # Interactive mode (default)
//! - snipbox run main.c             # Execute a file
//! - snipbox code python "print(1)" # Execute inline code
//! - snipbox check main.go          # Syntax check only
//! - snipbox languages / cleanup    # Utility commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "snipbox")]
#[command(about = "Snipbox - run code snippets under time and output limits")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "SNIPBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Working directory for staged and temporary files
    #[arg(long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a source file
    Run {
        /// Source file; the language is taken from its extension
        file: PathBuf,
    },

    /// Execute inline code
    Code {
        /// Language name, alias or extension (python, js, c++, .go, ...)
        language: String,

        /// Code to run; joined with spaces
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        code: Vec<String>,
    },

    /// Check syntax without running
    Check { file: PathBuf },

    /// List supported languages
    Languages,

    /// Remove temporary files from the working directory
    Cleanup {
        /// Only remove files older than this (e.g. 30m, 2h)
        #[arg(long, value_parser = parse_duration)]
        older_than: Option<Duration>,
    },

    /// Interactive prompt (default when no command is given)
    Interactive,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}
