//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;
use crate::commands::run::OutputOptions;
use anyhow::Result;
use snipbox_core::{Environment, SnipboxConfig};
use std::process::ExitCode;

/// Route CLI commands to their respective handlers.
///
/// One-shot commands exit with status 1 when the program (or syntax check)
/// did not succeed.
pub async fn route(cli: Cli, config: SnipboxConfig) -> Result<ExitCode> {
    tracing::debug!("Command: {:?}", cli.command);
    let env = Environment::new(config)?;
    let output = OutputOptions {
        json: cli.json,
        verbose: cli.verbose,
    };

    let succeeded = match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Run { file } => commands::run::run_file(&env, &file, output).await?,
        Commands::Code { language, code } => {
            commands::run::run_code(&env, &language, &code.join(" "), output).await?
        }
        Commands::Check { file } => commands::run::check_file(&env, &file, output).await?,
        Commands::Languages => {
            commands::languages::show_languages(&env, cli.json)?;
            true
        }
        Commands::Cleanup { older_than } => {
            commands::cleanup::cleanup(&env, older_than, cli.json).await?;
            true
        }
        Commands::Interactive => {
            commands::interactive::interactive_mode(&env, output).await?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
