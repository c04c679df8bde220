//! Languages command implementation

use crate::console::CliConsole;
use anyhow::Result;
use snipbox_core::Environment;

/// Show supported languages and how they are built
pub fn show_languages(env: &Environment, json: bool) -> Result<()> {
    let profiles = env.registry().profiles();

    if json {
        let profiles: Vec<_> = profiles.iter().map(|p| p.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    let console = CliConsole::new(true);
    console.print_header("Supported Languages");
    console.print_table_header(&["Language", "Extension", "Toolchain", "Timeout", "Aliases"]);

    for profile in &profiles {
        let timeout = format!("{:?}", profile.timeout);
        let aliases = profile.aliases.join(", ");
        console.print_table_row(&[
            &profile.name,
            &profile.extension,
            profile.run_command.as_deref().unwrap_or(&profile.command),
            &timeout,
            &aliases,
        ]);
    }

    console.info("");
    console.info(&format!("Total languages: {}", profiles.len()));
    Ok(())
}
