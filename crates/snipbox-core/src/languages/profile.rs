//! Per-language build and run profile

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A program plus its fixed arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Arguments followed by the given trailing path
    pub fn args_with(&self, path: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(path.display().to_string());
        args
    }
}

/// Static build/run configuration for one language.
///
/// Built once when the registry is created and shared read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Canonical language name
    pub name: String,

    /// File extension including the leading dot
    pub extension: String,

    /// Alternative names accepted for inline code
    pub aliases: Vec<String>,

    /// Compiler (or syntax checker for interpreted languages)
    pub command: String,

    /// Arguments passed to `command` before the output flag and source
    pub compile_args: Vec<String>,

    /// Flag introducing the artifact path, e.g. `-o`
    pub output_flag: Option<String>,

    /// Interpreter used to run the source; `None` runs the artifact directly
    pub run_command: Option<String>,

    /// Whether the compile step produces a separate binary
    pub needs_compile: bool,

    /// Suffix appended to the extension-stripped source path for the artifact
    pub artifact_suffix: Option<String>,

    /// Syntax-only check used by `check_syntax`
    pub syntax_check: CommandTemplate,

    /// Wall-clock budget for the run phase
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Wall-clock budget for the compile phase
    #[serde(with = "humantime_serde")]
    pub compile_timeout: Duration,

    /// Human-readable messages for known compiler exit codes
    pub known_exit_codes: BTreeMap<i32, String>,

    /// Extra environment for the compile, check and run processes
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl LanguageProfile {
    /// Message registered for a compiler exit code, if any
    pub fn known_exit_message(&self, code: i32) -> Option<&str> {
        self.known_exit_codes.get(&code).map(String::as_str)
    }

    /// Deterministic artifact path for a source file.
    ///
    /// `/w/tmp_1.c` becomes `/w/tmp_1.out`; `/w/tmp_1.go` becomes `/w/tmp_1`.
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        let stem = source.with_extension("");
        match &self.artifact_suffix {
            Some(suffix) => {
                let mut name = stem.into_os_string();
                name.push(suffix);
                PathBuf::from(name)
            }
            None => stem,
        }
    }

    /// Full compile command line for a source file
    pub fn compile_command(&self, source: &Path, artifact: &Path) -> CommandTemplate {
        let mut args = self.compile_args.clone();
        if self.needs_compile {
            if let Some(flag) = &self.output_flag {
                args.push(flag.clone());
                args.push(artifact.display().to_string());
            }
        }
        args.push(source.display().to_string());
        CommandTemplate {
            program: self.command.clone(),
            args,
        }
    }

    /// Command that runs an artifact produced for this language
    pub fn run_command_for(&self, artifact: &Path) -> CommandTemplate {
        match &self.run_command {
            Some(interpreter) => CommandTemplate {
                program: interpreter.clone(),
                args: vec![artifact.display().to_string()],
            },
            None => CommandTemplate {
                program: artifact.display().to_string(),
                args: Vec::new(),
            },
        }
    }
}
