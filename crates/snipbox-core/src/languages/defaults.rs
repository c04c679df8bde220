//! Compiled-in language profiles

use super::profile::{CommandTemplate, LanguageProfile};
use std::collections::BTreeMap;
use std::time::Duration;

/// Multiplier applied to the base timeout for natively compiled languages
pub const COMPILED_TIMEOUT_FACTOR: u32 = 2;

fn exit_codes(message: &str) -> BTreeMap<i32, String> {
    BTreeMap::from([(1, message.to_string())])
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn interpreted(
    name: &str,
    extension: &str,
    aliases: &[&str],
    interpreter: &str,
    check_args: &[&str],
    error_message: &str,
    base_timeout: Duration,
) -> LanguageProfile {
    LanguageProfile {
        name: name.to_string(),
        extension: extension.to_string(),
        aliases: strings(aliases),
        command: interpreter.to_string(),
        compile_args: strings(check_args),
        output_flag: None,
        run_command: Some(interpreter.to_string()),
        needs_compile: false,
        artifact_suffix: None,
        syntax_check: CommandTemplate::new(interpreter, check_args),
        timeout: base_timeout,
        compile_timeout: base_timeout,
        known_exit_codes: exit_codes(error_message),
        env: BTreeMap::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn native(
    name: &str,
    extension: &str,
    aliases: &[&str],
    compiler: &str,
    compile_args: &[&str],
    artifact_suffix: Option<&str>,
    syntax_check: CommandTemplate,
    error_message: &str,
    base_timeout: Duration,
) -> LanguageProfile {
    let budget = base_timeout * COMPILED_TIMEOUT_FACTOR;
    LanguageProfile {
        name: name.to_string(),
        extension: extension.to_string(),
        aliases: strings(aliases),
        command: compiler.to_string(),
        compile_args: strings(compile_args),
        output_flag: Some("-o".to_string()),
        run_command: None,
        needs_compile: true,
        artifact_suffix: artifact_suffix.map(str::to_string),
        syntax_check,
        timeout: budget,
        compile_timeout: budget,
        known_exit_codes: exit_codes(error_message),
        env: BTreeMap::new(),
    }
}

/// Default profiles: Python, JavaScript, Go, C, C++ and Bash
pub fn default_profiles(base_timeout: Duration) -> Vec<LanguageProfile> {
    vec![
        LanguageProfile {
            // py_compile would otherwise leave __pycache__ in the work dir
            env: BTreeMap::from([("PYTHONDONTWRITEBYTECODE".to_string(), "1".to_string())]),
            ..interpreted(
                "python",
                ".py",
                &["py", "python3"],
                "python3",
                &["-m", "py_compile"],
                "Python syntax error",
                base_timeout,
            )
        },
        interpreted(
            "javascript",
            ".js",
            &["js", "node"],
            "node",
            &["--check"],
            "JavaScript syntax error",
            base_timeout,
        ),
        native(
            "go",
            ".go",
            &["golang"],
            "go",
            &["build"],
            None,
            CommandTemplate::new("go", &["vet"]),
            "Go compilation error",
            base_timeout,
        ),
        native(
            "c",
            ".c",
            &[],
            "gcc",
            &["-Wall", "-O2"],
            Some(".out"),
            CommandTemplate::new("gcc", &["-fsyntax-only"]),
            "C compilation error",
            base_timeout,
        ),
        native(
            "cpp",
            ".cpp",
            &["c++", "cxx"],
            "g++",
            &["-Wall", "-O2", "-std=c++17"],
            Some(".out"),
            CommandTemplate::new("g++", &["-fsyntax-only", "-std=c++17"]),
            "C++ compilation error",
            base_timeout,
        ),
        interpreted(
            "bash",
            ".sh",
            &["sh", "shell"],
            "bash",
            &["-n"],
            "Bash syntax error",
            base_timeout,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_languages_get_double_budget() {
        let base = Duration::from_secs(30);
        for profile in default_profiles(base) {
            if profile.needs_compile {
                assert_eq!(profile.timeout, Duration::from_secs(60), "{}", profile.name);
                assert_eq!(profile.compile_timeout, Duration::from_secs(60));
            } else {
                assert_eq!(profile.timeout, base, "{}", profile.name);
            }
        }
    }

    #[test]
    fn test_every_profile_has_exit_code_message() {
        for profile in default_profiles(Duration::from_secs(1)) {
            assert!(profile.known_exit_message(1).is_some(), "{}", profile.name);
            assert!(profile.known_exit_message(2).is_none());
        }
    }

    #[test]
    fn test_only_python_sets_environment() {
        for profile in default_profiles(Duration::from_secs(1)) {
            if profile.name == "python" {
                assert_eq!(
                    profile.env.get("PYTHONDONTWRITEBYTECODE").map(String::as_str),
                    Some("1")
                );
            } else {
                assert!(profile.env.is_empty(), "{}", profile.name);
            }
        }
    }
}
