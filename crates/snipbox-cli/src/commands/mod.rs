//! CLI commands

pub mod cleanup;
pub mod interactive;
pub mod languages;
pub mod run;
