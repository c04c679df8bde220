//! Bounded executor module

mod executor;
mod types;


pub use executor::Executor;
pub use types::{ExecutionResult, ExecutionStatus, OutcomeKind};
