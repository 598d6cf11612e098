//! Parsing and validation of `aion.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly
//! typed [`ProjectConfig`], covering only the ambient concerns a compiler
//! front end needs: project identity, a top-module override, the optimizer
//! pass list, and diagnostic rendering. There is no board, pin, clock, or
//! bitstream model here — those concern a place-and-route backend outside
//! this front end's scope.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_options, load_options_from_str};
pub use types::*;
