//! Command-line interface for opendr-build.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{BuildArgs, CleanArgs, Cli, Commands, ExtensionsArgs, FetchArgs, GenerateArgs, StatusArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
