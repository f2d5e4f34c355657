//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`], which loads the [`BuildContext`] once
//! for every command that needs it.
//!
//! [`BuildContext`]: crate::context::BuildContext

pub mod build;
pub mod clean;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod extensions;
pub mod fetch;
pub mod generate;
pub mod prepare;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
