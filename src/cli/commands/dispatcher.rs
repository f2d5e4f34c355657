//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::context::BuildContext;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Returns a [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config_path: None,
        }
    }

    /// Use an explicit config file instead of `opendr-build.yml`.
    pub fn with_config(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn context(&self) -> Result<BuildContext> {
        BuildContext::load(&self.project_root, self.config_path.as_deref())
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            Some(Commands::Fetch(args)) => {
                super::fetch::FetchCommand::new(self.context()?, args.clone()).execute(ui)
            }
            Some(Commands::Generate(args)) => {
                super::generate::GenerateCommand::new(self.context()?, args.clone()).execute(ui)
            }
            Some(Commands::Extensions(args)) => {
                super::extensions::ExtensionsCommand::new(self.context()?, args.clone())
                    .execute(ui)
            }
            Some(Commands::Build(args)) => {
                super::build::BuildCommand::new(self.context()?, args.clone()).execute(ui)
            }
            Some(Commands::Status(args)) => {
                super::status::StatusCommand::new(self.context()?, args.clone()).execute(ui)
            }
            Some(Commands::Clean(args)) => {
                super::clean::CleanCommand::new(self.context()?, args.clone()).execute(ui)
            }
            Some(Commands::Prepare) | None => {
                super::prepare::PrepareCommand::new(self.context()?).execute(ui)
            }
        }
    }
}
