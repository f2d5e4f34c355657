//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// opendr-build - prepare native dependencies and package opendr.
#[derive(Debug, Parser)]
#[command(name = "opendr-build")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default opendr-build.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch OSMesa and generate sources (default if no command specified)
    Prepare,

    /// Make sure the prebuilt OSMesa tree exists
    Fetch(FetchArgs),

    /// Make sure the generated OpenGL sources exist
    Generate(GenerateArgs),

    /// Show the native extensions for this host
    Extensions(ExtensionsArgs),

    /// Prepare, write the package manifest and run the packaging command
    Build(BuildArgs),

    /// Show what is already on disk
    Status(StatusArgs),

    /// Remove materialized dependencies
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FetchArgs {
    /// Remove the extracted tree first
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `generate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GenerateArgs {
    /// Run the generator even if every file exists
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `extensions` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExtensionsArgs {
    /// Print descriptors as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `build` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BuildArgs {
    /// Write the manifest but do not run the packaging command
    #[arg(long)]
    pub skip_package: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Print status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `clean` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CleanArgs {
    /// Also remove downloaded archives
    #[arg(long)]
    pub archives: bool,

    /// Also remove generated sources
    #[arg(long)]
    pub generated: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_prepare() {
        let cli = Cli::parse_from(["opendr-build"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["opendr-build", "status", "--json", "-p", "/tmp/x", "--debug"]);
        assert!(cli.debug);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Some(Commands::Status(args)) => assert!(args.json),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn clean_flags() {
        let cli = Cli::parse_from(["opendr-build", "clean", "--archives", "-f"]);
        match cli.command {
            Some(Commands::Clean(args)) => {
                assert!(args.archives);
                assert!(args.force);
                assert!(!args.generated);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["opendr-build", "-v", "-q"]).is_err());
    }
}
