//! Clean command implementation.
//!
//! `opendr-build clean` removes the extracted OSMesa tree and, on request,
//! cached archives and generated sources.

use std::path::PathBuf;
use tracing::debug;

use crate::cli::args::CleanArgs;
use crate::context::BuildContext;
use crate::error::Result;
use crate::ui::{Prompt, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The clean command implementation.
pub struct CleanCommand {
    context: BuildContext,
    args: CleanArgs,
}

impl CleanCommand {
    /// Create a new clean command.
    pub fn new(context: BuildContext, args: CleanArgs) -> Self {
        Self { context, args }
    }

    fn describe_targets(&self) -> String {
        let mut targets = vec!["the OSMesa tree"];
        if self.args.archives {
            targets.push("cached archives");
        }
        if self.args.generated {
            targets.push("generated sources");
        }
        targets.join(", ")
    }
}

impl Command for CleanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !self.args.force && ui.is_interactive() {
            let question = format!("Remove {}?", self.describe_targets());
            if !ui.prompt(&Prompt::confirm("clean", question, false))? {
                ui.message("Nothing removed");
                return Ok(CommandResult::success());
            }
        }

        let materializer = self.context.materializer()?;
        let native = materializer.native();
        let mut removed: Vec<PathBuf> = Vec::new();

        if native.remove_tree()? {
            removed.push(native.library_dir());
        }
        if self.args.archives {
            removed.extend(native.remove_archives()?);
        }
        if self.args.generated {
            removed.extend(materializer.sources().remove()?);
        }

        if removed.is_empty() {
            ui.message("Nothing to remove");
        } else {
            for path in &removed {
                debug!("Removed {}", path.display());
            }
            ui.success(&format!("Removed {} paths", removed.len()));
        }
        Ok(CommandResult::success())
    }
}
