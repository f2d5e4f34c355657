//! Fetch command implementation.
//!
//! `opendr-build fetch` makes sure the prebuilt OSMesa tree exists.

use tracing::info;

use crate::cli::args::FetchArgs;
use crate::context::BuildContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::native_step;

/// The fetch command implementation.
pub struct FetchCommand {
    context: BuildContext,
    args: FetchArgs,
}

impl FetchCommand {
    /// Create a new fetch command.
    pub fn new(context: BuildContext, args: FetchArgs) -> Self {
        Self { context, args }
    }
}

impl Command for FetchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let materializer = self.context.materializer()?;

        if self.args.force && materializer.native().remove_tree()? {
            info!(
                "Removed {}",
                materializer.native().library_dir().display()
            );
        }

        native_step(&materializer, &self.context.fetcher()?, ui)?;
        Ok(CommandResult::success())
    }
}
