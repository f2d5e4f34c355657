//! Generate command implementation.
//!
//! `opendr-build generate` makes sure the autogenerated OpenGL sources
//! exist, running the generator only when one is missing (or always with
//! `--force`).

use crate::cli::args::GenerateArgs;
use crate::context::BuildContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::generated_step;

/// The generate command implementation.
pub struct GenerateCommand {
    context: BuildContext,
    args: GenerateArgs,
}

impl GenerateCommand {
    /// Create a new generate command.
    pub fn new(context: BuildContext, args: GenerateArgs) -> Self {
        Self { context, args }
    }
}

impl Command for GenerateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let materializer = self.context.materializer()?;
        generated_step(
            &materializer,
            &self.context.generator(),
            self.args.force,
            ui,
        )?;
        Ok(CommandResult::success())
    }
}
