//! Build command implementation.
//!
//! `opendr-build build` prepares the native dependencies, writes the
//! package manifest and hands it to the configured packaging command.

use crate::cli::args::BuildArgs;
use crate::context::BuildContext;
use crate::error::Result;
use crate::package::run_packaging;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::{generated_step, native_step};

/// The build command implementation.
pub struct BuildCommand {
    context: BuildContext,
    args: BuildArgs,
}

impl BuildCommand {
    /// Create a new build command.
    pub fn new(context: BuildContext, args: BuildArgs) -> Self {
        Self { context, args }
    }
}

impl Command for BuildCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = &self.context;
        ui.show_header(&format!("Building opendr for {}", ctx.platform()));

        let materializer = ctx.materializer()?;
        native_step(&materializer, &ctx.fetcher()?, ui)?;
        generated_step(&materializer, &ctx.generator(), false, ui)?;

        let extensions = ctx.extensions();
        let manifest = ctx.manifest(extensions);
        let manifest_path = ctx.manifest_path();
        manifest.write(&manifest_path)?;
        ui.success(&format!(
            "Wrote manifest with {} extensions to {}",
            manifest.ext_modules.len(),
            manifest_path.display()
        ));

        let command = &ctx.config().package.command;
        if self.args.skip_package {
            ui.message("Skipping packaging (--skip-package)");
        } else if command.is_empty() {
            ui.warning("No package.command configured; manifest written only");
        } else {
            let mut spinner = ui.start_spinner("Packaging");
            match run_packaging(command, &manifest_path, ctx.project_root()) {
                Ok(()) => spinner.finish_success("Packaging finished"),
                Err(e) => {
                    spinner.finish_error(&e.to_string());
                    return Err(e);
                }
            }
        }

        Ok(CommandResult::success())
    }
}
