//! Extensions command implementation.
//!
//! `opendr-build extensions` prints the native extension descriptors the
//! current host would build.

use crate::cli::args::ExtensionsArgs;
use crate::context::BuildContext;
use crate::error::{BuildError, Result};
use crate::extension::ExtensionDescriptor;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The extensions command implementation.
pub struct ExtensionsCommand {
    context: BuildContext,
    args: ExtensionsArgs,
}

impl ExtensionsCommand {
    /// Create a new extensions command.
    pub fn new(context: BuildContext, args: ExtensionsArgs) -> Self {
        Self { context, args }
    }
}

impl Command for ExtensionsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let extensions = self.context.extensions();

        if self.args.json {
            let json = serde_json::to_string_pretty(&extensions)
                .map_err(|e| BuildError::Other(anyhow::Error::new(e)))?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("Extensions for {}", self.context.platform()));
        for ext in &extensions {
            show_extension(ui, ext);
        }
        Ok(CommandResult::success())
    }
}

fn show_extension(ui: &mut dyn UserInterface, ext: &ExtensionDescriptor) {
    ui.message(&ext.name);
    ui.message(&format!("  sources:   {}", join_paths(&ext.sources)));
    if !ext.include_dirs.is_empty() {
        ui.message(&format!("  includes:  {}", join_paths(&ext.include_dirs)));
    }
    if !ext.library_dirs.is_empty() {
        ui.message(&format!("  lib dirs:  {}", join_paths(&ext.library_dirs)));
    }
    if !ext.libraries.is_empty() {
        ui.message(&format!("  libraries: {}", ext.libraries.join(" ")));
    }
    if ui.output_mode().shows_details() {
        for (name, value) in &ext.define_macros {
            ui.message(&format!("  define:    {}={}", name, value));
        }
        if !ext.extra_compile_args.is_empty() {
            ui.message(&format!("  cflags:    {}", ext.extra_compile_args.join(" ")));
        }
        if !ext.extra_link_args.is_empty() {
            ui.message(&format!("  ldflags:   {}", ext.extra_link_args.join(" ")));
        }
    }
}

fn join_paths(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::ui::{MockUI, OutputMode};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn darwin_context(root: &std::path::Path) -> BuildContext {
        let mut config = BuildConfig::default();
        config.osmesa.system = Some("Darwin".to_string());
        config.package.numpy_include = Some(PathBuf::from("/np"));
        BuildContext::new(root, config)
    }

    #[test]
    fn lists_every_extension() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        ExtensionsCommand::new(darwin_context(temp.path()), ExtensionsArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("contexts.ctx_mesa"));
        assert!(ui.has_message("contexts.ctx_mac"));
        assert!(ui.has_message("OSMesa GL GLU talloc"));
        assert!(!ui.has_message("define:"));
    }

    #[test]
    fn verbose_shows_flags() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        ExtensionsCommand::new(darwin_context(temp.path()), ExtensionsArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("__OSMESA__=1"));
        assert!(ui.has_message("-Qunused-arguments"));
    }
}
