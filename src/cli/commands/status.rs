//! Status command implementation.
//!
//! `opendr-build status` shows the host platform and which dependencies
//! are already on disk, without touching the network.

use serde::Serialize;
use std::path::PathBuf;

use crate::cli::args::StatusArgs;
use crate::context::BuildContext;
use crate::error::{BuildError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Snapshot of what is on disk.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub platform: String,
    pub archive_url: String,
    pub archive: PathBuf,
    pub archive_cached: bool,
    pub partial_download: bool,
    pub library_dir: PathBuf,
    pub library_present: bool,
    pub generated_missing: Vec<PathBuf>,
    pub contexts: Vec<String>,
}

impl StatusReport {
    /// Inspect the project without changing anything.
    pub fn collect(context: &BuildContext) -> Result<Self> {
        let materializer = context.materializer()?;
        let native = materializer.native();

        Ok(Self {
            platform: context.platform().to_string(),
            archive_url: native.archive_url(),
            archive: native.archive_path(),
            archive_cached: native.archive_path().exists(),
            partial_download: native.has_partial_download(),
            library_dir: native.library_dir(),
            library_present: native.is_present(),
            generated_missing: materializer
                .sources()
                .missing()
                .into_iter()
                .map(|p| p.to_path_buf())
                .collect(),
            contexts: context
                .capabilities()
                .contexts
                .iter()
                .map(|k| k.module_name().to_string())
                .collect(),
        })
    }

    /// Whether `prepare` would have nothing to do.
    pub fn is_ready(&self) -> bool {
        self.library_present && self.generated_missing.is_empty()
    }
}

/// The status command implementation.
pub struct StatusCommand {
    context: BuildContext,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(context: BuildContext, args: StatusArgs) -> Self {
        Self { context, args }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = StatusReport::collect(&self.context)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| BuildError::Other(anyhow::Error::new(e)))?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("opendr - {}", report.platform));
        ui.message(&format!("Contexts: {}", report.contexts.join(", ")));

        if report.library_present {
            ui.success(&format!("OSMesa: {}", report.library_dir.display()));
        } else if report.archive_cached {
            ui.warning(&format!(
                "OSMesa: not extracted (archive cached at {})",
                report.archive.display()
            ));
        } else {
            ui.warning(&format!("OSMesa: not downloaded ({})", report.archive_url));
        }
        if report.partial_download {
            ui.warning("An interrupted download was left behind; it will be restarted");
        }

        if report.generated_missing.is_empty() {
            ui.success("Generated sources: present");
        } else {
            for path in &report.generated_missing {
                ui.warning(&format!("Generated sources: missing {}", path.display()));
            }
        }

        if !report.is_ready() {
            ui.message("");
            ui.message("Run `opendr-build prepare` to materialize what is missing.");
        }
        Ok(CommandResult::success())
    }
}
