//! Shared progress reporting for materialization commands.

use crate::error::Result;
use crate::materialize::{
    ArchiveFetcher, DependencyMaterializer, GeneratedOutcome, NativeOutcome, SourceGenerator,
};
use crate::ui::UserInterface;

/// Run the OSMesa step under a spinner.
pub fn native_step(
    materializer: &DependencyMaterializer,
    fetcher: &dyn ArchiveFetcher,
    ui: &mut dyn UserInterface,
) -> Result<NativeOutcome> {
    let native = materializer.native();
    let mut spinner = ui.start_spinner(&format!("OSMesa for {}", native.platform()));

    match materializer.ensure_native_library(fetcher) {
        Ok(outcome) => {
            let summary = describe_native(&outcome, &native.archive_name());
            match outcome {
                NativeOutcome::Present => spinner.finish_skipped(&summary),
                NativeOutcome::Extracted { .. } => spinner.finish_success(&summary),
            }
            Ok(outcome)
        }
        Err(e) => {
            spinner.finish_error(&format!("OSMesa: {}", e));
            Err(e)
        }
    }
}

/// Run the generated sources step under a spinner.
pub fn generated_step(
    materializer: &DependencyMaterializer,
    generator: &dyn SourceGenerator,
    force: bool,
    ui: &mut dyn UserInterface,
) -> Result<GeneratedOutcome> {
    let mut spinner = ui.start_spinner("Generated OpenGL sources");

    let result = if force {
        materializer.sources().regenerate(generator)
    } else {
        materializer.ensure_generated_sources(generator)
    };

    match result {
        Ok(GeneratedOutcome::Present) => {
            spinner.finish_skipped("Generated sources already present");
            Ok(GeneratedOutcome::Present)
        }
        Ok(GeneratedOutcome::Generated) => {
            spinner.finish_success("Generated OpenGL sources");
            Ok(GeneratedOutcome::Generated)
        }
        Err(e) => {
            spinner.finish_error(&format!("Generated sources: {}", e));
            Err(e)
        }
    }
}

/// One-line summary of a native outcome.
pub fn describe_native(outcome: &NativeOutcome, archive_name: &str) -> String {
    match outcome {
        NativeOutcome::Present => "OSMesa already present".to_string(),
        NativeOutcome::Extracted {
            downloaded: true,
            files,
            ..
        } => format!("Downloaded {} and extracted {} files", archive_name, files),
        NativeOutcome::Extracted {
            downloaded: false,
            files,
            ..
        } => format!("Extracted {} files from cached {}", files, archive_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn describes_each_native_outcome() {
        let name = "OSMesa.Linux.x86_64.zip";
        assert_eq!(
            describe_native(&NativeOutcome::Present, name),
            "OSMesa already present"
        );

        let fetched = NativeOutcome::Extracted {
            archive: PathBuf::from(name),
            downloaded: true,
            files: 12,
        };
        assert_eq!(
            describe_native(&fetched, name),
            "Downloaded OSMesa.Linux.x86_64.zip and extracted 12 files"
        );

        let cached = NativeOutcome::Extracted {
            archive: PathBuf::from(name),
            downloaded: false,
            files: 3,
        };
        assert!(describe_native(&cached, name).contains("cached"));
    }
}
