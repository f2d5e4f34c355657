//! Prepare command implementation.
//!
//! `opendr-build prepare` (the default command) makes sure OSMesa and the
//! generated sources exist, fetching or generating only what is missing.

use crate::context::BuildContext;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::{generated_step, native_step};

/// The prepare command implementation.
pub struct PrepareCommand {
    context: BuildContext,
}

impl PrepareCommand {
    /// Create a new prepare command.
    pub fn new(context: BuildContext) -> Self {
        Self { context }
    }
}

impl Command for PrepareCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&format!("Preparing opendr for {}", self.context.platform()));

        let materializer = self.context.materializer()?;
        native_step(&materializer, &self.context.fetcher()?, ui)?;
        generated_step(&materializer, &self.context.generator(), false, ui)?;

        ui.success("Native dependencies ready");
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::materialize::extract::tests::create_test_zip;
    use crate::ui::mock::SpinnerStatus;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(root: &std::path::Path, base_url: String) -> BuildContext {
        let mut config = BuildConfig::default();
        config.osmesa.base_url = base_url;
        config.osmesa.system = Some("Linux".to_string());
        config.osmesa.machine = Some("x86_64".to_string());
        config.generated.command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "touch contexts/_constants.py contexts/_functions.pyx".to_string(),
        ];
        BuildContext::new(root, config)
    }

    #[cfg(unix)]
    #[test]
    fn prepare_fetches_and_generates() {
        let temp = TempDir::new().unwrap();
        let fixture = temp.path().join("fixture.zip");
        create_test_zip(
            &fixture,
            &[
                ("OSMesa/include/GL/osmesa.h", b"/* h */"),
                ("OSMesa/lib/libOSMesa.a", b"!<arch>"),
                ("OSMesa/README", b"skip me"),
            ],
        );
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/OSMesa.Linux.x86_64.zip");
            then.status(200).body(fs::read(&fixture).unwrap());
        });
        let ctx = context(temp.path(), server.base_url());
        let mut ui = MockUI::new();

        let result = PrepareCommand::new(ctx).execute(&mut ui).unwrap();

        assert!(result.success);
        mock.assert_hits(1);
        let contexts = temp.path().join("contexts");
        assert!(contexts.join("OSMesa/include/GL/osmesa.h").exists());
        assert!(!contexts.join("OSMesa/README").exists());
        assert!(contexts.join("_functions.pyx").exists());
        assert!(ui.has_spinner_result(SpinnerStatus::Success, "extracted 2 files"));
        assert!(ui.has_success("ready"));
    }

    #[cfg(unix)]
    #[test]
    fn prepare_with_everything_present_makes_no_requests() {
        let temp = TempDir::new().unwrap();
        let contexts = temp.path().join("contexts");
        fs::create_dir_all(contexts.join("OSMesa")).unwrap();
        fs::write(contexts.join("_constants.py"), "").unwrap();
        fs::write(contexts.join("_functions.pyx"), "").unwrap();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(500);
        });
        let mut ui = MockUI::new();

        PrepareCommand::new(context(temp.path(), server.base_url()))
            .execute(&mut ui)
            .unwrap();

        mock.assert_hits(0);
        assert!(ui.has_spinner_result(SpinnerStatus::Skipped, "already present"));
    }

    #[test]
    fn prepare_reports_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });
        let mut ui = MockUI::new();

        let result = PrepareCommand::new(context(temp.path(), server.base_url())).execute(&mut ui);

        assert!(result.is_err());
        assert!(ui.has_spinner_result(SpinnerStatus::Error, "404"));
        assert!(!temp.path().join("contexts/_constants.py").exists());
    }
}
