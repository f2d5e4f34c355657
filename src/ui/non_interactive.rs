//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{BuildError, Result};

use super::{parse_answer, OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts.
const PROMPT_ENV_PREFIX: &str = "OPENDR_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `OPENDR_PROMPT_<KEY>` environment variables
/// (`yes`/`no`), falling back to the prompt's default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_messages() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("⚠ {}", msg);
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<bool> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        match self.env_overrides.get(&env_key) {
            None => Ok(prompt.default),
            Some(answer) => parse_answer(answer).ok_or_else(|| BuildError::ConfigValidationError {
                message: format!("{} must be yes or no, got '{}'", env_key, answer),
            }),
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_messages() {
            println!("  {}", message);
        }
        Box::new(LineSpinner)
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_messages() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints one line when finished.
struct LineSpinner;

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        println!("○ {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn never_interactive() {
        assert!(!NonInteractiveUI::new(OutputMode::Normal).is_interactive());
    }

    #[test]
    fn confirm_uses_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Quiet, HashMap::new());
        let answer = ui
            .prompt(&Prompt::confirm("clean", "Remove?", false))
            .unwrap();
        assert!(!answer);
    }

    #[test]
    fn confirm_uses_env_override() {
        let mut ui = NonInteractiveUI::with_overrides(
            OutputMode::Quiet,
            overrides(&[("OPENDR_PROMPT_CLEAN", "yes")]),
        );

        let answer = ui
            .prompt(&Prompt::confirm("clean", "Remove?", false))
            .unwrap();
        assert!(answer);
    }

    #[test]
    fn unreadable_override_is_error() {
        let mut ui = NonInteractiveUI::with_overrides(
            OutputMode::Quiet,
            overrides(&[("OPENDR_PROMPT_CLEAN", "perhaps")]),
        );

        let err = ui
            .prompt(&Prompt::confirm("clean", "Remove?", true))
            .unwrap_err();
        assert!(err.to_string().contains("OPENDR_PROMPT_CLEAN"));
    }
}
