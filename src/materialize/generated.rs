//! Autogenerated OpenGL binding sources.
//!
//! The generator itself is external; this module only decides whether it
//! has to run and checks that it produced every expected file.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::shell::{display_command, execute, CommandOptions};

/// Produces the generated source set as a side effect.
pub trait SourceGenerator {
    /// Run the generator once.
    fn generate(&self) -> Result<()>;
}

/// Runs a configured command line from the project root.
pub struct CommandGenerator {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl CommandGenerator {
    /// Create a generator running `argv` in `cwd`.
    pub fn new(argv: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            argv,
            cwd: cwd.into(),
        }
    }
}

impl SourceGenerator for CommandGenerator {
    fn generate(&self) -> Result<()> {
        let command = display_command(&self.argv);
        let options = CommandOptions::captured().in_dir(&self.cwd);

        let output = execute(&self.argv, &options).map_err(|e| BuildError::GeneratorFailed {
            message: format!("could not run `{}`: {}", command, e),
        })?;

        if !output.success {
            let detail = output.stderr.trim();
            return Err(BuildError::GeneratorFailed {
                message: match output.exit_code {
                    Some(code) if detail.is_empty() => {
                        format!("`{}` exited with code {}", command, code)
                    }
                    Some(code) => format!("`{}` exited with code {}: {}", command, code, detail),
                    None => format!("`{}` was terminated by a signal", command),
                },
            });
        }

        debug!("Generator finished in {:?}", output.duration);
        Ok(())
    }
}

/// What `GeneratedSources::ensure` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedOutcome {
    /// Every file already existed; the generator was not run.
    Present,
    /// The generator ran and produced every file.
    Generated,
}

/// The fixed set of generated files under the context directory.
#[derive(Debug, Clone)]
pub struct GeneratedSources {
    files: Vec<PathBuf>,
}

impl GeneratedSources {
    /// Expect `names` inside `root`.
    pub fn new<I, P>(root: &Path, names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            files: names.into_iter().map(|n| root.join(n)).collect(),
        }
    }

    /// The stock set: `_constants.py` and `_functions.pyx`.
    pub fn opengl(root: &Path) -> Self {
        Self::new(root, ["_constants.py", "_functions.pyx"])
    }

    /// Build from configuration, resolving the context dir against `project_root`.
    pub fn from_config(config: &BuildConfig, project_root: &Path) -> Self {
        Self::new(
            &project_root.join(&config.context_dir),
            &config.generated.files,
        )
    }

    /// Expected file paths.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Expected files that do not exist.
    pub fn missing(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| !f.exists())
            .map(PathBuf::as_path)
            .collect()
    }

    /// Whether every expected file exists.
    pub fn is_complete(&self) -> bool {
        self.files.iter().all(|f| f.exists())
    }

    /// Run `generator` if any file is missing, then check every file.
    pub fn ensure(&self, generator: &dyn SourceGenerator) -> Result<GeneratedOutcome> {
        if self.is_complete() {
            debug!("Generated sources present, skipping generator");
            return Ok(GeneratedOutcome::Present);
        }
        self.regenerate(generator)
    }

    /// Run `generator` unconditionally, then check every file.
    pub fn regenerate(&self, generator: &dyn SourceGenerator) -> Result<GeneratedOutcome> {
        info!("Autogenerating OpenGL sources");
        generator.generate()?;

        if let Some(path) = self.files.iter().find(|f| !f.exists()) {
            return Err(BuildError::GenerationIncomplete { path: path.clone() });
        }

        Ok(GeneratedOutcome::Generated)
    }

    /// Delete every generated file that exists. Returns the removed paths.
    pub fn remove(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for file in &self.files {
            if file.exists() {
                std::fs::remove_file(file)?;
                removed.push(file.clone());
            }
        }
        Ok(removed)
    }
}
