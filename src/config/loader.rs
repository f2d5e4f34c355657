//! Configuration file discovery and loading.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `opendr-build.yml` in the project root, or the `--config` path
//! 3. Environment overrides (`OPENDR_OSMESA_URL`, `OPENDR_CONTEXT_DIR`)

use crate::config::schema::BuildConfig;
use crate::error::{BuildError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config filename in the project root.
pub const CONFIG_FILE_NAME: &str = "opendr-build.yml";

/// Environment variable overriding `osmesa.base_url`.
pub const ENV_OSMESA_URL: &str = "OPENDR_OSMESA_URL";

/// Environment variable overriding `context_dir`.
pub const ENV_CONTEXT_DIR: &str = "OPENDR_CONTEXT_DIR";

/// Find the project config at `opendr-build.yml`.
pub fn find_project_config(project_root: &Path) -> Option<PathBuf> {
    let path = project_root.join(CONFIG_FILE_NAME);
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file and parse it into BuildConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<BuildConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BuildError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into BuildConfig.
///
/// An empty document is treated as all defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<BuildConfig> {
    if content.trim().is_empty() {
        return Ok(BuildConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| BuildError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the effective configuration for a project.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<BuildConfig> {
    let mut config = match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                project_root.join(path)
            };
            debug!("Loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => match find_project_config(project_root) {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                load_config_file(&path)?
            }
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                BuildConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Apply environment overrides using the given lookup.
pub fn apply_env_overrides<F>(config: &mut BuildConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_OSMESA_URL).filter(|v| !v.is_empty()) {
        debug!("{} overrides osmesa.base_url", ENV_OSMESA_URL);
        config.osmesa.base_url = url;
    }
    if let Some(dir) = lookup(ENV_CONTEXT_DIR).filter(|v| !v.is_empty()) {
        debug!("{} overrides context_dir", ENV_CONTEXT_DIR);
        config.context_dir = PathBuf::from(dir);
    }
}

/// Check values that serde cannot.
pub fn validate(config: &BuildConfig) -> Result<()> {
    if let Err(e) = Regex::new(&config.osmesa.include_pattern) {
        return Err(BuildError::ConfigValidationError {
            message: format!("osmesa.include_pattern is not a valid regex: {}", e),
        });
    }
    if config.osmesa.dir_name.is_empty() {
        return Err(BuildError::ConfigValidationError {
            message: "osmesa.dir_name must not be empty".to_string(),
        });
    }
    if config.generated.files.is_empty() {
        return Err(BuildError::ConfigValidationError {
            message: "generated.files must list at least one file".to_string(),
        });
    }
    if config.generated.command.is_empty() {
        return Err(BuildError::ConfigValidationError {
            message: "generated.command must not be empty".to_string(),
        });
    }
    for (name, digest) in &config.osmesa.sha256 {
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BuildError::ConfigValidationError {
                message: format!("osmesa.sha256 entry for {} is not a SHA-256 hex digest", name),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn missing_default_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.package.name, "opendr");
    }

    #[test]
    fn loads_project_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "context_dir: native\npackage:\n  version: '1.0'\n",
        )
        .unwrap();

        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.context_dir, PathBuf::from("native"));
        assert_eq!(config.package.version, "1.0");
    }

    #[test]
    fn explicit_missing_config_is_error() {
        let temp = TempDir::new().unwrap();
        let result = load_config(temp.path(), Some(Path::new("nope.yml")));
        assert!(matches!(result, Err(BuildError::ConfigNotFound { .. })));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "osmesa: [unclosed").unwrap();

        let result = load_config_file(&path);
        assert!(matches!(result, Err(BuildError::ConfigParseError { .. })));
    }

    #[test]
    fn empty_file_is_defaults() {
        let config = parse_config("   \n", Path::new("x.yml")).unwrap();
        assert_eq!(config.osmesa.dir_name, "OSMesa");
    }

    #[test]
    fn invalid_pattern_fails_validation() {
        let mut config = BuildConfig::default();
        config.osmesa.include_pattern = "([".to_string();
        assert!(matches!(
            validate(&config),
            Err(BuildError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn malformed_digest_fails_validation() {
        let mut config = BuildConfig::default();
        config
            .osmesa
            .sha256
            .insert("OSMesa.Linux.x86_64.zip".to_string(), "xyz".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            (ENV_OSMESA_URL, "http://localhost:9000/osmesa"),
            (ENV_CONTEXT_DIR, "ctx"),
        ]
        .into_iter()
        .collect();

        let mut config = BuildConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.osmesa.base_url, "http://localhost:9000/osmesa");
        assert_eq!(config.context_dir, PathBuf::from("ctx"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = BuildConfig::default();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.context_dir, PathBuf::from("contexts"));
    }
}
