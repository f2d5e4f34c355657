//! The hand-off to the packaging tool.
//!
//! The manifest is the complete input of a packaging run: package metadata
//! plus every extension descriptor. It is written as JSON and, when a
//! packaging command is configured, that command is run with
//! `OPENDR_BUILD_MANIFEST` pointing at the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PackageConfig;
use crate::error::{BuildError, Result};
use crate::extension::ExtensionDescriptor;
use crate::shell::{display_command, execute, CommandOptions};

/// Environment variable carrying the manifest path to the packaging command.
pub const MANIFEST_ENV: &str = "OPENDR_BUILD_MANIFEST";

/// Default manifest location, relative to the project root.
pub const MANIFEST_PATH: &str = "build/opendr-manifest.json";

/// Everything the packaging tool needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub author: String,
    pub author_email: String,
    pub url: String,
    pub packages: Vec<String>,
    /// Package name -> source directory.
    pub package_dir: BTreeMap<String, PathBuf>,
    /// Package that compiled extensions are placed in.
    pub ext_package: String,
    /// Package name -> data file globs.
    pub package_data: BTreeMap<String, Vec<String>>,
    pub install_requires: Vec<String>,
    pub ext_modules: Vec<ExtensionDescriptor>,
}

impl PackageManifest {
    /// Assemble a manifest; the package root maps to the project root.
    pub fn new(package: &PackageConfig, ext_modules: Vec<ExtensionDescriptor>) -> Self {
        let mut package_dir = BTreeMap::new();
        package_dir.insert(package.name.clone(), PathBuf::from("."));

        let mut package_data = BTreeMap::new();
        if !package.package_data.is_empty() {
            package_data.insert(package.name.clone(), package.package_data.clone());
        }

        Self {
            name: package.name.clone(),
            version: package.version.clone(),
            author: package.author.clone(),
            author_email: package.author_email.clone(),
            url: package.url.clone(),
            packages: package.packages.clone(),
            package_dir,
            ext_package: package.name.clone(),
            package_data,
            install_requires: package.install_requires.clone(),
            ext_modules,
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::Other(anyhow::Error::new(e)))?;
        fs::write(path, json)?;
        debug!("Wrote manifest to {}", path.display());
        Ok(())
    }

    /// Read a manifest written by [`PackageManifest::write`].
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| BuildError::Other(anyhow::Error::new(e)))
    }
}

/// Run the packaging command against a written manifest.
pub fn run_packaging(argv: &[String], manifest: &Path, project_root: &Path) -> Result<()> {
    let command = display_command(argv);
    info!("Packaging with `{}`", command);

    let options = CommandOptions::default()
        .in_dir(project_root)
        .with_env(MANIFEST_ENV, manifest.to_string_lossy());

    let output = execute(argv, &options).map_err(|e| BuildError::PackagingFailed {
        message: format!("could not run `{}`: {}", command, e),
    })?;

    if !output.success {
        return Err(BuildError::PackagingFailed {
            message: match output.exit_code {
                Some(code) => format!("`{}` exited with code {}", command, code),
                None => format!("`{}` was terminated by a signal", command),
            },
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{extensions_for, ExtensionLayout};
    use crate::platform::{HostPlatform, PlatformCapabilities};
    use tempfile::TempDir;

    fn manifest() -> PackageManifest {
        let caps = PlatformCapabilities::resolve(&HostPlatform::new("Darwin", "arm64"));
        PackageManifest::new(
            &PackageConfig::default(),
            extensions_for(&ExtensionLayout::default(), &caps),
        )
    }

    #[test]
    fn manifest_carries_stock_metadata() {
        let m = manifest();

        assert_eq!(m.name, "opendr");
        assert_eq!(m.version, "0.5");
        assert_eq!(m.ext_package, "opendr");
        assert_eq!(m.package_dir.get("opendr"), Some(&PathBuf::from(".")));
        assert_eq!(
            m.package_data.get("opendr"),
            Some(&vec!["test_dr/nasa*".to_string()])
        );
        assert_eq!(m.install_requires, vec!["cython"]);
        assert_eq!(m.ext_modules.len(), 2);
    }

    #[test]
    fn write_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build").join("manifest.json");
        let m = manifest();

        m.write(&path).unwrap();

        assert_eq!(PackageManifest::load(&path).unwrap(), m);
    }

    #[test]
    fn empty_package_data_is_omitted() {
        let mut config = PackageConfig::default();
        config.package_data.clear();

        let m = PackageManifest::new(&config, Vec::new());
        assert!(m.package_data.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn packaging_command_sees_manifest_path() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("m.json");
        manifest().write(&manifest_path).unwrap();
        let argv: Vec<String> = ["sh", "-c", "cp \"$OPENDR_BUILD_MANIFEST\" copied.json"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        run_packaging(&argv, &manifest_path, temp.path()).unwrap();

        assert!(temp.path().join("copied.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_packaging_command_is_error() {
        let temp = TempDir::new().unwrap();
        let argv: Vec<String> = ["sh", "-c", "exit 2"].iter().map(|s| s.to_string()).collect();

        let err = run_packaging(&argv, &temp.path().join("m.json"), temp.path()).unwrap_err();

        assert!(matches!(err, BuildError::PackagingFailed { .. }));
        assert!(err.to_string().contains("code 2"));
    }
}
