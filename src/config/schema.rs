//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the
//! `opendr-build.yml` file format. Every field has a default, so an empty
//! file (or no file at all) describes the stock opendr build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default origin for prebuilt OSMesa archives.
pub const DEFAULT_OSMESA_URL: &str = "https://s3.amazonaws.com/bodylabs-assets/public/osmesa";

/// Root configuration structure for opendr-build.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the context sources, relative to the project root
    pub context_dir: PathBuf,

    /// Prebuilt OSMesa download and extraction
    pub osmesa: OsmesaConfig,

    /// Autogenerated OpenGL binding sources
    pub generated: GeneratedConfig,

    /// Package metadata and packaging invocation
    pub package: PackageConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            context_dir: PathBuf::from("contexts"),
            osmesa: OsmesaConfig::default(),
            generated: GeneratedConfig::default(),
            package: PackageConfig::default(),
        }
    }
}

/// Where OSMesa comes from and how it is unpacked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmesaConfig {
    /// Base URL; the archive filename is appended
    pub base_url: String,

    /// Name of the extracted directory under the context dir
    pub dir_name: String,

    /// Archive filename prefix (`<prefix>.<system>.<machine>.zip`)
    pub archive_prefix: String,

    /// Regex selecting which archive entries are extracted
    pub include_pattern: String,

    /// Download timeout in seconds
    pub timeout_secs: u64,

    /// Pinned SHA-256 digests keyed by archive filename
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sha256: BTreeMap<String, String>,

    /// Override the reported operating system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Override the reported machine architecture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
}

impl Default for OsmesaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSMESA_URL.to_string(),
            dir_name: "OSMesa".to_string(),
            archive_prefix: "OSMesa".to_string(),
            include_pattern: r"\.[ah]$".to_string(),
            timeout_secs: 300,
            sha256: BTreeMap::new(),
            system: None,
            machine: None,
        }
    }
}

/// The generated source set and the generator that produces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedConfig {
    /// Expected outputs, relative to the context dir
    pub files: Vec<PathBuf>,

    /// Generator command line, run from the project root
    pub command: Vec<String>,
}

impl Default for GeneratedConfig {
    fn default() -> Self {
        Self {
            files: vec![
                PathBuf::from("_constants.py"),
                PathBuf::from("_functions.pyx"),
            ],
            command: vec![
                "python".to_string(),
                "-c".to_string(),
                "from contexts import autogen; autogen.main()".to_string(),
            ],
        }
    }
}

/// Package metadata handed to the packaging tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub name: String,
    pub version: String,
    pub author: String,
    pub author_email: String,
    pub url: String,
    pub packages: Vec<String>,
    pub package_data: Vec<String>,
    pub install_requires: Vec<String>,

    /// Python interpreter used to locate numpy headers
    pub python: String,

    /// Explicit numpy include directory (skips the interpreter query)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numpy_include: Option<PathBuf>,

    /// Packaging command, run with `OPENDR_BUILD_MANIFEST` set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "opendr".to_string(),
            version: "0.5".to_string(),
            author: "Matthew Loper".to_string(),
            author_email: "matt.loper@gmail.com".to_string(),
            url: "http://files.is.tue.mpg/mloper/opendr/".to_string(),
            packages: vec![
                "opendr".to_string(),
                "opendr.contexts".to_string(),
                "opendr.test_dr".to_string(),
            ],
            package_data: vec!["test_dr/nasa*".to_string()],
            install_requires: vec!["cython".to_string()],
            python: "python".to_string(),
            numpy_include: None,
            command: Vec::new(),
        }
    }
}
