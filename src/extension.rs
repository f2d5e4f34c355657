//! Native extension descriptors.
//!
//! Each descriptor carries what a compiler driver needs to build one
//! context module: sources, include and library paths, macros and flags.
//! Paths are relative to the project root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::BuildConfig;
use crate::platform::{ContextKind, PlatformCapabilities};
use crate::shell::{execute, CommandOptions};

const QUIET_UNUSED_ARGUMENTS: &str = "-Qunused-arguments";

/// A native module to compile and link into the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// Dotted module name, relative to the extension package.
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub library_dirs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,
    /// `(name, value)` preprocessor definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub define_macros: Vec<(String, String)>,
    /// Extra files whose change forces a rebuild.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_compile_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_link_args: Vec<String>,
}

impl ExtensionDescriptor {
    /// A C extension with no paths or flags yet.
    pub fn c(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            language: "c".to_string(),
            include_dirs: Vec::new(),
            library_dirs: Vec::new(),
            libraries: Vec::new(),
            define_macros: Vec::new(),
            depends: Vec::new(),
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
        }
    }

    /// Append the same flag to compile and link args.
    fn with_flag(mut self, flag: &str) -> Self {
        self.extra_compile_args.push(flag.to_string());
        self.extra_link_args.push(flag.to_string());
        self
    }
}

/// Directory layout the descriptors refer to.
#[derive(Debug, Clone)]
pub struct ExtensionLayout {
    /// Context source directory, e.g. `contexts`.
    pub context_dir: PathBuf,
    /// Extracted OSMesa directory name.
    pub osmesa_dir: String,
    /// Numpy C headers, when known.
    pub numpy_include: Option<PathBuf>,
}

impl Default for ExtensionLayout {
    fn default() -> Self {
        Self {
            context_dir: PathBuf::from("contexts"),
            osmesa_dir: "OSMesa".to_string(),
            numpy_include: None,
        }
    }
}

impl ExtensionLayout {
    /// Layout from configuration with an already-resolved numpy include.
    pub fn from_config(config: &BuildConfig, numpy_include: Option<PathBuf>) -> Self {
        Self {
            context_dir: config.context_dir.clone(),
            osmesa_dir: config.osmesa.dir_name.clone(),
            numpy_include,
        }
    }

    fn context(&self, file: &str) -> PathBuf {
        self.context_dir.join(file)
    }

    fn osmesa(&self, sub: &str) -> PathBuf {
        self.context_dir.join(&self.osmesa_dir).join(sub)
    }

    fn base_includes(&self) -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::from(".")];
        dirs.extend(self.numpy_include.clone());
        dirs
    }
}

/// The off-screen Mesa context.
pub fn mesa_extension(layout: &ExtensionLayout, caps: &PlatformCapabilities) -> ExtensionDescriptor {
    let mut ext = ExtensionDescriptor::c(ContextKind::Mesa.module_name());
    ext.sources = vec![layout.context("ctx_mesa.pyx")];
    ext.library_dirs = vec![layout.osmesa("lib")];
    ext.depends = vec![layout.context("_constants.py")];
    ext.define_macros = vec![("__OSMESA__".to_string(), "1".to_string())];
    ext.include_dirs = layout.base_includes();
    ext.include_dirs.push(layout.osmesa("include"));
    ext.libraries = vec!["OSMesa".to_string(), "GL".to_string(), "GLU".to_string()];

    if caps.needs_talloc {
        ext.libraries.push("talloc".to_string());
    }
    if caps.quiet_unused_arguments {
        ext = ext.with_flag(QUIET_UNUSED_ARGUMENTS);
    }
    ext
}

/// The native macOS windowing context.
pub fn mac_extension(layout: &ExtensionLayout) -> ExtensionDescriptor {
    let mut ext = ExtensionDescriptor::c(ContextKind::Mac.module_name());
    ext.sources = vec![
        layout.context("ctx_mac.pyx"),
        layout.context("ctx_mac_internal.c"),
    ];
    ext.depends = vec![
        layout.context("_constants.py"),
        layout.context("ctx_mac_internal.h"),
    ];
    ext.include_dirs = layout.base_includes();
    ext.with_flag(QUIET_UNUSED_ARGUMENTS)
}

/// Descriptors for every context in the capability set, in build order.
pub fn extensions_for(
    layout: &ExtensionLayout,
    caps: &PlatformCapabilities,
) -> Vec<ExtensionDescriptor> {
    caps.contexts
        .iter()
        .map(|kind| match kind {
            ContextKind::Mesa => mesa_extension(layout, caps),
            ContextKind::Mac => mac_extension(layout),
        })
        .collect()
}

/// Locate numpy's C headers: the configured path, else ask the interpreter.
///
/// Returns `None` (with a warning) when the interpreter cannot answer.
pub fn resolve_numpy_include(config: &BuildConfig, project_root: &Path) -> Option<PathBuf> {
    if let Some(dir) = &config.package.numpy_include {
        return Some(dir.clone());
    }

    let argv = vec![
        config.package.python.clone(),
        "-c".to_string(),
        "import numpy; print(numpy.get_include())".to_string(),
    ];
    let options = CommandOptions::captured().in_dir(project_root);

    match execute(&argv, &options) {
        Ok(out) if out.success && !out.stdout.trim().is_empty() => {
            let dir = PathBuf::from(out.stdout.trim());
            debug!("numpy include dir: {}", dir.display());
            Some(dir)
        }
        Ok(out) => {
            warn!(
                "Could not locate numpy headers with {}: {}",
                config.package.python,
                out.stderr.trim()
            );
            None
        }
        Err(e) => {
            warn!(
                "Could not run {} to locate numpy headers: {}",
                config.package.python,
                e
            );
            None
        }
    }
}
