//! Per-run build context.
//!
//! Loads configuration, resolves the host platform (honoring config
//! overrides) and the capability set once, and hands out the pieces the
//! commands work with.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::{load_config, BuildConfig};
use crate::error::Result;
use crate::extension::{extensions_for, resolve_numpy_include, ExtensionDescriptor, ExtensionLayout};
use crate::materialize::{CommandGenerator, DependencyMaterializer, HttpFetcher};
use crate::package::{PackageManifest, MANIFEST_PATH};
use crate::platform::{HostPlatform, PlatformCapabilities};

/// Everything resolved before any work starts.
#[derive(Debug, Clone)]
pub struct BuildContext {
    project_root: PathBuf,
    config: BuildConfig,
    platform: HostPlatform,
    capabilities: PlatformCapabilities,
}

impl BuildContext {
    /// Load configuration for `project_root` and detect the host.
    pub fn load(project_root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(project_root, config_path)?;
        Ok(Self::new(project_root, config))
    }

    /// Build a context from an already-loaded configuration.
    pub fn new(project_root: &Path, config: BuildConfig) -> Self {
        let platform = resolve_platform(&config, HostPlatform::detect());
        let capabilities = PlatformCapabilities::resolve(&platform);
        debug!("Host platform: {}", platform);

        Self {
            project_root: project_root.to_path_buf(),
            config,
            platform,
            capabilities,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn platform(&self) -> &HostPlatform {
        &self.platform
    }

    pub fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }

    /// The context directory on disk.
    pub fn context_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.context_dir)
    }

    /// Materializer for OSMesa and the generated sources.
    pub fn materializer(&self) -> Result<DependencyMaterializer> {
        DependencyMaterializer::from_config(&self.config, &self.project_root, self.platform.clone())
    }

    /// HTTP fetcher with the configured timeout.
    pub fn fetcher(&self) -> Result<HttpFetcher> {
        Ok(HttpFetcher::with_timeout(Duration::from_secs(
            self.config.osmesa.timeout_secs,
        ))?)
    }

    /// The configured source generator.
    pub fn generator(&self) -> CommandGenerator {
        CommandGenerator::new(self.config.generated.command.clone(), &self.project_root)
    }

    /// Extension descriptors for this host, resolving numpy headers.
    pub fn extensions(&self) -> Vec<ExtensionDescriptor> {
        let numpy = resolve_numpy_include(&self.config, &self.project_root);
        let layout = ExtensionLayout::from_config(&self.config, numpy);
        extensions_for(&layout, &self.capabilities)
    }

    /// Package manifest for the given descriptors.
    pub fn manifest(&self, ext_modules: Vec<ExtensionDescriptor>) -> PackageManifest {
        PackageManifest::new(&self.config.package, ext_modules)
    }

    /// Where the manifest is written.
    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_PATH)
    }
}

/// Apply `osmesa.system` / `osmesa.machine` overrides to a detected host.
pub fn resolve_platform(config: &BuildConfig, detected: HostPlatform) -> HostPlatform {
    HostPlatform {
        system: config.osmesa.system.clone().unwrap_or(detected.system),
        machine: config.osmesa.machine.clone().unwrap_or(detected.machine),
    }
}
