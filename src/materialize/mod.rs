//! Build-time dependency materialization.
//!
//! Before the native extensions can compile, two things have to be on disk:
//! the prebuilt OSMesa headers and libraries, and the autogenerated OpenGL
//! binding sources. [`DependencyMaterializer`] checks for each and fetches
//! or generates only what is missing.
//!
//! - [`fetch`] - HTTP archive downloads
//! - [`checksum`] - SHA-256 archive pins
//! - [`extract`] - filtered zip extraction
//! - [`native`] - the OSMesa tree
//! - [`generated`] - the generated source set

pub mod checksum;
pub mod extract;
pub mod fetch;
pub mod generated;
pub mod native;

pub use checksum::{sha256_file, verify_sha256};
pub use extract::extract_matching;
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use generated::{CommandGenerator, GeneratedOutcome, GeneratedSources, SourceGenerator};
pub use native::{NativeLibrary, NativeOutcome};

use std::path::Path;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::platform::HostPlatform;

/// Ensures OSMesa and the generated sources exist before compilation.
pub struct DependencyMaterializer {
    native: NativeLibrary,
    sources: GeneratedSources,
}

/// What a full materialization pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    pub native: NativeOutcome,
    pub sources: GeneratedOutcome,
}

impl DependencyMaterializer {
    /// Combine a native library and a generated source set.
    pub fn new(native: NativeLibrary, sources: GeneratedSources) -> Self {
        Self { native, sources }
    }

    /// Build both halves from configuration.
    pub fn from_config(
        config: &BuildConfig,
        project_root: &Path,
        platform: HostPlatform,
    ) -> Result<Self> {
        Ok(Self {
            native: NativeLibrary::from_config(config, project_root, platform)?,
            sources: GeneratedSources::from_config(config, project_root),
        })
    }

    /// The OSMesa half.
    pub fn native(&self) -> &NativeLibrary {
        &self.native
    }

    /// The generated source half.
    pub fn sources(&self) -> &GeneratedSources {
        &self.sources
    }

    /// Make sure the OSMesa tree exists.
    pub fn ensure_native_library(&self, fetcher: &dyn ArchiveFetcher) -> Result<NativeOutcome> {
        self.native.ensure(fetcher)
    }

    /// Make sure every generated source exists.
    pub fn ensure_generated_sources(
        &self,
        generator: &dyn SourceGenerator,
    ) -> Result<GeneratedOutcome> {
        self.sources.ensure(generator)
    }

    /// OSMesa first, then the generated sources; stops at the first failure.
    pub fn ensure_all(
        &self,
        fetcher: &dyn ArchiveFetcher,
        generator: &dyn SourceGenerator,
    ) -> Result<MaterializeReport> {
        let native = self.ensure_native_library(fetcher)?;
        let sources = self.ensure_generated_sources(generator)?;
        Ok(MaterializeReport { native, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::fs;
    use tempfile::TempDir;

    struct NoFetch;

    impl ArchiveFetcher for NoFetch {
        fn fetch(&self, url: &str, _dest: &Path) -> anyhow::Result<u64> {
            anyhow::bail!("offline: {}", url)
        }
    }

    struct NoGenerate;

    impl SourceGenerator for NoGenerate {
        fn generate(&self) -> Result<()> {
            panic!("generator must not run");
        }
    }

    fn materializer(root: &Path) -> DependencyMaterializer {
        DependencyMaterializer::new(
            NativeLibrary::new(root, "https://example.com", HostPlatform::new("Linux", "x86_64")),
            GeneratedSources::opengl(root),
        )
    }

    #[test]
    fn everything_present_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("OSMesa")).unwrap();
        fs::write(temp.path().join("_constants.py"), "").unwrap();
        fs::write(temp.path().join("_functions.pyx"), "").unwrap();

        let report = materializer(temp.path())
            .ensure_all(&NoFetch, &NoGenerate)
            .unwrap();

        assert_eq!(
            report,
            MaterializeReport {
                native: NativeOutcome::Present,
                sources: GeneratedOutcome::Present,
            }
        );
    }

    #[test]
    fn fetch_failure_stops_before_generation() {
        let temp = TempDir::new().unwrap();

        let err = materializer(temp.path())
            .ensure_all(&NoFetch, &NoGenerate)
            .unwrap_err();

        match err {
            BuildError::FetchFailed { url, message } => {
                assert!(url.ends_with("/OSMesa.Linux.x86_64.zip"));
                assert!(message.contains("offline"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_config_resolves_context_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = BuildConfig::default();
        config.context_dir = "native".into();

        let m = DependencyMaterializer::from_config(
            &config,
            temp.path(),
            HostPlatform::new("Darwin", "arm64"),
        )
        .unwrap();

        assert_eq!(m.native().library_dir(), temp.path().join("native/OSMesa"));
        assert_eq!(
            m.native().archive_path(),
            temp.path().join("native/OSMesa.Darwin.arm64.zip")
        );
        assert_eq!(m.sources().files()[0], temp.path().join("native/_constants.py"));
    }
}
