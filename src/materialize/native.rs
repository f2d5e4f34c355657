//! Prebuilt OSMesa materialization.

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::platform::HostPlatform;

use super::checksum::verify_sha256;
use super::extract::extract_matching;
use super::fetch::{partial_path, ArchiveFetcher};

/// Headers and static libraries.
static HEADER_OR_STATIC_LIB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[ah]$").unwrap());

/// What `NativeLibrary::ensure` had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeOutcome {
    /// The extracted tree already existed; nothing was touched.
    Present,
    /// The tree was extracted from an archive.
    Extracted {
        /// Archive that was unpacked.
        archive: PathBuf,
        /// Whether the archive had to be downloaded first.
        downloaded: bool,
        /// Number of files written.
        files: usize,
    },
}

/// The prebuilt OSMesa headers and libraries under the context directory.
pub struct NativeLibrary {
    root: PathBuf,
    dir_name: String,
    archive_prefix: String,
    base_url: String,
    include: Regex,
    pins: BTreeMap<String, String>,
    platform: HostPlatform,
}

impl NativeLibrary {
    /// Create a library rooted at `root` (the context directory).
    pub fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
        platform: HostPlatform,
    ) -> Self {
        Self {
            root: root.into(),
            dir_name: "OSMesa".to_string(),
            archive_prefix: "OSMesa".to_string(),
            base_url: base_url.into(),
            include: HEADER_OR_STATIC_LIB.clone(),
            pins: BTreeMap::new(),
            platform,
        }
    }

    /// Build from configuration, resolving the context dir against `project_root`.
    pub fn from_config(
        config: &BuildConfig,
        project_root: &Path,
        platform: HostPlatform,
    ) -> Result<Self> {
        let include = Regex::new(&config.osmesa.include_pattern).map_err(|e| {
            BuildError::ConfigValidationError {
                message: format!("osmesa.include_pattern is not a valid regex: {}", e),
            }
        })?;

        Ok(Self {
            root: project_root.join(&config.context_dir),
            dir_name: config.osmesa.dir_name.clone(),
            archive_prefix: config.osmesa.archive_prefix.clone(),
            base_url: config.osmesa.base_url.clone(),
            include,
            pins: config.osmesa.sha256.clone(),
            platform,
        })
    }

    /// Pin an archive to a SHA-256 digest.
    pub fn with_pin(mut self, archive_name: impl Into<String>, sha256: impl Into<String>) -> Self {
        self.pins.insert(archive_name.into(), sha256.into());
        self
    }

    /// The host this library is prepared for.
    pub fn platform(&self) -> &HostPlatform {
        &self.platform
    }

    /// The extracted tree, e.g. `contexts/OSMesa`.
    pub fn library_dir(&self) -> PathBuf {
        self.root.join(&self.dir_name)
    }

    /// The archive filename for this host.
    pub fn archive_name(&self) -> String {
        self.platform.archive_name(&self.archive_prefix)
    }

    /// Where the archive is cached locally.
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(self.archive_name())
    }

    /// Remote location of the archive.
    pub fn archive_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.archive_name()
        )
    }

    /// Whether the extracted tree exists.
    pub fn is_present(&self) -> bool {
        self.library_dir().exists()
    }

    /// Make sure the extracted tree exists, downloading and unpacking the
    /// archive when it does not.
    pub fn ensure(&self, fetcher: &dyn ArchiveFetcher) -> Result<NativeOutcome> {
        let library_dir = self.library_dir();
        if library_dir.exists() {
            debug!("{} present, skipping download", library_dir.display());
            return Ok(NativeOutcome::Present);
        }

        let archive = self.archive_path();
        let mut downloaded = false;
        if !archive.exists() {
            let url = self.archive_url();
            info!("Downloading {}", self.archive_name());
            fetcher
                .fetch(&url, &archive)
                .map_err(|e| BuildError::FetchFailed {
                    url: url.clone(),
                    message: format!("{:#}", e),
                })?;
            downloaded = true;
        } else {
            debug!("Using cached archive {}", archive.display());
        }

        if !archive.exists() {
            return Err(BuildError::ArchiveMissing { path: archive });
        }

        if let Some(expected) = self.pins.get(&self.archive_name()) {
            if let Err(e) = verify_sha256(&archive, expected) {
                // Drop the bad archive so the next run fetches a fresh copy.
                let _ = fs::remove_file(&archive);
                return Err(e);
            }
            debug!("Checksum verified for {}", archive.display());
        }

        let files = extract_matching(&archive, &self.root, &self.include)?;
        info!(
            "Extracted {} files from {}",
            files.len(),
            self.archive_name()
        );

        if !library_dir.exists() {
            return Err(BuildError::ExtractionIncomplete {
                archive,
                expected: library_dir,
            });
        }

        Ok(NativeOutcome::Extracted {
            archive,
            downloaded,
            files: files.len(),
        })
    }

    /// Remove the extracted tree. Returns whether anything was removed.
    pub fn remove_tree(&self) -> Result<bool> {
        let dir = self.library_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove cached archives for any host, plus leftover partial downloads.
    pub fn remove_archives(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        if !self.root.exists() {
            return Ok(removed);
        }

        let prefix = format!("{}.", self.archive_prefix);
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_archive = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n.starts_with(&prefix) && (n.ends_with(".zip") || n.ends_with(".zip.part"))
                });
            if is_archive && path.is_file() {
                fs::remove_file(&path)?;
                removed.push(path);
            }
        }

        removed.sort();
        Ok(removed)
    }

    /// Whether an interrupted download was left behind.
    pub fn has_partial_download(&self) -> bool {
        partial_path(&self.archive_path()).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::extract::tests::create_test_zip;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records requested URLs and copies a fixture into place.
    struct FixtureFetcher {
        fixture: Option<PathBuf>,
        requests: RefCell<Vec<String>>,
    }

    impl FixtureFetcher {
        fn serving(fixture: &Path) -> Self {
            Self {
                fixture: Some(fixture.to_path_buf()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn silent() -> Self {
            Self {
                fixture: None,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ArchiveFetcher for FixtureFetcher {
        fn fetch(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
            self.requests.borrow_mut().push(url.to_string());
            match &self.fixture {
                Some(src) => Ok(fs::copy(src, dest)?),
                None => Ok(0),
            }
        }
    }

    fn linux() -> HostPlatform {
        HostPlatform::new("Linux", "x86_64")
    }

    fn osmesa_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("fixture.zip");
        create_test_zip(
            &path,
            &[
                ("OSMesa/include/GL/osmesa.h", b"h"),
                ("OSMesa/lib/libOSMesa.a", b"a"),
                ("OSMesa/README", b"r"),
            ],
        );
        path
    }

    #[test]
    fn archive_name_and_url() {
        let lib = NativeLibrary::new("/ctx", "https://example.com/osmesa/", linux());
        assert_eq!(lib.archive_name(), "OSMesa.Linux.x86_64.zip");
        assert_eq!(
            lib.archive_url(),
            "https://example.com/osmesa/OSMesa.Linux.x86_64.zip"
        );
        assert_eq!(lib.library_dir(), PathBuf::from("/ctx/OSMesa"));
        assert_eq!(
            lib.archive_path(),
            PathBuf::from("/ctx/OSMesa.Linux.x86_64.zip")
        );
    }

    #[test]
    fn present_tree_skips_fetch() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("OSMesa")).unwrap();
        let fetcher = FixtureFetcher::silent();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux());

        let outcome = lib.ensure(&fetcher).unwrap();

        assert_eq!(outcome, NativeOutcome::Present);
        assert!(fetcher.requests.borrow().is_empty());
        assert!(!lib.archive_path().exists());
    }

    #[test]
    fn missing_tree_fetches_once_and_extracts() {
        let fixtures = TempDir::new().unwrap();
        let fixture = osmesa_fixture(fixtures.path());
        let temp = TempDir::new().unwrap();
        let fetcher = FixtureFetcher::serving(&fixture);
        let lib = NativeLibrary::new(temp.path(), "https://example.com/osmesa", linux());

        let outcome = lib.ensure(&fetcher).unwrap();

        assert_eq!(
            *fetcher.requests.borrow(),
            vec!["https://example.com/osmesa/OSMesa.Linux.x86_64.zip".to_string()]
        );
        assert_eq!(
            outcome,
            NativeOutcome::Extracted {
                archive: lib.archive_path(),
                downloaded: true,
                files: 2,
            }
        );
        assert!(temp.path().join("OSMesa/include/GL/osmesa.h").exists());
        assert!(temp.path().join("OSMesa/lib/libOSMesa.a").exists());
        assert!(!temp.path().join("OSMesa/README").exists());
    }

    #[test]
    fn cached_archive_is_not_refetched() {
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux());
        osmesa_fixture(temp.path());
        fs::rename(temp.path().join("fixture.zip"), lib.archive_path()).unwrap();
        let fetcher = FixtureFetcher::silent();

        let outcome = lib.ensure(&fetcher).unwrap();

        assert!(fetcher.requests.borrow().is_empty());
        assert!(matches!(
            outcome,
            NativeOutcome::Extracted {
                downloaded: false,
                ..
            }
        ));
    }

    #[test]
    fn fetch_that_writes_nothing_is_archive_missing() {
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux());

        let err = lib.ensure(&FixtureFetcher::silent()).unwrap_err();

        assert!(matches!(err, BuildError::ArchiveMissing { .. }));
    }

    #[test]
    fn archive_without_tree_is_extraction_incomplete() {
        let fixtures = TempDir::new().unwrap();
        let fixture = fixtures.path().join("other.zip");
        create_test_zip(&fixture, &[("Other/include/x.h", b"x")]);
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux());

        let err = lib.ensure(&FixtureFetcher::serving(&fixture)).unwrap_err();

        assert!(matches!(err, BuildError::ExtractionIncomplete { .. }));
    }

    #[test]
    fn pin_mismatch_removes_archive() {
        let fixtures = TempDir::new().unwrap();
        let fixture = osmesa_fixture(fixtures.path());
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux())
            .with_pin("OSMesa.Linux.x86_64.zip", "0".repeat(64));

        let err = lib.ensure(&FixtureFetcher::serving(&fixture)).unwrap_err();

        assert!(matches!(err, BuildError::ChecksumMismatch { .. }));
        assert!(!lib.archive_path().exists());
        assert!(!lib.is_present());
    }

    #[test]
    fn cached_archive_with_wrong_pin_is_discarded_without_fetch() {
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux())
            .with_pin("OSMesa.Linux.x86_64.zip", "f".repeat(64));
        osmesa_fixture(temp.path());
        fs::rename(temp.path().join("fixture.zip"), lib.archive_path()).unwrap();
        let fetcher = FixtureFetcher::silent();

        let err = lib.ensure(&fetcher).unwrap_err();

        assert!(matches!(err, BuildError::ChecksumMismatch { .. }));
        assert!(fetcher.requests.borrow().is_empty());
        assert!(!lib.archive_path().exists());
        assert!(!lib.is_present());
    }

    #[test]
    fn matching_pin_extracts() {
        let fixtures = TempDir::new().unwrap();
        let fixture = osmesa_fixture(fixtures.path());
        let digest = crate::materialize::checksum::sha256_file(&fixture).unwrap();
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux())
            .with_pin("OSMesa.Linux.x86_64.zip", digest);

        lib.ensure(&FixtureFetcher::serving(&fixture)).unwrap();

        assert!(lib.is_present());
    }

    #[test]
    fn remove_archives_only_touches_prefixed_zips() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("OSMesa.Linux.x86_64.zip"), "z").unwrap();
        fs::write(temp.path().join("OSMesa.Darwin.arm64.zip.part"), "p").unwrap();
        fs::write(temp.path().join("ctx_mesa.pyx"), "src").unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux());

        let removed = lib.remove_archives().unwrap();

        assert_eq!(removed.len(), 2);
        assert!(temp.path().join("ctx_mesa.pyx").exists());
    }

    #[test]
    fn remove_tree_reports_whether_removed() {
        let temp = TempDir::new().unwrap();
        let lib = NativeLibrary::new(temp.path(), "https://example.com", linux());
        assert!(!lib.remove_tree().unwrap());

        fs::create_dir_all(lib.library_dir().join("lib")).unwrap();
        assert!(lib.remove_tree().unwrap());
        assert!(!lib.is_present());
    }
}
