//! Filtered zip extraction.
//!
//! Only entries whose name matches the include pattern are written. Files
//! are unpacked into a hidden staging directory next to their destination
//! and moved into place after every matching entry has been written, so a
//! failed extraction never produces a partial tree at the final path.

use regex::Regex;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::error::{BuildError, Result};

/// Extract entries of `archive_path` whose names match `include` into `dest_root`.
///
/// Returns the extracted paths relative to `dest_root`, in archive order.
/// Entries with absolute or parent-escaping names are skipped.
pub fn extract_matching(
    archive_path: &Path,
    dest_root: &Path,
    include: &Regex,
) -> Result<Vec<PathBuf>> {
    debug!(archive = ?archive_path, dest = ?dest_root, pattern = include.as_str(), "Extracting");

    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| BuildError::Archive {
        path: archive_path.to_path_buf(),
        message: format!("Failed to open zip: {}", e),
    })?;

    fs::create_dir_all(dest_root)?;
    let staging = staging_dir(archive_path, dest_root);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let staged = (|| -> Result<Vec<PathBuf>> {
        let mut extracted = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| BuildError::Archive {
                path: archive_path.to_path_buf(),
                message: format!("Failed to read zip entry {}: {}", i, e),
            })?;

            if entry.is_dir() || !include.is_match(entry.name()) {
                trace!(name = entry.name(), "Skipping entry");
                continue;
            }

            let relative = match entry.enclosed_name() {
                Some(path) => path,
                None => {
                    warn!("Skipping unsafe archive entry {}", entry.name());
                    continue;
                }
            };

            let outpath = staging.join(&relative);
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&outpath)?;
            io::copy(&mut entry, &mut out)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode().filter(|m| m & 0o777 != 0) {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o777))?;
            }

            trace!(path = ?relative, "Extracted entry");
            extracted.push(relative);
        }

        Ok(extracted)
    })();

    let extracted = match staged {
        Ok(extracted) => extracted,
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
    };

    move_into(&staging, dest_root)?;
    fs::remove_dir_all(&staging)?;

    debug!(count = extracted.len(), "Extraction complete");
    Ok(extracted)
}

fn staging_dir(archive_path: &Path, dest_root: &Path) -> PathBuf {
    let name = archive_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("archive");
    dest_root.join(format!(".{}.extract", name))
}

/// Move the children of `src` into `dst`, merging into existing directories
/// and replacing existing files.
fn move_into(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            if to.is_dir() {
                move_into(&from, &to)?;
            } else {
                if to.exists() {
                    fs::remove_file(&to)?;
                }
                fs::rename(&from, &to)?;
            }
        } else {
            if to.is_dir() {
                fs::remove_dir_all(&to)?;
            }
            fs::rename(&from, &to)?;
        }
    }
    Ok(())
}
