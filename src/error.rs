//! Error types for build preparation.
//!
//! This module defines [`BuildError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every unmet post-condition (archive, extracted tree, generated file)
//!   becomes a distinct variant instead of a panic
//! - Use `anyhow::Error` (via `BuildError::Other`) for unexpected errors
//! - The CLI driver owns the exit status; nothing below it exits the process

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for build preparation.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The archive download did not complete.
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// The archive is not on disk after the fetch attempt.
    #[error("Archive missing after fetch: {path}")]
    ArchiveMissing { path: PathBuf },

    /// Extraction finished but the expected library tree is absent.
    #[error("Extraction of {archive} did not produce {expected}")]
    ExtractionIncomplete { archive: PathBuf, expected: PathBuf },

    /// A pinned archive digest did not match.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The archive could not be read as a zip file.
    #[error("Invalid archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// The source generator ran but an expected output is missing.
    #[error("Source generation did not produce {path}")]
    GenerationIncomplete { path: PathBuf },

    /// The source generator could not be run or exited non-zero.
    #[error("Source generator failed: {message}")]
    GeneratorFailed { message: String },

    /// The packaging command could not be run or exited non-zero.
    #[error("Packaging failed: {message}")]
    PackagingFailed { message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for build preparation.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failed_displays_url_and_message() {
        let err = BuildError::FetchFailed {
            url: "https://example.com/OSMesa.Linux.x86_64.zip".into(),
            message: "HTTP 404".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("OSMesa.Linux.x86_64.zip"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn archive_missing_displays_path() {
        let err = BuildError::ArchiveMissing {
            path: PathBuf::from("/ctx/OSMesa.Linux.x86_64.zip"),
        };
        assert!(err.to_string().contains("/ctx/OSMesa.Linux.x86_64.zip"));
    }

    #[test]
    fn extraction_incomplete_displays_both_paths() {
        let err = BuildError::ExtractionIncomplete {
            archive: PathBuf::from("/ctx/a.zip"),
            expected: PathBuf::from("/ctx/OSMesa"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/ctx/a.zip"));
        assert!(msg.contains("/ctx/OSMesa"));
    }

    #[test]
    fn checksum_mismatch_displays_digests() {
        let err = BuildError::ChecksumMismatch {
            path: PathBuf::from("a.zip"),
            expected: "aaaa".into(),
            actual: "bbbb".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("aaaa"));
        assert!(msg.contains("bbbb"));
    }

    #[test]
    fn generation_incomplete_displays_path() {
        let err = BuildError::GenerationIncomplete {
            path: PathBuf::from("contexts/_functions.pyx"),
        };
        assert!(err.to_string().contains("_functions.pyx"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = BuildError::ConfigParseError {
            path: PathBuf::from("/opendr-build.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/opendr-build.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BuildError = io_err.into();
        assert!(matches!(err, BuildError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts_to_other() {
        let err: BuildError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, BuildError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
