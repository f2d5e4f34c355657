//! Configuration loading and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, environment overrides and validation in [`loader`]
//!
//! # Example
//!
//! ```
//! use opendr_build::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("opendr-build.yml"), "context_dir: native").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.context_dir, std::path::PathBuf::from("native"));
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, find_project_config, load_config, load_config_file, parse_config,
    validate, CONFIG_FILE_NAME, ENV_CONTEXT_DIR, ENV_OSMESA_URL,
};
pub use schema::{BuildConfig, GeneratedConfig, OsmesaConfig, PackageConfig, DEFAULT_OSMESA_URL};
