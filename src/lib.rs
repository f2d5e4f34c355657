//! opendr-build - native dependency preparation and packaging for opendr.
//!
//! Before opendr's native rendering contexts can compile, two build-time
//! dependencies must be on disk: a prebuilt OSMesa tree for the host
//! platform and the autogenerated OpenGL binding sources. This crate
//! materializes both (downloading, extracting or generating only what is
//! missing), assembles the extension descriptors for the host and hands a
//! package manifest to the packaging tool.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`context`] - Per-run resolved configuration and platform
//! - [`error`] - Error types and result aliases
//! - [`extension`] - Native extension descriptors
//! - [`materialize`] - OSMesa and generated source materialization
//! - [`package`] - Package manifest and packaging command
//! - [`platform`] - Host platform detection and capabilities
//! - [`shell`] - External command execution
//! - [`ui`] - Spinners, prompts, and terminal output
//!
//! # Example
//!
//! ```
//! use opendr_build::platform::{ContextKind, HostPlatform, PlatformCapabilities};
//!
//! let host = HostPlatform::new("Darwin", "arm64");
//! assert_eq!(host.archive_name("OSMesa"), "OSMesa.Darwin.arm64.zip");
//!
//! let caps = PlatformCapabilities::resolve(&host);
//! assert!(caps.builds(ContextKind::Mac));
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod extension;
pub mod materialize;
pub mod package;
pub mod platform;
pub mod shell;
pub mod ui;

pub use error::{BuildError, Result};
