//! Host platform detection and the capability set derived from it.
//!
//! Archive names use the strings the kernel reports (`uname` sysname and
//! machine), e.g. `Linux`/`x86_64` or `Darwin`/`arm64`, not Rust's
//! target constants.

use std::fmt;

/// Operating system and machine strings as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPlatform {
    /// Operating system name (Linux, Darwin, Windows).
    pub system: String,
    /// Machine architecture (x86_64, arm64, aarch64, AMD64).
    pub machine: String,
}

impl HostPlatform {
    /// Create a platform from explicit strings.
    pub fn new(system: impl Into<String>, machine: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            machine: machine.into(),
        }
    }

    /// Detect the running host.
    pub fn detect() -> Self {
        #[cfg(unix)]
        if let Some(platform) = uname() {
            return platform;
        }

        from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Whether the host is macOS.
    pub fn is_darwin(&self) -> bool {
        self.system == "Darwin"
    }

    /// Archive filename for this host, e.g. `OSMesa.Linux.x86_64.zip`.
    pub fn archive_name(&self, prefix: &str) -> String {
        format!("{}.{}.{}.zip", prefix, self.system, self.machine)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.system, self.machine)
    }
}

#[cfg(unix)]
fn uname() -> Option<HostPlatform> {
    use std::ffi::CStr;

    // SAFETY: utsname is plain old data; an all-zero value is valid.
    let mut info: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: `info` is a valid, writable utsname for the duration of the call.
    if unsafe { libc::uname(&mut info) } != 0 {
        return None;
    }

    // SAFETY: on success uname fills both fields with NUL-terminated strings.
    let system = unsafe { CStr::from_ptr(info.sysname.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    let machine = unsafe { CStr::from_ptr(info.machine.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    if system.is_empty() || machine.is_empty() {
        return None;
    }
    Some(HostPlatform::new(system, machine))
}

/// Map Rust target constants to the names `uname` would report.
fn from_consts(os: &str, arch: &str) -> HostPlatform {
    let system = match os {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    };
    let machine = match (os, arch) {
        ("windows", "x86_64") => "AMD64".to_string(),
        ("windows", "aarch64") => "ARM64".to_string(),
        ("macos", "aarch64") => "arm64".to_string(),
        (_, other) => other.to_string(),
    };
    HostPlatform::new(system, machine)
}

/// A native rendering context compiled into the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Off-screen Mesa context, available everywhere.
    Mesa,
    /// Native Cocoa/CGL context, macOS only.
    Mac,
}

impl ContextKind {
    /// Module name relative to the extension package.
    pub fn module_name(&self) -> &'static str {
        match self {
            Self::Mesa => "contexts.ctx_mesa",
            Self::Mac => "contexts.ctx_mac",
        }
    }
}

/// The platform-dependent build choices, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Contexts to build, in build order.
    pub contexts: Vec<ContextKind>,
    /// Link against talloc (required by the macOS OSMesa build).
    pub needs_talloc: bool,
    /// Pass `-Qunused-arguments` to clang.
    pub quiet_unused_arguments: bool,
}

impl PlatformCapabilities {
    /// Resolve the capability set for a host.
    pub fn resolve(platform: &HostPlatform) -> Self {
        if platform.is_darwin() {
            Self {
                contexts: vec![ContextKind::Mesa, ContextKind::Mac],
                needs_talloc: true,
                quiet_unused_arguments: true,
            }
        } else {
            Self {
                contexts: vec![ContextKind::Mesa],
                needs_talloc: false,
                quiet_unused_arguments: false,
            }
        }
    }

    /// Whether a context is part of this build.
    pub fn builds(&self, kind: ContextKind) -> bool {
        self.contexts.contains(&kind)
    }
}
