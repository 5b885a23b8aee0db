// src/config.rs
//! Run configuration: the feature matrix and per-invocation diagnostics.
//!
//! Everything that used to be ambient in the original CI script (the
//! backtrace environment flag, the hard-coded feature list) lives here as
//! explicit, inspectable fields.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A named feature configuration to test in addition to the default one.
///
/// The name is passed verbatim to `cargo --features`, so it may be a single
/// feature or a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FeatureConfig(String);

impl FeatureConfig {
    pub fn new(name: impl Into<String>) -> Self {
        FeatureConfig(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backtrace verbosity applied to test invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktraceStyle {
    /// No backtrace variable is set.
    Disabled,
    /// `RUST_BACKTRACE=1` - short backtraces.
    Enabled,
    /// `RUST_BACKTRACE=full` - every frame, no trimming.
    Full,
}

impl BacktraceStyle {
    /// The value to assign to `RUST_BACKTRACE`, or `None` when disabled.
    pub fn env_value(self) -> Option<&'static str> {
        match self {
            BacktraceStyle::Disabled => None,
            BacktraceStyle::Enabled => Some("1"),
            BacktraceStyle::Full => Some("full"),
        }
    }
}

/// Configuration for one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Directory the `cargo` invocations run in.
    pub workspace_root: PathBuf,
    /// Ordered list of feature configurations tested after the default pass.
    pub feature_sets: Vec<FeatureConfig>,
    /// Backtrace verbosity for test steps.
    pub backtrace: BacktraceStyle,
    /// Run tests normally skipped by default (`-- --include-ignored`).
    pub include_ignored: bool,
    /// Echo each command line to stderr before running it.
    pub echo: bool,
}

impl Default for VerifyConfig {
    /// The matrix the original CI script ran: default features, then the
    /// `test-no-std` configuration, with full backtraces and ignored tests
    /// included throughout.
    fn default() -> Self {
        VerifyConfig {
            workspace_root: PathBuf::from("."),
            feature_sets: vec![FeatureConfig::new("test-no-std")],
            backtrace: BacktraceStyle::Full,
            include_ignored: true,
            echo: true,
        }
    }
}

/// On-disk description of the feature matrix (`featmatrix.json`).
///
/// ```json
/// { "feature_sets": ["test-no-std"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Ordered feature configurations, tested after the default pass.
    pub feature_sets: Vec<FeatureConfig>,
}

impl Manifest {
    /// Conventional manifest file name, looked up in the workspace root.
    pub const FILE_NAME: &'static str = "featmatrix.json";

    /// Load and parse a manifest from `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            error: e,
        })?;
        Self::parse(&text).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Parse a manifest from its JSON text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Error type for manifest loading.
#[derive(Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    Io { path: PathBuf, error: io::Error },
    /// The manifest file is not valid JSON (or has the wrong shape).
    Parse {
        path: PathBuf,
        error: serde_json::Error,
    },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io { path, error } => {
                write!(f, "failed to read {}: {}", path.display(), error)
            }
            ManifestError::Parse { path, error } => {
                write!(f, "failed to parse {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io { error, .. } => Some(error),
            ManifestError::Parse { error, .. } => Some(error),
        }
    }
}
