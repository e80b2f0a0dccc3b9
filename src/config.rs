//! Tool configuration.
//!
//! Handles loading `image-guard.toml`, merging command-line overrides, and
//! resolving the result into the [`Policy`] the scanner runs against.
//!
//! ## Config File
//!
//! Place `image-guard.toml` in the repository root:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! max_size = "1MB"                  # "500KB", "2MB", or plain bytes "1048576"
//! directories = ["public", "assets"]
//! extensions = ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico"]
//! mode = "block"                    # "block" or "resize"
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.
//!
//! ## Precedence
//!
//! Command-line flags override the file, which overrides built-in defaults.
//! The file is re-read from disk on every invocation; a pre-push hook must
//! never act on a stale cached copy of an edited config.

use crate::units::parse_size_or_default;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// What to do with oversized files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Report violations and exit non-zero.
    #[default]
    Block,
    /// Attempt to shrink violations in place before blocking.
    Resize,
}

/// Configuration loaded from `image-guard.toml`.
///
/// All fields have defaults matching the stock pre-push setup. Unknown keys
/// are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Size limit, human-readable ("1MB", "500KB") or plain bytes, either as
    /// a string ("1048576") or a bare TOML integer (1048576).
    #[serde(deserialize_with = "size_string_or_int")]
    pub max_size: String,
    /// Directories to scan, processed in listed order.
    pub directories: Vec<String>,
    /// File extensions to check. Leading dots and case are ignored.
    pub extensions: Vec<String>,
    /// Oversized-file handling mode.
    pub mode: Mode,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_size: "1MB".to_string(),
            directories: vec!["public".to_string(), "assets".to_string()],
            extensions: ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            mode: Mode::Block,
        }
    }
}

/// Command-line overrides, applied on top of the file config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_size: Option<String>,
    pub directories: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub mode: Option<Mode>,
}

impl GuardConfig {
    /// Apply command-line overrides. Flags win over file values wholesale;
    /// there is no per-element merging of lists.
    pub fn merge_cli(mut self, overrides: &CliOverrides) -> Self {
        if let Some(ref max_size) = overrides.max_size {
            self.max_size = max_size.clone();
        }
        if let Some(ref directories) = overrides.directories {
            self.directories = directories.clone();
        }
        if let Some(ref extensions) = overrides.extensions {
            self.extensions = extensions.clone();
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        self
    }
}

/// Load config from `path`, falling back to defaults when the file is absent.
///
/// A missing file is the common case for fresh repositories and is not an
/// error. Malformed TOML and unknown keys are errors: silently ignoring a
/// typo'd config would let oversized assets through.
pub fn load_config(path: &Path) -> Result<GuardConfig, ConfigError> {
    if !path.exists() {
        return Ok(GuardConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: GuardConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Resolved policy for one check run: parsed byte limit, normalized
/// extensions, directory list, and mode.
#[derive(Debug, Clone)]
pub struct Policy {
    pub limit_bytes: u64,
    pub directories: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub mode: Mode,
}

impl Policy {
    /// Build a policy from the merged config.
    ///
    /// Recoverable problems (an unparseable size limit) become warnings for
    /// the caller to print rather than failures; a broken limit string falls
    /// back to the 1 MiB default.
    pub fn from_config(config: &GuardConfig) -> (Policy, Vec<String>) {
        let mut warnings = Vec::new();

        let (limit_bytes, size_warning) = parse_size_or_default(&config.max_size);
        if let Some(warning) = size_warning {
            warnings.push(warning);
        }

        let extensions = config
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();

        let policy = Policy {
            limit_bytes,
            directories: config.directories.iter().map(PathBuf::from).collect(),
            extensions,
            mode: config.mode,
        };
        (policy, warnings)
    }
}

/// Accept `max_size` as either a string or a bare integer byte count.
/// Integers are carried forward as their decimal string so downstream
/// parsing stays uniform.
fn size_string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeValue {
        Text(String),
        Bytes(u64),
    }

    Ok(match SizeValue::deserialize(deserializer)? {
        SizeValue::Text(s) => s,
        SizeValue::Bytes(n) => n.to_string(),
    })
}

/// Lowercase an extension and strip any leading dot, so `".JPG"`, `"JPG"`,
/// and `"jpg"` all compare equal during the scan.
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// A fully documented config file with every option at its default value.
///
/// Printed by the `gen-config` subcommand so users start from a file that
/// documents itself.
pub fn stock_config_toml() -> &'static str {
    r#"# image-guard configuration
#
# All options are optional. The values below are the built-in defaults;
# delete any line you don't want to override.

# Maximum allowed image size. Accepts "500KB", "2MB", "1GB", or a plain
# byte count, quoted ("1048576") or bare (1048576). Units are powers of 1024.
max_size = "1MB"

# Directories to scan, in order. Directories that don't exist yet are
# silently skipped, so listing a future "assets" folder is fine.
directories = ["public", "assets"]

# File extensions to check. Case and leading dots are ignored.
extensions = ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico"]

# What to do with oversized files:
#   "block"  - report them and exit non-zero (the push is rejected)
#   "resize" - shrink them in place, then block only what couldn't be shrunk
mode = "block"
"#
}
