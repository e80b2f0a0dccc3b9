//! Size-policy scanning.
//!
//! Walks the policy's directories, filters files by extension, measures
//! sizes, and partitions the result into compliant files and violations.
//!
//! ## Traversal Rules
//!
//! - Directories are processed in the order the policy lists them.
//! - Traversal is recursive and sorted by file name at every level, so the
//!   output order is deterministic for a fixed tree.
//! - A configured directory that does not exist is silently skipped: a fresh
//!   repository without an `assets` folder yet must not fail the check.
//! - A file that cannot be stat'd (permissions, deleted mid-scan) is skipped
//!   and the scan continues. A hook that blocks every push over one transient
//!   IO error is worse than one missed check.
//!
//! The scan never writes; the only side effects are filesystem reads.

use crate::config::Policy;
use crate::units::format_size;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// A scanned file that matched the extension filter.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub size_bytes: u64,
}

/// A scanned file whose size exceeds the policy limit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub path: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    pub size_human: String,
}

/// Result of one scan invocation. Constructed once, never mutated.
#[derive(Debug, Serialize)]
pub struct ScanResult {
    /// True iff no file exceeded the limit.
    pub compliant: bool,
    /// Number of files that matched the extension filter.
    pub total_scanned: usize,
    /// Every matched file, violations included, in traversal order.
    pub records: Vec<FileRecord>,
    /// The oversized subset, in traversal order.
    pub violations: Vec<Violation>,
    pub limit_bytes: u64,
    /// How many of the configured directories actually exist.
    pub directories_found: usize,
}

/// Scan every configured directory and classify matching files against the
/// policy's size limit.
pub fn scan(policy: &Policy) -> ScanResult {
    let mut records = Vec::new();
    let mut violations = Vec::new();
    let mut directories_found = 0;

    for dir in &policy.directories {
        if !dir.is_dir() {
            continue;
        }
        directories_found += 1;

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let Ok(entry) = entry else {
                // Unreadable subtree or racing delete: skip, keep scanning.
                continue;
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(ext) = extension_of(entry.path()) else {
                continue;
            };
            if !policy.extensions.iter().any(|e| *e == ext) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            let size_bytes = metadata.len();
            let path = entry.path().to_string_lossy().into_owned();

            if size_bytes > policy.limit_bytes {
                violations.push(Violation {
                    path: path.clone(),
                    size_bytes,
                    size_human: format_size(size_bytes),
                });
            }
            records.push(FileRecord { path, size_bytes });
        }
    }

    ScanResult {
        compliant: violations.is_empty(),
        total_scanned: records.len(),
        records,
        violations,
        limit_bytes: policy.limit_bytes,
        directories_found,
    }
}

/// Lowercased portion of the file name after the last `.`, if any.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}
