//! Check orchestration: scan, optionally resize, assemble the report.
//!
//! One call to [`run`] is one hook invocation: build the policy from the
//! merged config, scan, and in resize mode hand the violations to the fit
//! search. The returned [`CheckReport`] is the single result object the CLI
//! renders as text or JSON; its `success` field drives the process exit code.

use crate::config::{GuardConfig, Mode, Policy};
use crate::resize::{ImageEncoder, resize_all};
use crate::resize::{ResizeFailure, ResizeOutcome};
use crate::scan::{self, ScanResult, Violation};
use serde::Serialize;

/// Result of one check run.
///
/// Serialized (camelCase) for `--json` output; the extra fields the text
/// renderer needs are skipped.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// True iff nothing exceeds the limit once resizing (if any) is done.
    pub success: bool,
    /// Number of files the scan matched and measured.
    pub total_checked: usize,
    /// Every file the scan flagged, before any resizing.
    pub oversized_files: Vec<Violation>,
    pub max_size_bytes: u64,
    /// Violations successfully shrunk in place (resize mode only).
    pub resized_files: Vec<ResizeOutcome>,
    /// Violations the resize pass could not fix, with reasons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_resizes: Vec<ResizeFailure>,
    /// The mode this run executed under.
    pub mode: Mode,
    /// Full scan detail for the text renderer.
    #[serde(skip)]
    pub scan: ScanResult,
    /// Recoverable config problems to surface to the user.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Run one complete check against the merged configuration.
///
/// `encoder` is the optional resize capability; `None` is legal in any mode
/// and only matters when violations exist and the mode is
/// [`Mode::Resize`], where it fails the batch with guidance instead of
/// crashing.
pub fn run(config: &GuardConfig, encoder: Option<&dyn ImageEncoder>) -> CheckReport {
    let (policy, warnings) = Policy::from_config(config);
    let scan = scan::scan(&policy);

    let (resized_files, failed_resizes) =
        if policy.mode == Mode::Resize && !scan.violations.is_empty() {
            let batch = resize_all(encoder, &scan.violations, policy.limit_bytes);
            (batch.resized, batch.failed)
        } else {
            (Vec::new(), Vec::new())
        };

    let success = match policy.mode {
        Mode::Block => scan.compliant,
        // Compliant once every violation was shrunk under the limit.
        Mode::Resize => scan.violations.len() == resized_files.len(),
    };

    CheckReport {
        success,
        total_checked: scan.total_scanned,
        oversized_files: scan.violations.clone(),
        max_size_bytes: policy.limit_bytes,
        resized_files,
        failed_resizes,
        mode: policy.mode,
        scan,
        warnings,
    }
}
