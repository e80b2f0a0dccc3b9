//! CLI output formatting.
//!
//! Follows the same contract everywhere: a pure `format_*` function returns
//! the display lines (testable, no I/O), and a thin `print_*` wrapper writes
//! them to stdout.
//!
//! ```text
//! Checking image sizes (limit 1.00MB)
//!     Directories: public, assets | Extensions: jpg, jpeg, png
//!   [OK] public/logo.png (12.50KB)
//!   [X]  public/hero.jpg (2.00MB)
//! ----------------------------------------
//! PUSH BLOCKED
//! The following images exceed the 1.00MB limit:
//!   - public/hero.jpg (2.00MB)
//! ...
//! ```

use crate::check::CheckReport;
use crate::config::{GuardConfig, Mode};
use crate::units::format_size;

const SEPARATOR: &str = "----------------------------------------";

/// Format a full check run as display lines.
pub fn format_check_output(report: &CheckReport, config: &GuardConfig) -> Vec<String> {
    let mut lines = Vec::new();

    for warning in &report.warnings {
        lines.push(format!("warning: {warning}"));
    }

    lines.push(format!(
        "Checking image sizes (limit {})",
        format_size(report.max_size_bytes)
    ));
    lines.push(format!(
        "    Directories: {} | Extensions: {}",
        config.directories.join(", "),
        config.extensions.join(", ")
    ));

    for record in &report.scan.records {
        let over = record.size_bytes > report.max_size_bytes;
        let marker = if over { "[X] " } else { "[OK]" };
        lines.push(format!(
            "  {marker} {} ({})",
            record.path,
            format_size(record.size_bytes)
        ));
    }

    if report.scan.directories_found == 0 {
        // Missing and empty directories behave the same for the verdict, but
        // all of them missing usually means a typo'd config.
        lines.push(format!(
            "    (none of the configured directories exist: {})",
            config.directories.join(", ")
        ));
    }

    lines.push(SEPARATOR.to_string());

    if !report.resized_files.is_empty() {
        lines.push("Resized".to_string());
        for resized in &report.resized_files {
            lines.push(format!(
                "    {} {} -> {}",
                resized.path, resized.original_size_human, resized.new_size_human
            ));
        }
    }
    if !report.failed_resizes.is_empty() {
        lines.push("Could not resize".to_string());
        for failure in &report.failed_resizes {
            lines.push(format!(
                "    {} ({}): {}",
                failure.path, failure.size_human, failure.reason
            ));
        }
    }

    if report.success {
        lines.push(format!(
            "All images are compliant (< {})",
            format_size(report.max_size_bytes)
        ));
        lines.push(format!("    {} image(s) checked", report.total_checked));
    } else {
        lines.push("PUSH BLOCKED".to_string());
        lines.push(format!(
            "The following images exceed the {} limit:",
            format_size(report.max_size_bytes)
        ));
        for (path, size_human) in remaining_violations(report) {
            lines.push(format!("  - {path} ({size_human})"));
        }
        lines.push(String::new());
        lines.push("Possible fixes:".to_string());
        lines.push("  1. Compress the image (TinyPNG, ImageOptim, squoosh)".to_string());
        lines.push("  2. Reduce its pixel dimensions".to_string());
        if report.mode == Mode::Block {
            lines.push("  3. Run with --mode resize to shrink oversized images in place".to_string());
        }
    }

    lines
}

/// Violations still standing after the resize pass: in block mode that is
/// every violation, in resize mode only the failed ones.
fn remaining_violations(report: &CheckReport) -> Vec<(String, String)> {
    match report.mode {
        Mode::Block => report
            .oversized_files
            .iter()
            .map(|v| (v.path.clone(), v.size_human.clone()))
            .collect(),
        Mode::Resize => report
            .failed_resizes
            .iter()
            .map(|f| (f.path.clone(), f.size_human.clone()))
            .collect(),
    }
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport, config: &GuardConfig) {
    for line in format_check_output(report, config) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(root: &Path, max_size: &str, mode: Mode) -> GuardConfig {
        GuardConfig {
            max_size: max_size.to_string(),
            directories: vec![root.join("public").to_string_lossy().into_owned()],
            extensions: vec!["jpg".to_string()],
            mode,
        }
    }

    fn write_file(root: &Path, rel: &str, len: usize) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; len]).unwrap();
    }

    #[test]
    fn compliant_run_reports_count() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "public/a.jpg", 100);

        let config = config_for(tmp.path(), "1KB", Mode::Block);
        let report = check::run(&config, None);
        let lines = format_check_output(&report, &config);

        assert!(lines[0].starts_with("Checking image sizes (limit 1.00KB)"));
        assert!(lines.iter().any(|l| l.contains("[OK]") && l.contains("a.jpg")));
        assert!(lines.iter().any(|l| l == "All images are compliant (< 1.00KB)"));
        assert!(lines.iter().any(|l| l.contains("1 image(s) checked")));
    }

    #[test]
    fn blocked_run_lists_violations_and_fixes() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "public/big.jpg", 5000);

        let config = config_for(tmp.path(), "1KB", Mode::Block);
        let report = check::run(&config, None);
        let lines = format_check_output(&report, &config);

        assert!(lines.iter().any(|l| l == "PUSH BLOCKED"));
        assert!(lines.iter().any(|l| l.contains("[X]") && l.contains("big.jpg")));
        assert!(lines.iter().any(|l| l.starts_with("  - ") && l.contains("big.jpg")));
        assert!(lines.iter().any(|l| l.contains("--mode resize")));
    }

    #[test]
    fn missing_directories_get_a_notice() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), "1MB", Mode::Block);
        let report = check::run(&config, None);
        let lines = format_check_output(&report, &config);

        assert!(
            lines
                .iter()
                .any(|l| l.contains("none of the configured directories exist"))
        );
        // Still a pass
        assert!(lines.iter().any(|l| l.starts_with("All images are compliant")));
    }

    #[test]
    fn warnings_come_first() {
        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), "garbage", Mode::Block);
        let report = check::run(&config, None);
        let lines = format_check_output(&report, &config);

        assert!(lines[0].starts_with("warning:"));
        assert!(lines[0].contains("garbage"));
    }

    #[test]
    fn resize_failures_are_shown_with_reasons() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "public/big.jpg", 5000);

        let config = config_for(tmp.path(), "1KB", Mode::Resize);
        // No encoder: the batch fails with the capability message.
        let report = check::run(&config, None);
        let lines = format_check_output(&report, &config);

        assert!(lines.iter().any(|l| l == "Could not resize"));
        assert!(lines.iter().any(|l| l.contains("encoder")));
        assert!(lines.iter().any(|l| l == "PUSH BLOCKED"));
        // Resize mode already ran; don't suggest it again
        assert!(!lines.iter().any(|l| l.contains("--mode resize")));
    }
}
