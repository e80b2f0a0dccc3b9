//! The iterative fit search and batch orchestration.
//!
//! [`resize_to_fit`] searches for a scale factor that brings one image under
//! the byte budget within a bounded number of attempts. [`resize_all`] runs
//! the search over a batch of violations, collecting per-file outcomes.
//!
//! The original file is only ever overwritten after a full re-encode has
//! succeeded in memory and come in under budget. A failed or interrupted
//! search leaves the file byte-for-byte untouched.

use super::encoder::ImageEncoder;
use super::fit;
use crate::scan::Violation;
use crate::units::format_size;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Why one file could not be shrunk under the target.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResizeError {
    #[error("format is not resizable")]
    NotResizable,
    #[error("could not read image dimensions: {0}")]
    Undecodable(String),
    #[error("re-encode failed: {0}")]
    Encoding(String),
    #[error("still over the limit after {0} attempts")]
    BudgetExhausted(u32),
    #[error("image re-encoding support is not compiled in; rebuild with the `encoder` feature")]
    EncoderUnavailable,
}

/// A successful in-place shrink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeOutcome {
    pub path: String,
    pub original_size: u64,
    pub original_size_human: String,
    pub new_size: u64,
    pub new_size_human: String,
}

/// A violation the resize pass could not fix, with the reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeFailure {
    pub path: String,
    pub size: u64,
    pub size_human: String,
    pub reason: String,
}

/// Per-batch result: successes and failures, both in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub resized: Vec<ResizeOutcome>,
    pub failed: Vec<ResizeFailure>,
}

/// Shrink one oversized file under `target_bytes` in place.
///
/// At most [`fit::MAX_ATTEMPTS`] re-encodes, starting from
/// [`fit::initial_scale`] and decaying by [`fit::SCALE_DECAY`] after each
/// attempt that still exceeds the budget. Non-resizable formats fail
/// immediately with zero attempts.
pub fn resize_to_fit(
    encoder: &dyn ImageEncoder,
    path: &Path,
    original_bytes: u64,
    target_bytes: u64,
) -> Result<ResizeOutcome, ResizeError> {
    let ext = crate::scan::extension_of(path).unwrap_or_default();
    if !fit::is_resizable(&ext) {
        return Err(ResizeError::NotResizable);
    }

    let dims = encoder
        .identify(path)
        .map_err(|e| ResizeError::Undecodable(e.to_string()))?;

    let mut scale = fit::initial_scale(target_bytes, original_bytes);
    for _ in 0..fit::MAX_ATTEMPTS {
        let (width, height) = fit::scaled_dimensions(dims.width, dims.height, scale);
        let buffer = encoder
            .encode_scaled(path, width, height)
            .map_err(|e| ResizeError::Encoding(e.to_string()))?;

        if buffer.len() as u64 <= target_bytes {
            let new_size = buffer.len() as u64;
            // Single write of the finished buffer, so an interrupted run
            // never leaves a partially written image behind.
            fs::write(path, &buffer).map_err(|e| ResizeError::Encoding(e.to_string()))?;
            return Ok(ResizeOutcome {
                path: path.to_string_lossy().into_owned(),
                original_size: original_bytes,
                original_size_human: format_size(original_bytes),
                new_size,
                new_size_human: format_size(new_size),
            });
        }

        scale *= fit::SCALE_DECAY;
    }

    Err(ResizeError::BudgetExhausted(fit::MAX_ATTEMPTS))
}

/// Run the fit search over every violation, in input order.
///
/// Each file is independent; one failure never stops the batch. With no
/// encoder available the whole batch fails up front with a distinct reason
/// and no per-file attempts are made.
pub fn resize_all(
    encoder: Option<&dyn ImageEncoder>,
    violations: &[Violation],
    target_bytes: u64,
) -> BatchOutcome {
    let Some(encoder) = encoder else {
        let reason = ResizeError::EncoderUnavailable.to_string();
        return BatchOutcome {
            resized: Vec::new(),
            failed: violations.iter().map(|v| failure_for(v, &reason)).collect(),
        };
    };

    let mut outcome = BatchOutcome::default();
    for violation in violations {
        match resize_to_fit(
            encoder,
            Path::new(&violation.path),
            violation.size_bytes,
            target_bytes,
        ) {
            Ok(resized) => outcome.resized.push(resized),
            Err(e) => outcome.failed.push(failure_for(violation, &e.to_string())),
        }
    }
    outcome
}

fn failure_for(violation: &Violation, reason: &str) -> ResizeFailure {
    ResizeFailure {
        path: violation.path.clone(),
        size: violation.size_bytes,
        size_human: violation.size_human.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::encoder::Dimensions;
    use crate::resize::encoder::tests::{MockEncoder, RecordedOp};
    use std::fs;
    use tempfile::TempDir;

    fn violation(path: &str, size_bytes: u64) -> Violation {
        Violation {
            path: path.to_string(),
            size_bytes,
            size_human: format_size(size_bytes),
        }
    }

    fn temp_image(tmp: &TempDir, name: &str, len: usize) -> std::path::PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, vec![7u8; len]).unwrap();
        path
    }

    #[test]
    fn succeeds_on_first_fitting_attempt() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "photo.jpg", 4000);
        let encoder = MockEncoder::new(
            Dimensions {
                width: 1000,
                height: 750,
            },
            vec![900],
        );

        let outcome = resize_to_fit(&encoder, &path, 4000, 1000).unwrap();
        assert_eq!(outcome.original_size, 4000);
        assert_eq!(outcome.new_size, 900);
        assert!(outcome.new_size <= 1000);
        assert!(outcome.new_size < outcome.original_size);
        assert_eq!(encoder.encode_calls(), 1);
        // The file now holds the re-encoded buffer.
        assert_eq!(fs::metadata(&path).unwrap().len(), 900);
    }

    #[test]
    fn first_attempt_uses_sqrt_scale_with_margin() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "photo.jpg", 4000);
        let encoder = MockEncoder::new(
            Dimensions {
                width: 1000,
                height: 800,
            },
            vec![500],
        );

        resize_to_fit(&encoder, &path, 4000, 1000).unwrap();

        // sqrt(1000/4000) * 0.9 = 0.45 -> floor(1000*0.45) x floor(800*0.45)
        let ops = encoder.recorded();
        assert!(matches!(
            ops[1],
            RecordedOp::EncodeScaled {
                width: 450,
                height: 360
            }
        ));
    }

    #[test]
    fn retries_with_decaying_scale_until_fit() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "photo.jpg", 4000);
        // First two attempts miss the 1000-byte budget, third fits.
        let encoder = MockEncoder::new(
            Dimensions {
                width: 1000,
                height: 1000,
            },
            vec![1400, 1100, 950],
        );

        let outcome = resize_to_fit(&encoder, &path, 4000, 1000).unwrap();
        assert_eq!(outcome.new_size, 950);
        assert_eq!(encoder.encode_calls(), 3);

        // Each retry shrinks dimensions by the decay factor: 450, 405, 364.
        let widths: Vec<u32> = encoder
            .recorded()
            .iter()
            .filter_map(|op| match op {
                RecordedOp::EncodeScaled { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![450, 405, 364]);
    }

    #[test]
    fn budget_exhausted_after_five_attempts_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "photo.jpg", 4000);
        let original = fs::read(&path).unwrap();
        // Every attempt misses the budget.
        let encoder = MockEncoder::new(
            Dimensions {
                width: 1000,
                height: 1000,
            },
            vec![5000],
        );

        let result = resize_to_fit(&encoder, &path, 4000, 100);
        assert_eq!(result, Err(ResizeError::BudgetExhausted(5)));
        assert_eq!(encoder.encode_calls(), 5);
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn non_resizable_format_fails_with_zero_attempts() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "anim.gif", 4000);
        let original = fs::read(&path).unwrap();
        let encoder = MockEncoder::new(
            Dimensions {
                width: 100,
                height: 100,
            },
            vec![10],
        );

        let result = resize_to_fit(&encoder, &path, 4000, 1000);
        assert_eq!(result, Err(ResizeError::NotResizable));
        assert!(encoder.recorded().is_empty());
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn svg_is_rejected_like_gif() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "logo.svg", 4000);
        let encoder = MockEncoder::new(
            Dimensions {
                width: 100,
                height: 100,
            },
            vec![10],
        );
        assert_eq!(
            resize_to_fit(&encoder, &path, 4000, 1000),
            Err(ResizeError::NotResizable)
        );
    }

    #[test]
    fn undecodable_image_fails_before_any_encode() {
        let tmp = TempDir::new().unwrap();
        let path = temp_image(&tmp, "corrupt.jpg", 4000);
        let encoder = MockEncoder::undecodable();

        let result = resize_to_fit(&encoder, &path, 4000, 1000);
        assert!(matches!(result, Err(ResizeError::Undecodable(_))));
        assert_eq!(encoder.encode_calls(), 0);
    }

    #[test]
    fn batch_mixed_resizable_and_not() {
        let tmp = TempDir::new().unwrap();
        let jpeg = temp_image(&tmp, "photo.jpg", 200_000);
        let gif = temp_image(&tmp, "anim.gif", 200_000);
        let encoder = MockEncoder::new(
            Dimensions {
                width: 2000,
                height: 1500,
            },
            vec![40_000],
        );

        let violations = vec![
            violation(jpeg.to_str().unwrap(), 200_000),
            violation(gif.to_str().unwrap(), 200_000),
        ];
        let outcome = resize_all(Some(&encoder), &violations, 50 * 1024);

        assert_eq!(outcome.resized.len(), 1);
        assert!(outcome.resized[0].path.ends_with("photo.jpg"));
        assert!(outcome.resized[0].new_size <= 50 * 1024);
        assert_eq!(outcome.failed.len(), 1);
        assert!(outcome.failed[0].path.ends_with("anim.gif"));
        assert!(outcome.failed[0].reason.contains("not resizable"));
    }

    #[test]
    fn batch_preserves_input_order() {
        let tmp = TempDir::new().unwrap();
        let a = temp_image(&tmp, "a.gif", 100);
        let b = temp_image(&tmp, "b.gif", 100);
        let encoder = MockEncoder::new(
            Dimensions {
                width: 10,
                height: 10,
            },
            vec![10],
        );

        let violations = vec![
            violation(a.to_str().unwrap(), 100),
            violation(b.to_str().unwrap(), 100),
        ];
        let outcome = resize_all(Some(&encoder), &violations, 50);
        assert!(outcome.failed[0].path.ends_with("a.gif"));
        assert!(outcome.failed[1].path.ends_with("b.gif"));
    }

    #[test]
    fn missing_encoder_fails_whole_batch_without_attempts() {
        let violations = vec![violation("public/a.jpg", 100), violation("public/b.png", 100)];
        let outcome = resize_all(None, &violations, 50);

        assert!(outcome.resized.is_empty());
        assert_eq!(outcome.failed.len(), 2);
        for failure in &outcome.failed {
            assert!(failure.reason.contains("encoder"));
        }
    }
}
