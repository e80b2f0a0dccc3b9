//! Pure scale-factor math for the fit search.
//!
//! All functions here are pure and testable without any I/O or images.

/// Maximum re-encode attempts before declaring failure for one file.
pub const MAX_ATTEMPTS: u32 = 5;

/// Linear scale multiplier applied between attempts.
pub const SCALE_DECAY: f64 = 0.9;

/// Headroom applied to the first attempt's scale. Compression ratio is not
/// perfectly linear in pixel area, so the first attempt undershoots slightly
/// rather than landing exactly on the predicted size.
pub const INITIAL_MARGIN: f64 = 0.9;

/// Formats the fit search can meaningfully re-encode.
///
/// SVG, GIF, BMP, and ICO are excluded up front: re-encoding them either
/// loses required semantics (vector fidelity, animation) or buys nothing
/// for indexed icon formats.
const RESIZABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tiff", "avif"];

/// Whether a file extension names a re-encodable raster format.
pub fn is_resizable(ext: &str) -> bool {
    RESIZABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Initial linear scale factor for shrinking `original_bytes` under
/// `target_bytes`.
///
/// Encoded byte size tracks pixel area (width x height), so shrinking bytes
/// by a factor F means shrinking each linear dimension by sqrt(F).
pub fn initial_scale(target_bytes: u64, original_bytes: u64) -> f64 {
    (target_bytes as f64 / original_bytes as f64).sqrt() * INITIAL_MARGIN
}

/// Integer dimensions for one attempt at the given scale, floored, with a
/// floor of 1px per axis so a tiny budget never produces a zero dimension.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let w = ((width as f64) * scale).floor() as u32;
    let h = ((height as f64) * scale).floor() as u32;
    (w.max(1), h.max(1))
}
