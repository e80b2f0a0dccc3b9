//! Image re-encoding capability trait and shared types.
//!
//! The fit search talks to an [`ImageEncoder`] rather than an image library
//! directly, for two reasons:
//!
//! - the search loop can be unit tested against a recording mock that scripts
//!   the buffer size of each attempt, and
//! - re-encoding support is an optional capability. A build without the
//!   `encoder` feature passes `None` where an encoder is expected and the
//!   batch reports a capability gap instead of crashing.
//!
//! The production implementation is
//! [`RustEncoder`](super::rust_encoder::RustEncoder).

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    #[error("encode failed: {0}")]
    EncodeFailed(String),
}

/// Pixel dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Capability interface for reading and re-encoding raster images.
///
/// Object-safe on purpose: the orchestration layer passes
/// `Option<&dyn ImageEncoder>` so "no encoder compiled in" is an ordinary
/// value, not a compile-time dead end.
pub trait ImageEncoder {
    /// Read pixel dimensions, without a full decode where the format allows.
    fn identify(&self, path: &Path) -> Result<Dimensions, EncoderError>;

    /// Decode `path`, resize to exactly `width` x `height` with a
    /// high-quality filter, and re-encode in the source file's own format to
    /// an in-memory buffer. Never writes to disk.
    fn encode_scaled(&self, path: &Path, width: u32, height: u32)
    -> Result<Vec<u8>, EncoderError>;
}
