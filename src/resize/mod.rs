//! In-place image shrinking.
//!
//! Given an oversized file and a byte budget, searches for a scale factor
//! that brings the re-encoded image under the budget:
//!
//! 1. Classify the format: only raster formats worth re-encoding enter the
//!    search ([`fit::is_resizable`]).
//! 2. Start from `sqrt(target / original)` of the linear dimensions, with a
//!    small margin ([`fit::initial_scale`]).
//! 3. Re-encode at shrinking scales until the buffer fits or the attempt
//!    budget ([`fit::MAX_ATTEMPTS`]) runs out.
//!
//! The module is split into:
//! - **fit**: pure scale math and format classification (unit testable)
//! - **encoder**: the [`ImageEncoder`] capability trait + mock
//! - **rust_encoder**: production [`RustEncoder`] (behind the `encoder` feature)
//! - **shrink**: the search loop and batch orchestration

pub mod encoder;
pub mod fit;
#[cfg(feature = "encoder")]
pub mod rust_encoder;
pub mod shrink;

pub use encoder::{Dimensions, EncoderError, ImageEncoder};
#[cfg(feature = "encoder")]
pub use rust_encoder::RustEncoder;
pub use shrink::{BatchOutcome, ResizeError, ResizeFailure, ResizeOutcome, resize_all, resize_to_fit};
