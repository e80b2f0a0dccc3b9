//! # image-guard
//!
//! An image size gate for Git pre-push hooks. Scans configured directories
//! for image files, flags any exceeding a size limit, and in resize mode
//! shrinks oversized images in place until they fit.
//!
//! # Architecture: Two Cooperating Components
//!
//! ```text
//! 1. Scan     policy  →  ScanResult      (walk, filter, measure, classify)
//! 2. Resize   violations → outcomes      (bounded search for a fitting scale)
//! ```
//!
//! The scanner is a pure function of (policy, filesystem state). The resizer
//! is the only writer, and it only ever overwrites a file after a complete
//! re-encode has succeeded in memory and come in under the byte budget, so an
//! interrupted run never corrupts an image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `image-guard.toml` loading, CLI merge, [`config::Policy`] resolution |
//! | [`units`] | human-readable size parsing and formatting ("1MB" ↔ bytes) |
//! | [`scan`] | directory walk, extension filter, violation detection |
//! | [`resize`] | iterative fit search + the [`resize::ImageEncoder`] capability |
//! | [`check`] | orchestration: scan → optional resize → [`check::CheckReport`] |
//! | [`output`] | text rendering of check results |
//!
//! # Design Decisions
//!
//! ## Re-Encoding Is a Capability, Not a Given
//!
//! The resize search talks to the [`resize::ImageEncoder`] trait. The
//! production implementation (the `image` crate plus a pure-Rust AVIF
//! decoder) sits behind the `encoder` cargo feature; a build without it
//! still scans and blocks, and resize mode reports the missing capability
//! per file instead of failing to start. This keeps the hook's core promise
//! independent of the heavyweight codec stack.
//!
//! ## Dimensions Over Compression
//!
//! Encoded byte size tracks pixel area, so the search shrinks dimensions
//! (by `sqrt(target/original)` per axis, with retries) while keeping
//! per-format quality near-lossless. Recompressing harder would trade
//! visible quality for marginal savings; scaling trades invisible pixels.
//!
//! ## One Failure Never Blocks the Rest
//!
//! A file that cannot be read mid-scan is skipped; an image that cannot be
//! decoded or shrunk fails alone and the batch continues. The only hard
//! errors are a malformed config file and programmer mistakes: a pre-push
//! hook that dies on one transient problem trains people to bypass it.

pub mod check;
pub mod config;
pub mod output;
pub mod resize;
pub mod scan;
pub mod units;
