//! HTTP body helpers.
//!
//! This module provides:
//! - Multipart form building for the reqwest transport
//! - File uploads read from disk

mod multipart;

pub use multipart::{FilePartError, build_form, file_part};
