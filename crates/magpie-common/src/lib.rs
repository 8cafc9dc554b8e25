//! Common types and utilities shared across Magpie crates
//!
//! # Module Structure
//!
//! - `error` - Error types and API error codes
//! - `filename` - URL-to-filename derivation and collision handling

pub mod error;
pub mod filename;

pub use error::{ErrorCode, MagpieError};
pub use filename::{
    FALLBACK_FILENAME, MAX_FILENAME_LEN, filename_from_url, sanitize_filename, unique_name,
};
