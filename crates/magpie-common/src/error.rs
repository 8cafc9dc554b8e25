//! Error types and error codes for Magpie
//!
//! This module defines:
//! - `MagpieError`: Application-specific error enum
//! - `ErrorCode`: Structured error codes and messages for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
///
/// Download failures are data (`DownloadStatus::Failed`), not errors, and
/// request validation has its own codes; this enum covers the archive and
/// filesystem paths shared between the core and the server.
#[derive(thiserror::Error, Debug)]
pub enum MagpieError {
    #[error("archive error: {0}")]
    ArchiveError(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const PARAMETER_MISSING: ErrorCode<'static> = ErrorCode {
    code: 10000,
    message: "parameter missing",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

// Task lifecycle errors
pub const TASK_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20001,
    message: "task not found",
};

pub const NO_URLS: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "no urls provided",
};

pub const OVER_URL_QUOTA: ErrorCode<'static> = ErrorCode {
    code: 20003,
    message: "too many urls",
};

pub const ARCHIVE_NOT_READY: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "archive not ready",
};

pub const URL_TOO_LONG: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "url too long",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
