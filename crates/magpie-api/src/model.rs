//! Wire models for the Magpie HTTP API
//!
//! These shapes are the JSON contract between the server, the embedded web
//! UI, and API clients. Field names are part of that contract.

use serde::{Deserialize, Serialize};

/// Request body for `POST /start`: a newline-separated list of image URLs.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StartTaskRequest {
    pub urls: String,
}

/// Response body for `POST /start`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StartTaskResponse {
    pub task_id: String,
}

/// JSON error body used by all API endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// State of a single download within a task.
///
/// Serialized as a display string: `"downloading"`, `"done"`, or
/// `"failed: <reason>"`. The web UI dispatches on the `done`/`failed`
/// prefixes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(into = "String", try_from = "String")]
pub enum DownloadStatus {
    Downloading,
    Done,
    Failed(String),
}

const FAILED_PREFIX: &str = "failed: ";

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStatus::Downloading => write!(f, "downloading"),
            DownloadStatus::Done => write!(f, "done"),
            DownloadStatus::Failed(reason) => write!(f, "{}{}", FAILED_PREFIX, reason),
        }
    }
}

impl From<DownloadStatus> for String {
    fn from(status: DownloadStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for DownloadStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "downloading" => Ok(DownloadStatus::Downloading),
            "done" => Ok(DownloadStatus::Done),
            s => match s.strip_prefix(FAILED_PREFIX) {
                Some(reason) => Ok(DownloadStatus::Failed(reason.to_string())),
                None => Err(format!("unknown download status: {}", s)),
            },
        }
    }
}

/// Per-image progress entry inside a [`TaskSnapshot`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DownloadItem {
    pub name: String,
    pub status: DownloadStatus,
    pub progress: u8,
}

impl DownloadItem {
    /// New entry for a download that is about to begin.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DownloadStatus::Downloading,
            progress: 0,
        }
    }
}

/// Full state of a download task, pushed to subscribers on every change.
///
/// `done` flips to `true` exactly once, after the archive has been written.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TaskSnapshot {
    pub items: Vec<DownloadItem>,
    pub done: bool,
}

/// Response body for `POST /login` when the client asks for JSON.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub access_token: String,
    pub token_ttl: i64,
    pub username: String,
}

/// Form body for `POST /login`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub next: Option<String>,
}
