//! Wire models and request validation for the Magpie HTTP API.

pub mod model;
pub mod validation;

pub use model::{
    ApiError, DownloadItem, DownloadStatus, LoginForm, LoginResult, StartTaskRequest,
    StartTaskResponse, TaskSnapshot,
};
pub use validation::{parse_url_list, validate_password, validate_url_batch, validate_username};
