//! Default values and configuration keys for the Magpie server.

// ============================================================================
// Server Defaults
// ============================================================================

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 5000;
pub const DEFAULT_SERVER_WORKERS: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Download Defaults
// ============================================================================

pub const DEFAULT_TMP_DIR: &str = "tmp_zip";
pub const DEFAULT_ZIP_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 4;
pub const DEFAULT_MAX_URLS_PER_TASK: usize = 200;

// ============================================================================
// Auth Defaults
// ============================================================================

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "password";
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 18000;

// ============================================================================
// Configuration Keys
// ============================================================================

// Keys are flat so they line up one-to-one with the environment variable
// contract (PORT, TMP_DIR, APP_USERNAME, ...).
pub const SERVER_ADDRESS_PROPERTY: &str = "server_address";
pub const SERVER_PORT_PROPERTY: &str = "port";
pub const SERVER_WORKERS_PROPERTY: &str = "server_workers";
pub const REQUEST_TIMEOUT_PROPERTY: &str = "request_timeout_secs";

pub const TMP_DIR_PROPERTY: &str = "tmp_dir";
pub const ZIP_TTL_PROPERTY: &str = "zip_ttl_seconds";
pub const CLEANUP_INTERVAL_PROPERTY: &str = "cleanup_interval";
pub const DOWNLOAD_TIMEOUT_PROPERTY: &str = "download_timeout";
pub const MAX_CONCURRENT_TASKS_PROPERTY: &str = "max_concurrent_tasks";
pub const MAX_URLS_PER_TASK_PROPERTY: &str = "max_urls_per_task";

pub const APP_USERNAME_PROPERTY: &str = "app_username";
pub const APP_PASSWORD_PROPERTY: &str = "app_password";
pub const SECRET_KEY_PROPERTY: &str = "secret_key";
pub const TOKEN_TTL_PROPERTY: &str = "token_ttl_seconds";
