//! Configuration management for the Magpie server
//!
//! Settings are resolved from `conf/application.yml` (optional), then the
//! environment, then command line flags. The server boots with defaults
//! when none of these are present.

use clap::Parser;
use config::{Config, Environment};

use super::constants::{
    APP_PASSWORD_PROPERTY, APP_USERNAME_PROPERTY, CLEANUP_INTERVAL_PROPERTY,
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_TASKS,
    DEFAULT_MAX_URLS_PER_TASK, DEFAULT_PASSWORD, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT, DEFAULT_SERVER_WORKERS, DEFAULT_TMP_DIR,
    DEFAULT_TOKEN_TTL_SECONDS, DEFAULT_USERNAME, DEFAULT_ZIP_TTL_SECONDS,
    DOWNLOAD_TIMEOUT_PROPERTY, MAX_CONCURRENT_TASKS_PROPERTY, MAX_URLS_PER_TASK_PROPERTY,
    REQUEST_TIMEOUT_PROPERTY, SECRET_KEY_PROPERTY, SERVER_ADDRESS_PROPERTY, SERVER_PORT_PROPERTY,
    SERVER_WORKERS_PROPERTY, TMP_DIR_PROPERTY, TOKEN_TTL_PROPERTY, ZIP_TTL_PROPERTY,
};

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "address")]
    address: Option<String>,
    #[arg(long = "tmp-dir")]
    tmp_dir: Option<String>,
    #[arg(long = "workers")]
    workers: Option<usize>,
}

/// Application configuration loaded from config file, environment and CLI
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(config::File::with_name("conf/application.yml").required(false))
            .add_source(Environment::default().try_parsing(true));

        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override(SERVER_PORT_PROPERTY, v as i64)
                .expect("Failed to set port override");
        }
        if let Some(v) = args.address {
            config_builder = config_builder
                .set_override(SERVER_ADDRESS_PROPERTY, v)
                .expect("Failed to set address override");
        }
        if let Some(v) = args.tmp_dir {
            config_builder = config_builder
                .set_override(TMP_DIR_PROPERTY, v)
                .expect("Failed to set tmp dir override");
        }
        if let Some(v) = args.workers {
            config_builder = config_builder
                .set_override(SERVER_WORKERS_PROPERTY, v as i64)
                .expect("Failed to set workers override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config: app_config }
    }

    /// Wrap an already built `Config`.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    pub fn server_workers(&self) -> usize {
        self.config
            .get_int(SERVER_WORKERS_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_WORKERS as i64) as usize
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.config
            .get_int(REQUEST_TIMEOUT_PROPERTY)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS as i64) as u64
    }

    // ========================================================================
    // Download Configuration
    // ========================================================================

    pub fn tmp_dir(&self) -> String {
        self.config
            .get_string(TMP_DIR_PROPERTY)
            .unwrap_or(DEFAULT_TMP_DIR.to_string())
    }

    pub fn zip_ttl_seconds(&self) -> u64 {
        self.config
            .get_int(ZIP_TTL_PROPERTY)
            .unwrap_or(DEFAULT_ZIP_TTL_SECONDS as i64) as u64
    }

    pub fn cleanup_interval_secs(&self) -> u64 {
        self.config
            .get_int(CLEANUP_INTERVAL_PROPERTY)
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS as i64) as u64
    }

    pub fn download_timeout_secs(&self) -> u64 {
        self.config
            .get_int(DOWNLOAD_TIMEOUT_PROPERTY)
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS as i64) as u64
    }

    pub fn max_concurrent_tasks(&self) -> usize {
        self.config
            .get_int(MAX_CONCURRENT_TASKS_PROPERTY)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_TASKS as i64) as usize
    }

    pub fn max_urls_per_task(&self) -> usize {
        self.config
            .get_int(MAX_URLS_PER_TASK_PROPERTY)
            .unwrap_or(DEFAULT_MAX_URLS_PER_TASK as i64) as usize
    }

    // ========================================================================
    // Authentication Configuration
    // ========================================================================

    pub fn app_username(&self) -> String {
        self.config
            .get_string(APP_USERNAME_PROPERTY)
            .unwrap_or(DEFAULT_USERNAME.to_string())
    }

    pub fn app_password(&self) -> String {
        self.config
            .get_string(APP_PASSWORD_PROPERTY)
            .unwrap_or(DEFAULT_PASSWORD.to_string())
    }

    /// Configured token signing secret, if any.
    pub fn token_secret_key(&self) -> Option<String> {
        self.config.get_string(SECRET_KEY_PROPERTY).ok()
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.config
            .get_int(TOKEN_TTL_PROPERTY)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS)
    }

    /// Whether both credentials are still the shipped defaults.
    pub fn uses_default_credentials(&self) -> bool {
        self.app_username() == DEFAULT_USERNAME && self.app_password() == DEFAULT_PASSWORD
    }
}
