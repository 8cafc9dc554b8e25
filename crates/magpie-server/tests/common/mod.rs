//! Shared helpers for HTTP flow tests.
//!
//! Not every binary uses every helper.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};

use magpie_core::{FetchError, FetchedBody, ImageFetcher};
use magpie_server::model::{AppState, Configuration};

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "magpie-test-password";
pub const TEST_SECRET: &str = "dGVzdC1zZWNyZXQta2V5LWZvci1tYWdwaWU=";

/// Maximum batch size configured for test states.
pub const TEST_MAX_URLS: usize = 4;

/// Serves deterministic bytes for any URL that does not contain "fail";
/// everything else errors.
pub struct StubFetcher;

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, FetchError> {
        if url.contains("fail") {
            return Err(FetchError::Failed(format!("unreachable url {}", url)));
        }

        let payload = Bytes::from(format!("bytes of {}", url));
        Ok(FetchedBody {
            total: Some(payload.len() as u64),
            stream: stream::iter(vec![Ok(payload)]).boxed(),
        })
    }
}

/// Builds application state backed by a temp archive dir and the stub fetcher.
pub fn build_state(tmp_dir: &Path) -> Arc<AppState> {
    let config = config::Config::builder()
        .set_override("tmp_dir", tmp_dir.to_str().unwrap())
        .unwrap()
        .set_override("app_username", TEST_USERNAME)
        .unwrap()
        .set_override("app_password", TEST_PASSWORD)
        .unwrap()
        .set_override("secret_key", TEST_SECRET)
        .unwrap()
        .set_override("max_urls_per_task", TEST_MAX_URLS as i64)
        .unwrap()
        .build()
        .unwrap();

    AppState::build(Configuration::from_config(config), Arc::new(StubFetcher)).unwrap()
}
