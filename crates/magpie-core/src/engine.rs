//! Batch download engine.
//!
//! A batch downloads its URLs sequentially, publishing a fresh snapshot to
//! the registry whenever an item's visible state changes. Failures are
//! isolated per item; the batch always runs to the end and always publishes
//! a terminal snapshot with `done` set.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use magpie_api::{DownloadItem, DownloadStatus, TaskSnapshot};
use magpie_common::{filename_from_url, unique_name};
use metrics::{counter, gauge, histogram};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::archive::{ArchiveStore, ZipBuilder};
use crate::fetch::{FetchError, FetchedBody, ImageFetcher};
use crate::registry::TaskRegistry;

/// Integer progress for a partially downloaded body.
///
/// Without a usable total the progress reports 100, so downloads with no
/// Content-Length do not look stalled while bytes are flowing.
pub fn progress_percent(downloaded: u64, total: Option<u64>) -> u8 {
    match total {
        Some(total) if total > 0 => (downloaded.saturating_mul(100) / total).min(100) as u8,
        _ => 100,
    }
}

/// Spawns and supervises batch download tasks.
pub struct DownloadEngine {
    fetcher: Arc<dyn ImageFetcher>,
    registry: Arc<TaskRegistry>,
    store: ArchiveStore,
    limiter: Arc<Semaphore>,
}

impl DownloadEngine {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        registry: Arc<TaskRegistry>,
        store: ArchiveStore,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetcher,
            registry,
            store,
            // at least one batch must be able to run
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Queue a batch download and return its task id.
    ///
    /// The batch runs on a background task and its progress is observable
    /// through the registry as soon as this returns. Batches beyond the
    /// concurrency cap keep an empty snapshot until a permit frees up.
    pub fn start(&self, urls: Vec<String>) -> Uuid {
        let id = self.registry.create();
        counter!("magpie_tasks_started_total").increment(1);

        let fetcher = self.fetcher.clone();
        let registry = self.registry.clone();
        let store = self.store.clone();
        let limiter = self.limiter.clone();

        tokio::spawn(async move {
            // The semaphore is never closed.
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };

            gauge!("magpie_active_tasks").increment(1.0);
            let started = Instant::now();
            info!("task {} starting, {} urls", id, urls.len());

            run_batch(id, &urls, fetcher.as_ref(), &registry, &store).await;
            registry.finish(id);

            gauge!("magpie_active_tasks").decrement(1.0);
            histogram!("magpie_task_duration_seconds").record(started.elapsed().as_secs_f64());
            info!("task {} finished in {:?}", id, started.elapsed());
        });

        id
    }
}

async fn run_batch(
    id: Uuid,
    urls: &[String],
    fetcher: &dyn ImageFetcher,
    registry: &TaskRegistry,
    store: &ArchiveStore,
) {
    let mut items: Vec<DownloadItem> = Vec::with_capacity(urls.len());
    let mut taken: HashSet<String> = HashSet::with_capacity(urls.len());
    let mut zip = ZipBuilder::new();

    for url in urls {
        let name = unique_name(&filename_from_url(url), &taken);
        taken.insert(name.clone());

        items.push(DownloadItem::pending(name.clone()));
        let index = items.len() - 1;
        registry.publish(
            id,
            TaskSnapshot {
                items: items.clone(),
                done: false,
            },
        );

        let outcome = match download_one(fetcher, url, id, registry, &mut items, index).await {
            Ok(body) => zip.add_file(&name, &body).map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };
        match outcome {
            Ok(()) => {
                items[index].status = DownloadStatus::Done;
                items[index].progress = 100;
                counter!("magpie_images_downloaded_total").increment(1);
            }
            Err(reason) => {
                warn!("task {} could not download {}: {}", id, url, reason);
                items[index].status = DownloadStatus::Failed(reason);
                items[index].progress = 100;
                counter!("magpie_images_failed_total").increment(1);
            }
        }
        registry.publish(
            id,
            TaskSnapshot {
                items: items.clone(),
                done: false,
            },
        );
    }

    match zip.finish() {
        Ok(data) => {
            if let Err(err) = store.write(id, data).await {
                error!("task {} could not persist archive: {}", id, err);
            }
        }
        Err(err) => error!("task {} could not finalize archive: {}", id, err),
    }

    // Terminal snapshot goes out even when persisting failed, otherwise
    // subscribers would wait forever on a task that can no longer change.
    registry.publish(id, TaskSnapshot { items, done: true });
}

/// Download one URL to completion, publishing a snapshot whenever the
/// integer percentage moves.
async fn download_one(
    fetcher: &dyn ImageFetcher,
    url: &str,
    id: Uuid,
    registry: &TaskRegistry,
    items: &mut [DownloadItem],
    index: usize,
) -> Result<Vec<u8>, FetchError> {
    let FetchedBody { total, mut stream } = fetcher.fetch(url).await?;

    let mut body: Vec<u8> = Vec::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        downloaded += chunk.len() as u64;
        body.extend_from_slice(&chunk);

        let percent = progress_percent(downloaded, total);
        if percent != items[index].progress {
            items[index].progress = percent;
            registry.publish(
                id,
                TaskSnapshot {
                    items: items.to_vec(),
                    done: false,
                },
            );
        }
    }

    Ok(body)
}
