//! Periodic cleanup of expired archives and finished tasks.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::archive::ArchiveStore;
use crate::registry::TaskRegistry;

/// Spawn the periodic cleanup task.
///
/// Every `period`, starting immediately, expired archives are deleted from
/// disk and finished tasks older than `ttl` are evicted from the registry.
/// The task exits when `shutdown` fires or its sender is dropped.
pub fn spawn_cleanup_task(
    store: ArchiveStore,
    registry: Arc<TaskRegistry>,
    ttl: Duration,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    // interval() panics on a zero period
    let period = period.max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.remove_expired(ttl).await;
                    if removed > 0 {
                        counter!("magpie_archives_cleaned_total").increment(removed as u64);
                    }
                    let evicted = registry.evict_finished(ttl);
                    if removed > 0 || evicted > 0 {
                        debug!(
                            "cleanup removed {} archives and {} finished tasks",
                            removed, evicted
                        );
                    }
                }
                _ = shutdown.recv() => {
                    debug!("cleanup task stopping");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_sweeps_immediately_and_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let registry = Arc::new(TaskRegistry::new());

        let stale = dir.path().join("stale.zip");
        tokio::fs::write(&stale, b"old archive").await.unwrap();
        let finished = registry.create();
        registry.finish(finished);

        // Let both the file mtime and the finish timestamp age past zero.
        std::thread::sleep(Duration::from_millis(30));

        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = spawn_cleanup_task(
            store,
            registry.clone(),
            Duration::ZERO,
            Duration::from_secs(60),
            shutdown_tx.subscribe(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!stale.exists());
        assert!(registry.is_empty());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_keeps_fresh_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let registry = Arc::new(TaskRegistry::new());

        let fresh = dir.path().join("fresh.zip");
        tokio::fs::write(&fresh, b"new archive").await.unwrap();
        let running = registry.create();

        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = spawn_cleanup_task(
            store,
            registry.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(60),
            shutdown_tx.subscribe(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(fresh.exists());
        assert!(registry.subscribe(running).is_some());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_exits_when_sender_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_cleanup_task(
            ArchiveStore::new(dir.path()),
            Arc::new(TaskRegistry::new()),
            Duration::from_secs(3600),
            Duration::from_secs(60),
            shutdown_rx,
        );

        drop(shutdown_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
