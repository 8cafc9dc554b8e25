//! ZIP assembly and the on-disk archive store.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use magpie_common::MagpieError;
use tracing::{debug, warn};
use uuid::Uuid;
use zip::{ZipWriter, write::SimpleFileOptions};

/// Incrementally builds a ZIP archive in memory.
///
/// Entries are only added once their bytes are complete, so a failed
/// download never leaves a truncated file in the archive.
pub struct ZipBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ZipBuilder {
    pub fn new() -> Self {
        let zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        Self { zip, options }
    }

    /// Append one fully downloaded image under `name`.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<(), MagpieError> {
        self.zip
            .start_file(name, self.options)
            .map_err(|err| MagpieError::ArchiveError(err.to_string()))?;
        self.zip.write_all(data)?;
        Ok(())
    }

    /// Finalize the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, MagpieError> {
        let cursor = self
            .zip
            .finish()
            .map_err(|err| MagpieError::ArchiveError(err.to_string()))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Filesystem store for finished archives, one `<task_id>.zip` per task.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
}

impl ArchiveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the archive directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), MagpieError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Path of the archive belonging to `id`.
    pub fn archive_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.zip", id))
    }

    /// Persist finished archive bytes for `id`.
    pub async fn write(&self, id: Uuid, data: Vec<u8>) -> Result<(), MagpieError> {
        tokio::fs::write(self.archive_path(id), data).await?;
        Ok(())
    }

    /// Read the finished archive for `id`, or `None` if it was never
    /// written or has already been swept.
    pub async fn read(&self, id: Uuid) -> Result<Option<Vec<u8>>, MagpieError> {
        match tokio::fs::read(self.archive_path(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete every regular file in the archive directory older than `ttl`.
    ///
    /// The sweep covers all files, not just archives this process wrote, so
    /// leftovers from previous runs are reclaimed as well. Per-file failures
    /// are logged and skipped. Returns the number of files removed.
    pub async fn remove_expired(&self, ttl: Duration) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "archive sweep could not read {}: {}",
                    self.dir.display(),
                    err
                );
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("archive sweep interrupted: {}", err);
                    break;
                }
            };

            let path = entry.path();
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };

            let age = now.duration_since(modified).unwrap_or_default();
            if age > ttl {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        debug!("removed expired archive {}", path.display());
                        removed += 1;
                    }
                    Err(err) => warn!("could not remove {}: {}", path.display(), err),
                }
            }
        }

        removed
    }
}
