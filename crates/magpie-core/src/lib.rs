//! Core download machinery for Magpie: fetching images, tracking task
//! progress, building ZIP archives, and sweeping expired state.

pub mod archive;
pub mod engine;
pub mod fetch;
pub mod janitor;
pub mod registry;

pub use archive::{ArchiveStore, ZipBuilder};
pub use engine::{DownloadEngine, progress_percent};
pub use fetch::{FetchError, FetchedBody, HttpFetcher, ImageFetcher};
pub use janitor::spawn_cleanup_task;
pub use registry::{TaskRegistry, snapshot_stream};
