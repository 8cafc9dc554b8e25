// Metrics module for observability
// Registers descriptions for the counters, gauges and histograms the
// engine and janitor emit

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Initialize all metric descriptions
/// Should be called once at application startup
pub fn init_metrics() {
    // Task metrics
    describe_counter!("magpie_tasks_started_total", "Total number of download tasks started");
    describe_gauge!("magpie_active_tasks", "Number of download tasks currently running");
    describe_histogram!(
        "magpie_task_duration_seconds",
        "Download task duration in seconds"
    );

    // Per-image metrics
    describe_counter!(
        "magpie_images_downloaded_total",
        "Total number of images downloaded and archived"
    );
    describe_counter!(
        "magpie_images_failed_total",
        "Total number of images that failed to download or archive"
    );

    // Janitor metrics
    describe_counter!(
        "magpie_archives_cleaned_total",
        "Total number of expired archive files deleted"
    );

    tracing::info!("Metrics initialized");
}
