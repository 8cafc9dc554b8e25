// Main library module for Magpie - a login-protected batch image downloader
// serving live progress over SSE and finished batches as ZIP archives

// Module declarations
pub mod api; // HTTP endpoint handlers
pub mod auth; // Session tokens and password checks
pub mod metrics; // Metrics and observability
pub mod middleware; // HTTP middleware
pub mod model; // Configuration and shared state
pub mod startup; // Application startup utilities
pub mod ui; // Embedded UI pages

pub use model::{AppState, Configuration};
