pub mod batch;
pub mod core;
pub mod edgar;
pub mod error;
pub mod mapping;
pub mod reconcile;
pub mod reporting;
pub mod upload;
pub mod utils;

// Re-exports
pub use batch::{
    BatchObserver, BatchProcessor, BatchProgress, BatchResult, BatchStatus, StopSignal,
};
pub use crate::core::config::DisclosureConfig;
pub use error::DisclosureError;
pub use reconcile::{ReconcileConfig, ReconciledRow, RunMode};
pub use utils::progress::ProgressTracker;
