//! Export pipeline

pub mod coordinator;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use summary::{RunError, RunSummary};
