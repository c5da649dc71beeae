//! Search index adapter
//!
//! Backend trait, HTTP client, cursor-based scans and retrying bulk writes.

pub mod backend;
pub mod bulk;
pub mod client;
pub mod models;
pub mod scan;

pub use backend::SearchBackend;
pub use bulk::{BulkReport, BulkWriter};
pub use client::HttpSearchClient;
pub use models::{BulkOutcome, ScanFilter, ScanPage, ScanQuery, WriteOp};
pub use scan::{Scan, ScanReader};
