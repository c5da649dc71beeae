//! Core pipeline logic
//!
//! Sitemap rendering, the export coordinator and stale-artifact
//! reconciliation. Everything here is backend-agnostic and works through
//! the adapter traits.

pub mod export;
pub mod reconcile;
pub mod sitemap;

pub use export::{ExportCoordinator, RunSummary};
pub use reconcile::{ReconcileReport, Reconciler};
pub use sitemap::{Artifact, SitemapBuilder};
