// Sitemapper - Search Index to Sitemap Export Tool
// Copyright (c) 2025 Sitemapper Contributors
// Licensed under the MIT License

//! # Sitemapper - search index to sitemap export
//!
//! Sitemapper exports documents from an OpenSearch-compatible search index
//! into paginated sitemap XML artifacts in an object store, keeps the store
//! consistent with the index across runs, and notifies IndexNow receivers
//! of changed artifacts.
//!
//! ## Overview
//!
//! One run performs, per configured index:
//! - **Scan** the index with a server-side cursor, one page at a time
//! - **Render** each batch of active documents into a page artifact
//!   (`<index>_<page>.xml`)
//! - **Write** artifacts to the object store and record them in the run
//!   manifest
//! - **Reconcile** the store afterwards: delete artifacts no longer backed
//!   by the index and rebuild the root aggregate
//! - **Notify** IndexNow endpoints of every changed artifact, best-effort
//!
//! ## Architecture
//!
//! Sitemapper follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (sitemap rendering, export, reconciliation)
//! - [`adapters`] - External integrations (search index, object store,
//!   IndexNow)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitemapper::adapters::indexnow::NotificationDispatcher;
//! use sitemapper::adapters::search::HttpSearchClient;
//! use sitemapper::adapters::store::{ArtifactStore, InMemoryObjectStore};
//! use sitemapper::config::AppConfig;
//! use sitemapper::core::export::ExportCoordinator;
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_file("sitemapper.toml")?;
//!
//!     let backend = Arc::new(HttpSearchClient::new(&config.search)?);
//!     let store = Arc::new(ArtifactStore::new(
//!         Arc::new(InMemoryObjectStore::new()),
//!         config.store.prefix.clone(),
//!     ));
//!     let dispatcher = NotificationDispatcher::new(&config.notify)?;
//!     let (_tx, rx) = watch::channel(false);
//!
//!     let coordinator = ExportCoordinator::new(backend, store, dispatcher, &config, rx);
//!     let summary = coordinator.run().await?;
//!
//!     println!("Wrote {} page artifacts", summary.pages_written);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

pub use domain::{Result, SitemapperError};
