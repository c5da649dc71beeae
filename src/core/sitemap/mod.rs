//! Sitemap artifact model and XML rendering

pub mod artifact;
pub mod builder;

pub use artifact::{page_name, page_number, Artifact};
pub use builder::SitemapBuilder;
