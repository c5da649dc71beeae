//! Sitemap XML rendering
//!
//! Renders three artifact kinds: page sitemaps (`<urlset>` of document
//! URLs), the root aggregate (`<sitemapindex>` over all page artifacts) and
//! the per-index counts summary.

use super::artifact::{page_name, root_order_key, Artifact};
use crate::config::SitemapConfig;
use crate::domain::{Batch, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use tracing::debug;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Renders sitemap artifacts from document batches
pub struct SitemapBuilder {
    site_base: String,
    changefreq: String,
    priority: String,
}

impl SitemapBuilder {
    pub fn new(config: &SitemapConfig) -> Self {
        Self {
            site_base: config.site_base_url.trim_end_matches('/').to_string(),
            changefreq: config.changefreq.clone(),
            priority: config.priority.clone(),
        }
    }

    /// Public URL of a document
    pub fn doc_url(&self, id: &str) -> String {
        format!("{}/postid/{}", self.site_base, id)
    }

    /// Public URL of a stored artifact
    pub fn artifact_url(&self, name: &str) -> String {
        format!("{}/api/sitemap/{}", self.site_base, name)
    }

    /// Render one page artifact from a batch
    ///
    /// Inactive documents are filtered out; a batch with no active documents
    /// produces no artifact, leaving a gap at that page number.
    ///
    /// # Errors
    ///
    /// Returns a `Render` error if XML serialization fails.
    pub fn render_page(
        &self,
        index: &str,
        page: usize,
        batch: &Batch,
        now: DateTime<Utc>,
    ) -> Result<Option<Artifact>> {
        let active: Vec<_> = batch.iter().filter(|doc| doc.is_active()).collect();
        if active.is_empty() {
            debug!(index = index, "Batch had no active documents, skipping page");
            return Ok(None);
        }

        let mut writer = xml_writer();
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element("urlset")
            .with_attribute(("xmlns", SITEMAP_NS))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                for doc in &active {
                    let loc = self.doc_url(&doc.id);
                    let lastmod = format_lastmod(doc.last_modified(now));
                    w.create_element("url").write_inner_content(|w| -> quick_xml::Result<()> {
                        w.create_element("loc")
                            .write_text_content(BytesText::new(&loc))?;
                        w.create_element("lastmod")
                            .write_text_content(BytesText::new(&lastmod))?;
                        w.create_element("changefreq")
                            .write_text_content(BytesText::new(&self.changefreq))?;
                        w.create_element("priority")
                            .write_text_content(BytesText::new(&self.priority))?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;

        let name = page_name(index, page);
        debug!(
            artifact = %name,
            entries = active.len(),
            "Rendered page artifact"
        );
        Ok(Some(Artifact::new(name, writer.into_inner())))
    }

    /// Render the root aggregate over the given page artifact names
    ///
    /// Entries are ordered by numeric page suffix ascending; names without a
    /// numeric suffix come last, ties broken by name.
    ///
    /// # Errors
    ///
    /// Returns a `Render` error if XML serialization fails.
    pub fn render_root(
        &self,
        root_name: &str,
        pages: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Result<Artifact> {
        let mut ordered: Vec<&String> = pages.iter().collect();
        ordered.sort_by_key(|name| root_order_key(name));

        let lastmod = format_lastmod(now);
        let mut writer = xml_writer();
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element("sitemapindex")
            .with_attribute(("xmlns", SITEMAP_NS))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                for name in &ordered {
                    let loc = self.artifact_url(name);
                    w.create_element("sitemap").write_inner_content(|w| -> quick_xml::Result<()> {
                        w.create_element("loc")
                            .write_text_content(BytesText::new(&loc))?;
                        w.create_element("lastmod")
                            .write_text_content(BytesText::new(&lastmod))?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;

        debug!(artifact = root_name, entries = ordered.len(), "Rendered root aggregate");
        Ok(Artifact::new(root_name, writer.into_inner()))
    }

    /// Render the per-index document counts summary
    ///
    /// # Errors
    ///
    /// Returns a `Render` error if XML serialization fails.
    pub fn render_counts(
        &self,
        counts_name: &str,
        counts: &[(String, u64)],
        now: DateTime<Utc>,
    ) -> Result<Artifact> {
        let generated = format_lastmod(now);
        let mut writer = xml_writer();
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element("indexcounts")
            .with_attribute(("generated", generated.as_str()))
            .write_inner_content(|w| -> quick_xml::Result<()> {
                for (index, count) in counts {
                    w.create_element("index")
                        .with_attribute(("name", index.as_str()))
                        .write_text_content(BytesText::new(&count.to_string()))?;
                }
                Ok(())
            })?;

        Ok(Artifact::new(counts_name, writer.into_inner()))
    }
}

fn xml_writer() -> Writer<Vec<u8>> {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

fn format_lastmod(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
