//! Sitemap artifacts and their naming scheme
//!
//! Page artifacts are named `<index>_<page>.xml` with 1-based page numbers.
//! The root aggregate and the counts artifact have fixed configured names
//! and never participate in page numbering.

/// A rendered artifact ready for the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Bare artifact name, e.g. `jobs_idx_3.xml`
    pub name: String,

    /// Rendered XML bytes
    pub content: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Artifact name for page `page` of `index`
pub fn page_name(index: &str, page: usize) -> String {
    format!("{index}_{page}.xml")
}

/// Numeric page suffix of an artifact name, if it has one
///
/// `jobs_idx_12.xml` yields 12; names without a `_<digits>.xml` tail yield
/// `None` and sort after numbered pages in the root aggregate.
pub fn page_number(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".xml")?;
    let (_, suffix) = stem.rsplit_once('_')?;
    suffix.parse().ok()
}

/// Sort key for root-aggregate ordering: numbered pages ascending, names
/// without a numeric suffix last, ties broken by name
pub fn root_order_key(name: &str) -> (u8, u64, String) {
    match page_number(name) {
        Some(n) => (0, n, name.to_string()),
        None => (1, 0, name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_page_name() {
        assert_eq!(page_name("jobs_idx", 1), "jobs_idx_1.xml");
        assert_eq!(page_name("jobs_idx", 12), "jobs_idx_12.xml");
    }

    #[test_case("jobs_idx_1.xml", Some(1))]
    #[test_case("jobs_idx_12.xml", Some(12))]
    #[test_case("jobs_with_underscores_3.xml", Some(3))]
    #[test_case("sitemap_Alljobs.xml", None)]
    #[test_case("no-suffix.xml", None)]
    #[test_case("jobs_idx_1.txt", None)]
    fn test_page_number(name: &str, expected: Option<u64>) {
        assert_eq!(page_number(name), expected);
    }

    #[test]
    fn test_root_ordering_numeric_then_lexical() {
        let mut names = vec![
            "jobs_idx_10.xml",
            "sitemap_extra.xml",
            "jobs_idx_2.xml",
            "jobs_idx_1.xml",
        ];
        names.sort_by_key(|name| root_order_key(name));
        assert_eq!(
            names,
            vec![
                "jobs_idx_1.xml",
                "jobs_idx_2.xml",
                "jobs_idx_10.xml",
                "sitemap_extra.xml",
            ]
        );
    }
}
