//! Sitemap generation.
//!
//! Emits a sitemap.xml listing one URL per built page for search engine
//! indexing, overwriting any previous version at the output root.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/about</loc>
//!     <lastmod>2026-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::compiler::discover::ContentPair;
use crate::data::SiteData;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Output file name at the output root.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Base URL used when site data carries no `site.url`.
pub const DEFAULT_BASE_URL: &str = "https://example.com";

// ============================================================================
// Public API
// ============================================================================

/// Generate and write the sitemap for one build pass.
///
/// Uses the same content-pair list the page builds consumed, so the
/// sitemap always reflects exactly the pages that were built.
pub fn write_sitemap(pairs: &[ContentPair], site: &SiteData, output: &Path) -> Result<()> {
    let sitemap = Sitemap::from_pairs(pairs, &base_url(site));
    let path = output.join(SITEMAP_FILE);
    fs::write(&path, sitemap.into_xml())
        .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;
    Ok(())
}

/// `site.url` from site data, default placeholder otherwise.
fn base_url(site: &SiteData) -> String {
    site.get(Value::String("site".into()))
        .and_then(Value::as_mapping)
        .and_then(|m| m.get(Value::String("url".into())))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
struct Sitemap {
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    /// Full URL location
    loc: String,
    /// Last modification date (YYYY-MM-DD)
    lastmod: String,
}

impl Sitemap {
    /// One entry per content pair. The URL path is the page's
    /// containing-directory name (second-to-last source path segment);
    /// lastmod is today's UTC calendar date.
    fn from_pairs(pairs: &[ContentPair], base: &str) -> Self {
        let lastmod = Utc::now().format("%Y-%m-%d").to_string();

        let urls = pairs
            .iter()
            .map(|pair| {
                let dir = pair
                    .html_path
                    .parent()
                    .and_then(Path::file_name)
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                UrlEntry {
                    loc: format!("{base}/{dir}"),
                    lastmod: lastmod.clone(),
                }
            })
            .collect();

        Self { urls }
    }

    /// Generate sitemap XML string.
    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(1024);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pair(html: &str) -> ContentPair {
        ContentPair {
            html_path: PathBuf::from(html),
            data_path: None,
        }
    }

    fn site_with_url(url: &str) -> SiteData {
        let mut inner = serde_yaml::Mapping::new();
        inner.insert(Value::String("url".into()), Value::String(url.into()));
        let mut site = SiteData::new();
        site.insert(Value::String("site".into()), Value::Mapping(inner));
        site
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<q>"), "&lt;q&gt;");
    }

    #[test]
    fn test_base_url_from_site_data() {
        assert_eq!(
            base_url(&site_with_url("https://example.com/")),
            "https://example.com"
        );
    }

    #[test]
    fn test_base_url_default_placeholder() {
        assert_eq!(base_url(&SiteData::new()), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_sitemap_empty() {
        let xml = Sitemap::from_pairs(&[], "https://example.com").into_xml();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(xml.contains("</urlset>"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_sitemap_urls_from_containing_directory() {
        let pairs = [
            pair("/proj/src/home/index.html"),
            pair("/proj/src/about/index.html"),
        ];
        let xml = Sitemap::from_pairs(&pairs, "https://example.com").into_xml();

        assert!(xml.contains("<loc>https://example.com/home</loc>"));
        assert!(xml.contains("<loc>https://example.com/about</loc>"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_sitemap_lastmod_is_today_utc() {
        let pairs = [pair("/proj/src/home/index.html")];
        let xml = Sitemap::from_pairs(&pairs, "https://example.com").into_xml();

        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert!(xml.contains(&format!("<lastmod>{today}</lastmod>")));
    }

    #[test]
    fn test_sitemap_escapes_special_chars() {
        let pairs = [pair("/proj/src/a&b/index.html")];
        let xml = Sitemap::from_pairs(&pairs, "https://example.com").into_xml();
        assert!(xml.contains("<loc>https://example.com/a&amp;b</loc>"));
    }

    #[test]
    fn test_write_overwrites_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SITEMAP_FILE), "stale").unwrap();

        write_sitemap(&[pair("/p/src/home/index.html")], &SiteData::new(), dir.path()).unwrap();

        let xml = fs::read_to_string(dir.path().join(SITEMAP_FILE)).unwrap();
        assert!(xml.contains("urlset"));
        assert!(!xml.contains("stale"));
    }
}
