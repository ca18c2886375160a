//! Per-page render context assembly.
//!
//! The context handed to the template engine is the site-wide data
//! merged with three pipeline-injected keys: `page` (this page's own
//! data), `content` (the resolved page body) and `current_year`. It is
//! rebuilt from scratch for every page; nothing rendered for one page
//! can leak into another.

use chrono::{Datelike, Utc};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Mapping handed to the template engine for one page render.
pub type RenderContext = BTreeMap<String, Value>;

/// Keys injected by the pipeline. They shadow same-named site keys.
#[allow(dead_code)]
const RESERVED_KEYS: &[&str] = &["page", "content", "current_year"];

/// Assemble the render context for one page.
///
/// Site-level keys come first; `page`, `content` and `current_year`
/// are then inserted on top, shadowing any same-named site keys.
pub fn build_context(site: &Mapping, page: Value, content: &str) -> RenderContext {
    let mut ctx = RenderContext::new();

    for (key, value) in site {
        if let Value::String(key) = key {
            ctx.insert(key.clone(), value.clone());
        }
    }

    let page = match page {
        Value::Mapping(_) => page,
        // Empty or scalar data files still expose a mapping
        _ => Value::Mapping(Mapping::new()),
    };

    ctx.insert("page".into(), page);
    ctx.insert("content".into(), Value::String(content.to_string()));
    ctx.insert("current_year".into(), Value::Number(current_year().into()));

    ctx
}

/// Current UTC calendar year.
pub fn current_year() -> i64 {
    i64::from(Utc::now().year())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn site_with(key: &str, value: Value) -> Mapping {
        let mut site = Mapping::new();
        site.insert(Value::String(key.into()), value);
        site
    }

    #[test]
    fn test_context_contains_injected_keys() {
        let ctx = build_context(&Mapping::new(), Value::Null, "body");

        for key in RESERVED_KEYS {
            assert!(ctx.contains_key(*key), "missing {key}");
        }
        assert_eq!(ctx["content"], Value::String("body".into()));
        assert_eq!(ctx["page"], Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_site_keys_merged_at_top_level() {
        let site = site_with("title", Value::String("My Site".into()));
        let ctx = build_context(&site, Value::Null, "");

        assert_eq!(ctx["title"], Value::String("My Site".into()));
    }

    #[test]
    fn test_reserved_keys_shadow_site_keys() {
        let site = site_with("content", Value::String("from site".into()));
        let ctx = build_context(&site, Value::Null, "from page");

        assert_eq!(ctx["content"], Value::String("from page".into()));
    }

    #[test]
    fn test_page_mapping_preserved() {
        let mut page = Mapping::new();
        page.insert(
            Value::String("heading".into()),
            Value::String("Hello".into()),
        );
        let ctx = build_context(&Mapping::new(), Value::Mapping(page.clone()), "");

        assert_eq!(ctx["page"], Value::Mapping(page));
    }

    #[test]
    fn test_scalar_page_data_becomes_empty_mapping() {
        let ctx = build_context(&Mapping::new(), Value::String("oops".into()), "");
        assert_eq!(ctx["page"], Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_current_year_is_plausible() {
        let year = current_year();
        assert!((2024..3000).contains(&year));
    }
}
