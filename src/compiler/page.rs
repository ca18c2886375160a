//! Per-page build.
//!
//! Stage sequence per page: load data → read content → extract layout →
//! resolve includes → render → write. Every failing stage records one
//! [`BuildError`] and the build continues with a safe default (empty
//! data, empty content, empty rendered string) so one broken page never
//! prevents the rest of the site from completing. The page is still
//! written, possibly empty.

use crate::compiler::discover::ContentPair;
use crate::compiler::resolve::{extract_layout, render_page};
use crate::compiler::templates::TemplateMap;
use crate::compiler::output_path_for;
use crate::config::SiteConfig;
use crate::context::build_context;
use crate::data::{DataParser, SiteData};
use crate::engine::TemplateEngine;
use crate::errors::{BuildError, BuildErrors, ErrorKind};
use crate::log;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Build one page, appending any failures to `errors`.
pub fn build_page(
    pair: &ContentPair,
    site: &SiteData,
    templates: &TemplateMap,
    engine: &dyn TemplateEngine,
    parser: &dyn DataParser,
    config: &SiteConfig,
    errors: &mut BuildErrors,
) {
    let page_data = load_page_data(pair, parser, errors);

    let raw = match fs::read_to_string(&pair.html_path) {
        Ok(raw) => raw,
        Err(err) => {
            errors.push(BuildError::new(
                ErrorKind::Build,
                &pair.html_path,
                format!("cannot read content file: {err}"),
            ));
            String::new()
        }
    };

    // The context's `content` key carries the page body (sans layout marker)
    let (_, body) = extract_layout(&raw);
    let context = build_context(site, page_data, body);

    let (rendered, page_errors) = render_page(&pair.html_path, &raw, &context, templates, engine);
    errors.extend(page_errors);

    let out = output_path_for(&pair.html_path, config.source_name(), &config.build.output);
    if let Some(parent) = out.parent()
        && let Err(err) = fs::create_dir_all(parent)
    {
        errors.push(BuildError::new(
            ErrorKind::Build,
            &pair.html_path,
            format!("cannot create {}: {err}", parent.display()),
        ));
        return;
    }

    match fs::write(&out, rendered) {
        Ok(()) => {
            if config.build.verbose {
                log!("build"; "{}", display_rel(&out, &config.build.output));
            }
        }
        Err(err) => {
            errors.push(BuildError::new(
                ErrorKind::Build,
                &pair.html_path,
                format!("cannot write {}: {err}", out.display()),
            ));
        }
    }
}

/// Load and parse the page's sibling data file, defaulting to empty.
fn load_page_data(pair: &ContentPair, parser: &dyn DataParser, errors: &mut BuildErrors) -> Value {
    let empty = Value::Mapping(Mapping::new());
    let Some(data_path) = &pair.data_path else {
        return empty;
    };

    let source = match fs::read_to_string(data_path) {
        Ok(source) => source,
        Err(err) => {
            errors.push(BuildError::new(
                ErrorKind::Yaml,
                data_path,
                format!("cannot read data file: {err}"),
            ));
            return empty;
        }
    };

    match parser.parse(&source) {
        Ok(mapping) => Value::Mapping(mapping),
        Err(err) => {
            errors.push(
                BuildError::new(ErrorKind::Yaml, data_path, err.message).at(err.line, err.column),
            );
            empty
        }
    }
}

fn display_rel<'a>(path: &'a Path, base: &Path) -> std::path::Display<'a> {
    path.strip_prefix(base).unwrap_or(path).display()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::YamlParser;
    use crate::engine::JinjaEngine;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.source = root.join("src");
        config.build.output = root.join("dist");
        config
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build(pair: &ContentPair, config: &SiteConfig, templates: &TemplateMap) -> BuildErrors {
        let mut errors = BuildErrors::new();
        build_page(
            pair,
            &SiteData::new(),
            templates,
            &JinjaEngine::new(),
            &YamlParser,
            config,
            &mut errors,
        );
        errors
    }

    fn pair_for(html: PathBuf) -> ContentPair {
        let data = html.with_extension("yaml");
        let data_path = data.is_file().then_some(data);
        ContentPair {
            html_path: html,
            data_path,
        }
    }

    #[test]
    fn test_page_written_to_mirrored_path() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let html = dir.path().join("src/about/index.html");
        write(&html, "<p>about</p>");

        let errors = build(&pair_for(html), &config, &TemplateMap::new());

        assert!(errors.is_empty());
        let out = dir.path().join("dist/about/index.html");
        assert_eq!(fs::read_to_string(out).unwrap(), "<p>about</p>");
    }

    #[test]
    fn test_page_data_rendered_into_output() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let html = dir.path().join("src/index.html");
        write(&html, "<h1>{{ page.title }}</h1>");
        write(&html.with_extension("yaml"), "title: Hello");

        let errors = build(&pair_for(html), &config, &TemplateMap::new());

        assert!(errors.is_empty());
        let out = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(out, "<h1>Hello</h1>");
    }

    #[test]
    fn test_no_data_file_builds_with_empty_page_context() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let html = dir.path().join("src/index.html");
        write(&html, "x{{ page.title }}y");

        let errors = build(&pair_for(html), &config, &TemplateMap::new());

        assert!(errors.is_empty());
        let out = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(out, "xy");
    }

    #[test]
    fn test_malformed_data_records_yaml_error_but_still_writes() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let html = dir.path().join("src/index.html");
        write(&html, "<p>body</p>");
        write(&html.with_extension("yaml"), "items: [1, 2\n");

        let errors = build(&pair_for(html.clone()), &config, &TemplateMap::new());

        assert_eq!(errors.len(), 1);
        let err = errors.iter().next().unwrap();
        assert_eq!(err.kind, ErrorKind::Yaml);
        assert_eq!(err.file, html.with_extension("yaml"));
        assert!(dir.path().join("dist/index.html").is_file());
    }

    #[test]
    fn test_missing_include_still_writes_output() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let html = dir.path().join("src/index.html");
        write(&html, "a{% include \"missing\" %}b");

        let errors = build(&pair_for(html), &config, &TemplateMap::new());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().kind, ErrorKind::Include);
        let out = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_layout_applied_with_site_free_context() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let html = dir.path().join("src/index.html");
        write(&html, "{% layout \"base\" %}\n<p>hi</p>");

        let mut templates = TemplateMap::new();
        templates.insert("base".into(), "<main>{{ content }}</main>".into());

        let errors = build(&pair_for(html), &config, &templates);

        assert!(errors.is_empty());
        let out = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(out, "<main><p>hi</p></main>");
    }

    #[test]
    fn test_unreadable_content_records_build_error() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        // Pair pointing at a file that vanished between discovery and build
        let html = dir.path().join("src/gone.html");
        fs::create_dir_all(html.parent().unwrap()).unwrap();

        let errors = build(&pair_for(html), &config, &TemplateMap::new());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().kind, ErrorKind::Build);
        // Safe default: an empty page is still written
        let out = fs::read_to_string(dir.path().join("dist/gone.html")).unwrap();
        assert_eq!(out, "");
    }
}
