//! Site building orchestration.
//!
//! One build pass is strictly sequential: load site data once, load
//! templates once, discover all content pairs, build every page in
//! discovery order while accumulating errors, publish assets, then
//! generate the sitemap from the same pair list. Page-local failures
//! are recorded and recovered; only a failure to prepare the output
//! directory is fatal.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── load site data + templates (read-only for the whole pass)
//!     ├── discover_content() ──► build_page() × N   (sequential)
//!     ├── publish_assets()
//!     └── write_sitemap()
//! ```

use crate::compiler::{
    SITE_DATA_FILE,
    assets::publish_assets,
    discover::discover_content,
    page::build_page,
    templates::load_templates,
};
use crate::config::SiteConfig;
use crate::data::{DataParser, SiteData, YamlParser};
use crate::engine::JinjaEngine;
use crate::errors::{BuildError, BuildErrors, ErrorKind};
use crate::generator::sitemap::write_sitemap;
use crate::log;
use anyhow::{Context, Result};
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Build the entire site, returning the accumulated errors.
///
/// A pass with zero content pairs still succeeds and still produces an
/// empty sitemap and copied assets. Unless the config is silent, error
/// diagnostics and a completion summary are printed as a side effect.
pub fn build_site(config: &SiteConfig) -> Result<BuildErrors> {
    let output = &config.build.output;
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let mut errors = BuildErrors::new();
    let engine = JinjaEngine::new();
    let parser = YamlParser;

    let site = load_site_data(config, &parser, &mut errors);
    let templates = load_templates(&config.build.templates, &mut errors);
    let pairs = discover_content(&config.build.source);

    if config.build.verbose {
        log!("build"; "found {} pages", pairs.len());
    }

    for pair in &pairs {
        build_page(
            pair, &site, &templates, &engine, &parser, config, &mut errors,
        );
    }

    publish_assets(config, &mut errors);

    if let Err(err) = write_sitemap(&pairs, &site, output) {
        errors.push(BuildError::new(
            ErrorKind::Build,
            output.join(crate::generator::sitemap::SITEMAP_FILE),
            format!("{err:#}"),
        ));
    }

    if !config.build.silent {
        report(&errors);
    }

    Ok(errors)
}

/// Build without ever propagating a failure to the caller.
///
/// Fatal errors and panics alike are converted into a generic
/// `build`-kind error so interactive and watch usage can never crash
/// the host process.
pub fn safe_build(config: &SiteConfig) -> BuildErrors {
    match catch_unwind(AssertUnwindSafe(|| build_site(config))) {
        Ok(Ok(errors)) => errors,
        Ok(Err(err)) => {
            let mut errors = BuildErrors::new();
            errors.push(BuildError::new(
                ErrorKind::Build,
                config.get_root(),
                format!("{err:#}"),
            ));
            errors
        }
        Err(_) => {
            let mut errors = BuildErrors::new();
            errors.push(BuildError::new(
                ErrorKind::Build,
                config.get_root(),
                "internal panic during build",
            ));
            errors
        }
    }
}

/// Print per-error diagnostics and the completion summary.
pub fn report(errors: &BuildErrors) {
    for error in errors {
        log!("error"; "{error}");
    }
    if errors.is_empty() {
        log!("build"; "done");
    } else {
        log!("build"; "completed with {} error(s)", errors.len());
    }
}

/// Load the optional `site.yaml` at the source root.
///
/// Absent file → empty mapping; unreadable or malformed file → empty
/// mapping plus one `yaml`-kind error.
fn load_site_data(
    config: &SiteConfig,
    parser: &dyn DataParser,
    errors: &mut BuildErrors,
) -> SiteData {
    let path = config.build.source.join(SITE_DATA_FILE);
    if !path.is_file() {
        return SiteData::new();
    }

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            errors.push(BuildError::new(
                ErrorKind::Yaml,
                &path,
                format!("cannot read site data: {err}"),
            ));
            return SiteData::new();
        }
    };

    match parser.parse(&source) {
        Ok(mapping) => mapping,
        Err(err) => {
            errors.push(
                BuildError::new(ErrorKind::Yaml, &path, err.message).at(err.line, err.column),
            );
            SiteData::new()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
