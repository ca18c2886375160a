//! Layout extraction and include expansion.
//!
//! Two directives are owned by the pipeline rather than the template
//! engine:
//!
//! - `{% layout "name" %}`: a single leading marker naming the outer
//!   template; everything after it is the page body.
//! - `{% include "name" %}`: replaced in place by the named template's
//!   rendered output.
//!
//! Include expansion is a single left-to-right pass over the top-level
//! string. Markers inside an included template are NOT expanded; they
//! reach the output verbatim. Deeper nesting needs either a second
//! marker level in the consuming page or an intentional upgrade to
//! recursive expansion with its own tests.

use crate::compiler::templates::TemplateMap;
use crate::context::RenderContext;
use crate::engine::TemplateEngine;
use crate::errors::{BuildError, ErrorKind};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Literal placeholder a layout uses for the page body.
pub const CONTENT_PLACEHOLDER: &str = "{{ content }}";

static LAYOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\{%\s*layout\s+"([^"]+)"\s*%\}"#).unwrap());

static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{%\s*include\s+"([^"]+)"\s*%\}"#).unwrap());

/// Normalize a directive argument to a template-map key (strip extension).
fn template_name(raw: &str) -> String {
    Path::new(raw)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(raw)
        .to_string()
}

/// 1-based line and column of a byte offset.
fn location_of(text: &str, offset: usize) -> (u32, u32) {
    let prefix = &text[..offset];
    let line = prefix.matches('\n').count() as u32 + 1;
    let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
    let column = (offset - line_start) as u32 + 1;
    (line, column)
}

// ============================================================================
// Layout extraction
// ============================================================================

/// Split a page into its layout name and body.
///
/// Only a single leading `{% layout "name" %}` marker is honored; the
/// remainder, trimmed of surrounding whitespace, is the body. The
/// name's extension (if any) is stripped to match template-map keys.
pub fn extract_layout(content: &str) -> (Option<String>, &str) {
    match LAYOUT_RE.captures(content) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (Some(template_name(&caps[1])), content[end..].trim())
        }
        None => (None, content.trim()),
    }
}

// ============================================================================
// Include expansion
// ============================================================================

/// Expand every top-level include marker in `content`, left to right.
///
/// Each inclusion is the named template rendered against the same
/// context as the outer page. A missing template substitutes an empty
/// string and records one `include`-kind error carrying the marker's
/// line and column. Substituted text is not re-scanned: this is a
/// single pass.
pub fn resolve_includes(
    file: &Path,
    content: &str,
    context: &RenderContext,
    templates: &TemplateMap,
    engine: &dyn TemplateEngine,
) -> (String, Vec<BuildError>) {
    let mut out = String::with_capacity(content.len());
    let mut errors = Vec::new();
    let mut last = 0;

    for caps in INCLUDE_RE.captures_iter(content) {
        let Some(marker) = caps.get(0) else { continue };
        out.push_str(&content[last..marker.start()]);
        last = marker.end();

        let name = template_name(&caps[1]);
        match templates.get(&name) {
            Some(source) => match engine.render(source, context) {
                Ok(rendered) => out.push_str(&rendered),
                Err(err) => errors.push(
                    BuildError::new(
                        ErrorKind::Template,
                        file,
                        format!("include \"{name}\": {}", err.message),
                    )
                    .at(err.line, err.column),
                ),
            },
            None => {
                let (line, column) = location_of(content, marker.start());
                errors.push(
                    BuildError::new(
                        ErrorKind::Include,
                        file,
                        format!("include template \"{name}\" not found"),
                    )
                    .at(line, column),
                );
            }
        }
    }

    out.push_str(&content[last..]);
    (out, errors)
}

// ============================================================================
// Full page render
// ============================================================================

/// Render one page body through its layout and the template engine.
///
/// The layout's literal `{{ content }}` placeholder is substituted with
/// the page body first, then one include pass runs over the combined
/// string (so layout includes and body includes expand together), and
/// finally the expanded string goes through the engine. Engine failure
/// yields an empty rendered string plus a `template`-kind error; a
/// missing layout template yields an `include`-kind error and renders
/// the bare body.
pub fn render_page(
    file: &Path,
    raw: &str,
    context: &RenderContext,
    templates: &TemplateMap,
    engine: &dyn TemplateEngine,
) -> (String, Vec<BuildError>) {
    let mut errors = Vec::new();
    let (layout, body) = extract_layout(raw);

    let combined = match layout {
        Some(name) => match templates.get(&name) {
            Some(layout_src) => layout_src.replace(CONTENT_PLACEHOLDER, body),
            None => {
                errors.push(BuildError::new(
                    ErrorKind::Include,
                    file,
                    format!("layout template \"{name}\" not found"),
                ));
                body.to_string()
            }
        },
        None => body.to_string(),
    };

    let (expanded, include_errors) = resolve_includes(file, &combined, context, templates, engine);
    errors.extend(include_errors);

    let rendered = match engine.render(&expanded, context) {
        Ok(rendered) => rendered,
        Err(err) => {
            errors.push(
                BuildError::new(ErrorKind::Template, file, err.message).at(err.line, err.column),
            );
            String::new()
        }
    };

    (rendered, errors)
}

// ============================================================================
// Tests
// ============================================================================
