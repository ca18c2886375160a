//! Template store.
//!
//! Templates are top-level `*.html` files in the templates directory,
//! keyed by file stem (`header.html` maps to `header`). Other files and
//! subdirectories are not loaded. The map is read-only for the duration
//! of one build pass.

use crate::compiler::HTML_EXT;
use crate::errors::{BuildError, BuildErrors, ErrorKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Template name → raw template source.
pub type TemplateMap = BTreeMap<String, String>;

/// Load all top-level template files into a name-keyed map.
///
/// A missing templates directory yields an empty map. A template that
/// cannot be read is skipped with a warning-severity error; one
/// unreadable template must not block the rest of the build.
pub fn load_templates(dir: &Path, errors: &mut BuildErrors) -> TemplateMap {
    let mut templates = TemplateMap::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return templates,
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() || !is_template(&path) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(source) => {
                templates.insert(name.to_string(), source);
            }
            Err(err) => {
                errors.push(
                    BuildError::new(
                        ErrorKind::Build,
                        &path,
                        format!("cannot read template: {err}"),
                    )
                    .warning(),
                );
            }
        }
    }

    templates
}

fn is_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == HTML_EXT)
}

// ============================================================================
// Tests
// ============================================================================
