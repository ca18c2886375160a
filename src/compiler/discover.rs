//! Content discovery.
//!
//! Walks the source directory's top level plus one level of
//! subdirectories and pairs each `*.html` file with an optional sibling
//! data file sharing its base name. HTML is the anchor: a directory
//! holding only data files produces no pairs.

use crate::compiler::{DATA_EXT, HTML_EXT};
use crate::log;
use std::fs;
use std::path::{Path, PathBuf};

/// One discovered page: an HTML file plus its optional data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPair {
    pub html_path: PathBuf,
    pub data_path: Option<PathBuf>,
}

impl ContentPair {
    fn new(html_path: PathBuf) -> Self {
        let candidate = html_path.with_extension(DATA_EXT);
        let data_path = candidate.is_file().then_some(candidate);
        Self {
            html_path,
            data_path,
        }
    }
}

/// Discover all content pairs under `source`.
///
/// Scans the top level and each immediate subdirectory; deeper nesting
/// is not visited. Entries are name-sorted per directory so discovery
/// order (and therefore error accumulation order) is deterministic.
/// A missing source directory yields an empty list; a directory that
/// cannot be listed logs a diagnostic and is skipped without aborting
/// its siblings.
pub fn discover_content(source: &Path) -> Vec<ContentPair> {
    let mut pairs = Vec::new();

    let Some((files, subdirs)) = list_dir(source) else {
        return pairs;
    };

    pairs.extend(files.into_iter().map(ContentPair::new));

    for subdir in subdirs {
        if let Some((files, _)) = list_dir(&subdir) {
            pairs.extend(files.into_iter().map(ContentPair::new));
        }
    }

    pairs
}

/// List one directory level: name-sorted HTML files and subdirectories.
///
/// Returns `None` when the directory cannot be read.
fn list_dir(dir: &Path) -> Option<(Vec<PathBuf>, Vec<PathBuf>)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if dir.exists() {
                log!("warn"; "cannot list {}: {}", dir.display(), err);
            }
            return None;
        }
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => subdirs.push(path),
            Ok(t) if t.is_file() && is_html(&path) => files.push(path),
            _ => {}
        }
    }

    files.sort();
    subdirs.sort();
    Some((files, subdirs))
}

fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == HTML_EXT)
}

// ============================================================================
// Tests
// ============================================================================
