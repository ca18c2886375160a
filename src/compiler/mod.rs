//! Content compilation pipeline.
//!
//! - **discover**: pair HTML pages with sibling YAML data files
//! - **templates**: load the flat template directory
//! - **resolve**: layout extraction and single-pass include expansion
//! - **page**: per-page build with failure tolerance
//! - **assets**: copy static assets into the output
//!
//! # Build Flow
//!
//! ```text
//! discover_content() ──► build_page() × N ──► publish_assets()
//!       │                     │
//!       ▼                     ▼
//!  ContentPair[]         HTML files + BuildErrors
//! ```

pub mod assets;
pub mod discover;
pub mod page;
pub mod resolve;
pub mod templates;

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

// ============================================================================
// Shared constants
// ============================================================================

/// Extension of content and template files.
pub const HTML_EXT: &str = "html";

/// Extension of data files paired with content.
pub const DATA_EXT: &str = "yaml";

/// Site-wide data file at the source root.
pub const SITE_DATA_FILE: &str = "site.yaml";

// ============================================================================
// Output path derivation
// ============================================================================

/// Derive the output path for a content file.
///
/// Locates the first path segment equal to the source directory's base
/// name and re-roots everything after it under `output`. The result is
/// stable regardless of whether the source tree was reached through an
/// absolute or symlinked path. A content file outside the expected
/// source tree falls back to its bare file name at the output root.
pub fn output_path_for(html_path: &Path, source_name: &OsStr, output: &Path) -> PathBuf {
    let mut components = html_path.components();
    for component in components.by_ref() {
        if let Component::Normal(segment) = component
            && segment == source_name
        {
            let relative = components.as_path();
            if relative.as_os_str().is_empty() {
                break;
            }
            return output.join(relative);
        }
    }

    match html_path.file_name() {
        Some(name) => output.join(name),
        None => output.to_path_buf(),
    }
}

// ============================================================================
// Tests
// ============================================================================
