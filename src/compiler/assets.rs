//! Static asset publishing.
//!
//! Copies the well-known static subdirectories of the source tree plus
//! the configured assets directory into the output, non-destructively:
//! missing parents are created and stale files overwritten, but nothing
//! already in the output is deleted.

use crate::config::SiteConfig;
use crate::errors::{BuildError, BuildErrors, ErrorKind};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Source subdirectories copied verbatim when present.
pub const STATIC_DIRS: &[&str] = &["css", "js", "images", "fonts", "media"];

/// Copy all static assets into the output directory.
///
/// Copy failures are recorded as `build`-kind errors; they never abort
/// the pass.
pub fn publish_assets(config: &SiteConfig, errors: &mut BuildErrors) {
    for name in STATIC_DIRS {
        copy_tree(
            &config.build.source.join(name),
            &config.build.output.join(name),
            errors,
        );
    }

    if let Some(name) = config.build.assets.file_name() {
        copy_tree(
            &config.build.assets,
            &config.build.output.join(name),
            errors,
        );
    }
}

/// Recursively copy every file under `src` to the same relative path
/// under `dst`. A missing `src` is not an error.
fn copy_tree(src: &Path, dst: &Path, errors: &mut BuildErrors) {
    if !src.is_dir() {
        return;
    }

    for entry in WalkDir::new(src).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);

        let result = target
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::copy(entry.path(), &target).map(|_| ()));

        if let Err(err) = result {
            errors.push(BuildError::new(
                ErrorKind::Build,
                entry.path(),
                format!("cannot copy to {}: {err}", target.display()),
            ));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.source = root.join("src");
        config.build.output = root.join("dist");
        config.build.assets = root.join("assets");
        config
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_well_known_dirs_copied() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        write(&dir.path().join("src/css/site.css"), "body {}");
        write(&dir.path().join("src/images/a/logo.png"), "png");

        let mut errors = BuildErrors::new();
        publish_assets(&config, &mut errors);

        assert!(errors.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("dist/css/site.css")).unwrap(),
            "body {}"
        );
        assert!(dir.path().join("dist/images/a/logo.png").is_file());
    }

    #[test]
    fn test_configured_assets_dir_copied_under_its_own_name() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        write(&dir.path().join("assets/fonts.woff2"), "woff");

        let mut errors = BuildErrors::new();
        publish_assets(&config, &mut errors);

        assert!(errors.is_empty());
        assert!(dir.path().join("dist/assets/fonts.woff2").is_file());
    }

    #[test]
    fn test_missing_asset_dirs_are_not_errors() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());

        let mut errors = BuildErrors::new();
        publish_assets(&config, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_copy_is_non_destructive() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        write(&dir.path().join("src/css/site.css"), "new");
        write(&dir.path().join("dist/css/site.css"), "old");
        write(&dir.path().join("dist/css/keep.css"), "keep");

        let mut errors = BuildErrors::new();
        publish_assets(&config, &mut errors);

        // Stale file overwritten, unrelated file untouched
        assert_eq!(
            fs::read_to_string(dir.path().join("dist/css/site.css")).unwrap(),
            "new"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("dist/css/keep.css")).unwrap(),
            "keep"
        );
    }
}
