//! Site configuration management for `silex.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `[build]` | Directory layout (source, output, templates, …)  |
//! | `[watch]` | Watch-mode behavior (debounce, event bound)      |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "dist"
//! templates = "templates"
//! assets = "assets"
//!
//! [watch]
//! debounce_ms = 300
//! ```
//!
//! All directory paths are resolved to absolute paths under the project
//! root when CLI arguments are applied. The root is threaded through
//! explicitly; the process working directory is never changed.

pub mod defaults;
mod error;

pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing silex.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Watch-mode settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// `[build]` section - directory layout and reporting flags.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory (HTML pages plus sibling YAML data).
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Layout/include template directory (flat, top level only).
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Static assets directory, copied verbatim into the output.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Report each built page on the console.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub verbose: bool,

    /// Suppress console error diagnostics; callers consume the returned
    /// error list instead.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub silent: bool,
}

/// `[watch]` section - rebuild-on-change behavior.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Quiet window after a change event before rebuilding.
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,

    /// Stop after this many rebuilds (used by tests; unbounded if unset).
    #[serde(default = "defaults::watch::max_events")]
    #[educe(Default = defaults::watch::max_events())]
    pub max_events: Option<usize>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf());
    }

    /// Base name of the source directory.
    ///
    /// Output paths are derived by locating this segment inside each
    /// content file's path and re-rooting everything after it.
    pub fn source_name(&self) -> &OsStr {
        self.build
            .source
            .file_name()
            .unwrap_or(self.build.source.as_os_str())
    }

    /// Update configuration with CLI arguments and re-root every
    /// directory under the (possibly overridden) root.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        let args = match &cli.command {
            Commands::Build { build_args } | Commands::Watch { build_args, .. } => build_args,
        };

        Self::update_option(&mut self.build.source, args.source.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.templates, args.templates.as_ref());
        Self::update_option(&mut self.build.assets, args.assets.as_ref());
        if args.verbose {
            self.build.verbose = true;
        }
        if args.silent {
            self.build.silent = true;
        }

        if let Commands::Watch { max_events, .. } = &cli.command
            && max_events.is_some()
        {
            self.watch.max_events = *max_events;
        }

        // Normalize root and re-root all directories under it
        let root = Self::normalize_path(&root);
        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.build.source = Self::normalize_path(&root.join(&self.build.source));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.templates = Self::normalize_path(&root.join(&self.build.templates));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.set_root(&root);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration after CLI merging.
    pub fn validate(&self) -> Result<()> {
        if self.build.output == self.build.source {
            bail!(ConfigError::Validation(
                "[build.output] must differ from [build.source]".into()
            ));
        }
        if self.watch.debounce_ms == 0 {
            bail!(ConfigError::Validation(
                "[watch.debounce_ms] must be at least 1".into()
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
