//! File system watcher for rebuild-on-change.
//!
//! Monitors the source and templates directories and triggers a full
//! rebuild whenever a content or data file changes. There is no
//! incremental path: every relevant change rebuilds the whole site
//! through [`safe_build`], so watch mode can never crash the process.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     Event Loop                         │
//! │                                                        │
//! │  ┌──────────┐    ┌──────────┐    ┌──────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│   safe_build()   │  │
//! │  │ events   │    │ (300ms)  │    │  (full rebuild)  │  │
//! │  └──────────┘    └──────────┘    └──────────────────┘  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Events arriving while a rebuild runs queue up in the channel and are
//! debounced into the next rebuild. The loop terminates on ctrl-c, on
//! channel disconnect, or after `watch.max_events` rebuilds when a
//! bound is configured (used by tests).

use crate::build::safe_build;
use crate::config::SiteConfig;
use crate::log;
use crate::logger::WatchStatus;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::RecvTimeoutError,
    },
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

/// Extensions that trigger a rebuild.
const WATCHED_EXTS: &[&str] = &["html", "yaml"];

/// Idle receive timeout; also bounds ctrl-c reaction latency.
const IDLE_POLL_MS: u64 = 500;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// A path whose change should trigger a rebuild.
fn is_watched(path: &Path) -> bool {
    !is_temp_file(path)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| WATCHED_EXTS.contains(&ext))
}

/// Format path as relative to root for log display.
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

const fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events within a quiet window.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    window: Duration,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            window,
        }
    }

    /// Record an event's watched paths. Non-matching paths are dropped
    /// silently; they never trigger or get logged.
    fn add(&mut self, event: Event) {
        let mut any = false;
        for path in event.paths {
            if is_watched(&path) {
                self.pending.insert(path);
                any = true;
            }
        }
        if any {
            self.last_event = Some(Instant::now());
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self.last_event.is_some_and(|t| t.elapsed() >= self.window)
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<PathBuf> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_millis(IDLE_POLL_MS)
        } else {
            self.window
        }
    }
}

// =============================================================================
// Rebuild
// =============================================================================

/// Run one full rebuild, reporting through the status line.
fn rebuild(config: &SiteConfig, changed: &[PathBuf], status: &mut WatchStatus) {
    let trigger = changed
        .first()
        .map(|p| rel_path(p, config.get_root()))
        .unwrap_or_default();
    log!("watch"; "{trigger} changed, rebuilding...");

    let errors = safe_build(config);
    if errors.is_empty() {
        status.success(&format!("rebuilt ({trigger})"));
    } else {
        status.error(
            &format!("rebuilt with {} error(s) ({trigger})", errors.len()),
            "",
        );
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Run the initial build, then block rebuilding on every relevant change.
pub fn watch_for_changes_blocking(config: &SiteConfig) -> Result<()> {
    let mut status = WatchStatus::new();

    let errors = safe_build(config);
    if errors.is_empty() {
        status.success("initial build done");
    } else {
        status.error(&format!("initial build: {} error(s)", errors.len()), "");
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

    for dir in [&config.build.source, &config.build.templates] {
        if dir.exists() {
            watcher
                .watch(dir, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            log!("watch"; "{}/", rel_path(dir, config.get_root()));
        }
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        // Fails only if a handler is already installed; the poll loop
        // still exits on channel disconnect in that case
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)).ok();
    }

    let mut debouncer = Debouncer::new(Duration::from_millis(config.watch.debounce_ms));
    let mut rebuilds = 0usize;

    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                rebuild(config, &debouncer.take(), &mut status);
                rebuilds += 1;
                if config.watch.max_events.is_some_and(|max| rebuilds >= max) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            // Timeout without a ready batch: keep listening
            _ => {}
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
