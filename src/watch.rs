//! File system watcher for live recompilation.
//!
//! Monitors the input directory and turns raw notify events into
//! [`FileEvent`]s once a file has finished being written.
//!
//! # Relationship with `compiler/watch.rs`
//!
//! - **This module** (`src/watch.rs`): notify subscription, debouncing, write-finish detection
//! - **`compiler/watch.rs`**: compile-and-write via [`run_watcher`](crate::compiler::run_watcher)
//!
//! # Architecture
//!
//! ```text
//! NotifySource
//!   notify events ──▶ Debouncer ──▶ expand_dir ──▶ wait_until_stable ──▶ FileEvent
//!                     (300ms)       (dir moves)    (size polling)
//! ```

use crate::{
    compiler::watch::{ChangeKind, EventSource, FileEvent},
    config::ToolConfig,
    log,
};
use anyhow::{Context, Result, bail};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};
use walkdir::WalkDir;

// =============================================================================
// Constants
// =============================================================================

/// Idle wait when nothing is pending.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval between size checks while a file is being written.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

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

/// Map a notify event kind to the change it reports, if any.
const fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Added),
        EventKind::Modify(_) => Some(ChangeKind::Changed),
        _ => None,
    }
}

/// Replace an event on a directory with `Added` events for every file below it.
///
/// A directory moved into the watched tree is reported as a single path;
/// its files never get events of their own.
fn expand_dir(event: FileEvent) -> Vec<FileEvent> {
    if !event.path.is_dir() {
        return vec![event];
    }
    WalkDir::new(&event.path)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && !is_temp_file(e.path()))
        .map(|e| FileEvent::added(e.into_path()))
        .collect()
}

/// Wait for file to stop being written to
pub fn wait_until_stable(path: &Path, max_retries: usize) -> Result<()> {
    let mut last_size = fs::metadata(path)?.len();

    for _ in 0..max_retries {
        thread::sleep(POLL_INTERVAL);
        let current_size = fs::metadata(path)?.len();
        if current_size == last_size {
            return Ok(());
        }
        last_size = current_size;
    }

    bail!("File did not stabilize after {max_retries} retries")
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events until a quiet period has passed.
///
/// Keeps first-seen order. A path reported as added stays added even if
/// modify events for it follow in the same batch.
struct Debouncer {
    pending: Vec<FileEvent>,
    seen: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    quiet: Duration,
}

impl Debouncer {
    fn new(quiet: Duration) -> Self {
        Self {
            pending: Vec::new(),
            seen: FxHashSet::default(),
            last_event: None,
            quiet,
        }
    }

    fn add(&mut self, event: Event) {
        let Some(kind) = change_kind(&event.kind) else {
            return;
        };
        for path in event.paths {
            if is_temp_file(&path) || !self.seen.insert(path.clone()) {
                continue;
            }
            self.pending.push(FileEvent { kind, path });
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty() && self.last_event.is_some_and(|t| t.elapsed() >= self.quiet)
    }

    fn take(&mut self) -> Vec<FileEvent> {
        self.last_event = None;
        self.seen.clear();
        std::mem::take(&mut self.pending)
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            IDLE_TIMEOUT
        } else {
            self.quiet
        }
    }
}

// =============================================================================
// Notify Source
// =============================================================================

/// Recursive notify subscription on one directory.
///
/// Dropping the source (or calling [`cancel`](Self::cancel)) stops the
/// underlying watcher and closes the subscription.
pub struct NotifySource {
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    debouncer: Debouncer,
    ready: VecDeque<FileEvent>,
    stable_retries: usize,
}

impl NotifySource {
    /// Start watching `dir` recursively.
    pub fn subscribe(dir: &Path, config: &ToolConfig) -> Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        Ok(Self {
            watcher,
            rx,
            debouncer: Debouncer::new(Duration::from_millis(config.watch.debounce_ms)),
            ready: VecDeque::new(),
            stable_retries: config.watch.stable_retries,
        })
    }

    /// Stop watching. Pending events are discarded.
    #[allow(dead_code)]
    pub fn cancel(self) {
        drop(self.watcher);
    }

    /// Move a settled batch into the ready queue, skipping files that vanished
    /// or never stopped growing.
    fn flush(&mut self) {
        let mut queued = FxHashSet::default();
        for event in self.debouncer.take().into_iter().flat_map(expand_dir) {
            if !queued.insert(event.path.clone()) {
                continue;
            }
            match wait_until_stable(&event.path, self.stable_retries) {
                Ok(()) => self.ready.push_back(event),
                // Deleted before it settled: nothing to compile
                Err(_) if !event.path.exists() => {}
                Err(e) => log!("watch"; "{}: {e}", event.path.display()),
            }
        }
    }
}

impl EventSource for NotifySource {
    fn next_event(&mut self) -> Option<FileEvent> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(event);
            }

            match self.rx.recv_timeout(self.debouncer.timeout()) {
                Ok(Ok(event)) => self.debouncer.add(event),
                Ok(Err(e)) => log!("watch"; "error: {e}"),
                Err(RecvTimeoutError::Timeout) if self.debouncer.ready() => self.flush(),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
