//! Per-file recompilation for watch mode.
//!
//! This module provides the **compilation side** of watch mode, driven by an
//! [`EventSource`]. The notify-backed source lives in [`crate::watch`].
//!
//! ```text
//! src/watch.rs                    compiler/watch.rs
//! ────────────────────────────    ────────────────────────────
//! • File system monitoring        • Extension filtering
//! • Event debouncing              • Output path mapping
//! • Write-finish detection        • Compile-and-write
//!         │                       • Error reporting
//!         └──── FileEvent ──────► run_watcher()
//! ```
//!
//! A collaborator failure is reported and the watcher moves on to the next
//! event. IO failures (cannot create a directory, cannot write) end the
//! watcher with an error.

use super::{Compiler, compile_task};
use crate::error::ToolError;
use crate::logger::WatchStatus;
use crate::paths::{DirectoryPair, Extensions, rel_display};
use anyhow::Result;
use std::{path::PathBuf, sync::mpsc::Receiver};

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Changed,
}

impl ChangeKind {
    const fn verb(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
        }
    }
}

/// A finished write to `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl FileEvent {
    pub fn added(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Added,
            path: path.into(),
        }
    }

    pub fn changed(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Changed,
            path: path.into(),
        }
    }
}

/// Subscription to file change notifications.
pub trait EventSource {
    /// Block until the next event. `None` once the subscription is closed.
    fn next_event(&mut self) -> Option<FileEvent>;
}

impl EventSource for Receiver<FileEvent> {
    fn next_event(&mut self) -> Option<FileEvent> {
        self.recv().ok()
    }
}

// =============================================================================
// Event Loop
// =============================================================================

/// Recompile templates as events arrive, until the source closes.
///
/// Events are handled strictly in delivery order. Returns the session counts
/// when the source closes, which only happens for injected sources.
pub fn run_watcher(
    source: &mut dyn EventSource,
    pair: &DirectoryPair,
    ext: &Extensions,
    compiler: &dyn Compiler,
) -> Result<WatchStatus> {
    let skip_output = pair.output_is_nested();
    let mut status = WatchStatus::new();

    while let Some(event) = source.next_event() {
        if !ext.is_source(&event.path) || (skip_output && pair.is_output(&event.path)) {
            continue;
        }
        // Paths outside the watched root cannot be mirrored
        let Ok(task) = pair.task_for(&event.path, ext) else {
            continue;
        };

        let src = rel_display(&task.input, &pair.input_dir);
        match compile_task(&task, compiler) {
            Ok(()) => {
                let dst = rel_display(&task.output, &pair.output_dir);
                status.success(&format!("{} {src} -> {dst}", event.kind.verb()));
            }
            Err(e) if is_recoverable(&e) => {
                status.error(&format!("failed: {src}"), &cause_detail(&e));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(status)
}

fn is_recoverable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ToolError>()
        .is_some_and(ToolError::is_recoverable)
}

/// The collaborator's own message, without our "failed to process" wrapper.
fn cause_detail(err: &anyhow::Error) -> String {
    err.chain()
        .skip(1)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
