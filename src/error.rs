//! Error kinds surfaced by the build helpers.
//!
//! Orchestration code returns `anyhow::Result`; callers that need to tell the
//! kinds apart use `err.downcast_ref::<ToolError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Input path missing, or a file where a directory was expected (or vice versa).
    #[error("{what} not found or is not a {kind}: {}", path.display())]
    NotFound {
        what: &'static str,
        kind: &'static str,
        path: PathBuf,
    },

    /// An external compiler/converter/purger/formatter failed on this file.
    #[error("failed to process `{}`", path.display())]
    Collaborator {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Creating a directory or writing a file failed.
    #[error("IO error at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported input extension: {}", path.display())]
    Unsupported { path: PathBuf },
}

impl ToolError {
    pub fn missing_dir(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            kind: "directory",
            path: path.into(),
        }
    }

    pub fn missing_file(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            kind: "file",
            path: path.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn collaborator(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::Collaborator {
            path: path.into(),
            source,
        }
    }

    /// Whether the watcher may log this error and keep going.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }
}
