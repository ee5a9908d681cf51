//! CSS helpers for the purge pipeline.
//!
//! This module provides:
//! - Comment stripping for purged stylesheets
//! - Html content discovery (a single file or one directory level)
//! - Parsing of the purger's json report

use crate::error::ToolError;
use crate::paths::Extensions;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

// ============================================================================
// Comments
// ============================================================================

/// Remove every `/* ... */` block, including multi-line ones.
pub fn strip_comments(css: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment regex"));
    re.replace_all(css, "")
}

// ============================================================================
// Content Files
// ============================================================================

/// Html files the purger should scan for selectors.
///
/// A file is used as is. A directory contributes its immediate `*.html`
/// files (not recursive), sorted by name.
pub fn collect_html_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| ToolError::io(path, e))? {
        let entry = entry.map_err(|e| ToolError::io(path, e))?;
        let file = entry.path();
        if file.is_file() && Extensions::is_html(&file) {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

// ============================================================================
// Purger Report
// ============================================================================

/// One entry of `purgecss` json output: `[{"css": "...", "file": "..."}]`.
#[derive(Debug, Deserialize)]
struct PurgedStylesheet {
    css: String,
}

/// Concatenate the purged css of every stylesheet in the report.
pub fn parse_purge_report(stdout: &str) -> Result<String> {
    let report: Vec<PurgedStylesheet> =
        serde_json::from_str(stdout.trim()).context("Purger printed invalid json")?;
    Ok(report
        .into_iter()
        .map(|sheet| sheet.css)
        .collect::<Vec<_>>()
        .join("\n"))
}
