//! `[purge]` section configuration.
//!
//! Controls unused-css removal: the purger and formatter commands, the
//! stylesheet to purge and the selectors that are always kept.

use super::defaults;
use educe::Educe;
use serde::Deserialize;
use std::path::PathBuf;

/// `[purge]` section in pugkit.toml.
///
/// # Example
/// ```toml
/// [purge]
/// command = ["purgecss"]
/// formatter = ["prettier", "--parser", "css"]   # [] skips formatting
/// css = "dist/bootstrap.css"
/// safelist = ["active", "show", "modal-backdrop"]
/// strip_comments = true
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PurgeConfig {
    /// Purger command; must print purgecss-style json on stdout.
    #[serde(default = "defaults::purge::command")]
    #[educe(Default = defaults::purge::command())]
    pub command: Vec<String>,

    /// Formatter command (css on stdin, css on stdout). Empty disables formatting.
    #[serde(default = "defaults::purge::formatter")]
    #[educe(Default = defaults::purge::formatter())]
    pub formatter: Vec<String>,

    /// Stylesheet produced by the css build.
    #[serde(default = "defaults::purge::css")]
    #[educe(Default = defaults::purge::css())]
    pub css: PathBuf,

    /// Selectors kept even when no html mentions them (toggled at runtime by js).
    #[serde(default = "defaults::purge::safelist")]
    #[educe(Default = defaults::purge::safelist())]
    pub safelist: Vec<String>,

    /// Remove `/* ... */` comments from the purged output.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub strip_comments: bool,
}
