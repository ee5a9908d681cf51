//! `[convert]` section configuration.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[convert]` section in pugkit.toml - html to template conversion.
///
/// # Example
/// ```toml
/// [convert]
/// command = ["html2pug"]
/// tabs_flag = "--tabs"
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Converter command. Html is piped to stdin, template source read from stdout.
    #[serde(default = "defaults::convert::command")]
    #[educe(Default = defaults::convert::command())]
    pub command: Vec<String>,

    /// Flag appended when `--tabs` is requested.
    #[serde(default = "defaults::convert::tabs_flag")]
    #[educe(Default = defaults::convert::tabs_flag())]
    pub tabs_flag: String,
}
