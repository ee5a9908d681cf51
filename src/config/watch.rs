//! `[watch]` section configuration.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[watch]` section in pugkit.toml - file watcher tuning.
///
/// # Example
/// ```toml
/// [watch]
/// debounce_ms = 300      # quiet period before a batch of events is handled
/// stable_retries = 20    # 50ms size polls while waiting for a write to finish
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,

    #[serde(default = "defaults::watch::stable_retries")]
    #[educe(Default = defaults::watch::stable_retries())]
    pub stable_retries: usize,
}
