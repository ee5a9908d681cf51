//! Errors raised while loading or checking `pugkit.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `-C <file>` named a config that does not exist.
    #[error("config file `{}` does not exist", .0.display())]
    Missing(PathBuf),

    #[error("cannot read config file `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("malformed pugkit.toml")]
    Parse(#[from] toml::de::Error),

    /// A setting that parsed but cannot be used, e.g. `[compile] source_ext = ".pug"`.
    #[error("pugkit.toml: {field} {reason}")]
    Invalid { field: String, reason: &'static str },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: &'static str) -> Self {
        Self::Invalid {
            field: field.into(),
            reason,
        }
    }
}
