//! Tool configuration management for `pugkit.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[compile]` | Template compiler command, extensions, output    |
//! | `[convert]` | Html to template converter command               |
//! | `[purge]`   | Css purger/formatter commands, stylesheet        |
//! | `[watch]`   | Watcher debounce and write-finish polling        |
//!
//! Every section is optional; a missing `pugkit.toml` means all defaults.
//!
//! # Example
//!
//! ```toml
//! [compile]
//! command = ["npx", "pug", "--pretty"]
//!
//! [purge]
//! css = "dist/site.css"
//! safelist = ["active", "show"]
//!
//! [watch]
//! debounce_ms = 200
//! ```

mod compile;
mod convert;
pub mod defaults;
mod error;
mod purge;
mod watch;

use compile::CompileConfig;
use convert::ConvertConfig;
use error::ConfigError;
use purge::PurgeConfig;
use watch::WatchConfig;

use crate::cli::{Cli, Commands};
use crate::paths::{Extensions, normalize_path};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "pugkit.toml";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing pugkit.toml
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Absolute path to the config file (empty when running on defaults)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub compile: CompileConfig,

    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default)]
    pub purge: PurgeConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl ToolConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: ToolConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.config_path = normalize_path(path);
        Ok(config)
    }

    /// Load the config named on the command line, falling back to defaults
    /// when the default file is absent.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.exists() {
            Self::from_path(&cli.config)?
        } else if cli.config != Path::new(DEFAULT_CONFIG) {
            bail!(ConfigError::Missing(cli.config.clone()));
        } else {
            Self::default()
        };

        config.update_paths();
        Ok(config)
    }

    /// Source/target extension pair used for every path mapping.
    pub fn extensions(&self) -> Extensions {
        Extensions::new(&self.compile.source_ext, &self.compile.target_ext)
    }

    /// Expand `~` and make configured paths absolute
    fn update_paths(&mut self) {
        let css = self.purge.css.to_string_lossy().into_owned();
        let expanded = PathBuf::from(shellexpand::tilde(&css).into_owned());
        self.purge.css = normalize_path(&expanded);
    }

    /// Validate configuration for the current command
    pub fn validate(&self, command: &Commands) -> Result<()> {
        let compile = &self.compile;

        for (field, ext) in [
            ("[compile.source_ext]", &compile.source_ext),
            ("[compile.target_ext]", &compile.target_ext),
        ] {
            if ext.is_empty() {
                bail!(ConfigError::invalid(field, "must not be empty"));
            }
            if ext.starts_with('.') {
                bail!(ConfigError::invalid(field, "must not start with a dot"));
            }
        }
        if compile.source_ext.eq_ignore_ascii_case(&compile.target_ext) {
            bail!(ConfigError::invalid(
                "[compile.source_ext] and [compile.target_ext]",
                "must differ"
            ));
        }
        if compile.output_dir.is_empty() {
            bail!(ConfigError::invalid("[compile.output_dir]", "must not be empty"));
        }

        match command {
            Commands::CompileBatch { .. } => {
                Self::check_command_installed("[compile.command]", &compile.command)?;
            }
            Commands::ConvertSingle { input, .. } => {
                // Only the collaborator for the requested direction is needed
                if Extensions::is_html(input) {
                    Self::check_command_installed("[convert.command]", &self.convert.command)?;
                } else {
                    Self::check_command_installed("[compile.command]", &compile.command)?;
                }
            }
            Commands::PurgeUnused { .. } => {
                Self::check_command_installed("[purge.command]", &self.purge.command)?;
                if !self.purge.formatter.is_empty() {
                    Self::check_command_installed("[purge.formatter]", &self.purge.formatter)?;
                }
            }
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        if command.is_empty() {
            bail!(ConfigError::invalid(field, "must have at least one element"));
        }

        let cmd = &command[0];
        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
