//! Collaborators backed by external programs.
//!
//! Both adapters run their command as a filter: source text on stdin,
//! result on stdout. Diagnostics printed on stderr become the error message.

use super::{Compiler, ConvertOptions, Converter};
use crate::config::ToolConfig;
use crate::pipe;
use anyhow::{Context, Result};
use std::{ffi::OsString, fs, path::Path};

/// Template compiler, `pug --pretty --path <file>` by default.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: Vec<String>,
    path_flag: String,
}

impl CommandCompiler {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            command: config.compile.command.clone(),
            path_flag: config.compile.path_flag.clone(),
        }
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, path: &Path) -> Result<String> {
        let source =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        // Both are dropped when `path_flag` is empty
        let path_arg = if self.path_flag.is_empty() {
            OsString::new()
        } else {
            path.as_os_str().to_owned()
        };

        pipe!(&source; &self.command; self.path_flag.as_str(), path_arg)
    }
}

/// Html to template converter, `html2pug` by default.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    command: Vec<String>,
    tabs_flag: String,
}

impl CommandConverter {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            command: config.convert.command.clone(),
            tabs_flag: config.convert.tabs_flag.clone(),
        }
    }
}

impl Converter for CommandConverter {
    fn convert(&self, html: &str, options: &ConvertOptions) -> Result<String> {
        pipe!(
            html.as_bytes();
            &self.command;
            if options.tabs { self.tabs_flag.as_str() } else { "" }
        )
    }
}
