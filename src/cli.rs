//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Front-end build helpers: pug compilation, html/pug conversion, css purging
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file path (default: pugkit.toml)
    #[arg(short = 'C', long, default_value = "pugkit.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile every template under a directory into a mirrored html tree
    CompileBatch {
        /// Directory containing the template files
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (default: `<input>/output`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Watch for changes and recompile automatically
        #[arg(short, long)]
        watch: bool,
    },

    /// Convert a single file between html and template source
    ConvertSingle {
        /// File to convert (`.html` or a template file)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: input with the extension swapped)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use tabs instead of spaces for indentation
        #[arg(short, long)]
        tabs: bool,
    },

    /// Remove css rules whose selectors never appear in the given html
    PurgeUnused {
        /// Html file, or directory of html files, used for purging
        #[arg(long)]
        html: PathBuf,

        /// Stylesheet to purge (default: `[purge.css]` from config)
        #[arg(long)]
        css: Option<PathBuf>,

        /// Output css file (default: derived from `--html`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
