//! Batch compilation orchestration.
//!
//! Resolves the directory pair, runs the one-shot walk and, when asked,
//! hands over to the change watcher.
//!
//! # Architecture
//!
//! ```text
//! compile_batch()
//!     │
//!     ├── build_tree()
//!     │       │
//!     │       ├── resolve input/output ──► DirectoryPair
//!     │       └── walk() ──► mirrored output tree
//!     │
//!     └── (--watch) NotifySource ──► run_watcher()   (runs until the process ends)
//! ```

use crate::{
    compiler::{CommandCompiler, Compiler, run_watcher, walk, walk::WalkReport},
    config::ToolConfig,
    log,
    paths::{DirectoryPair, resolve_input_dir, resolve_output_dir},
    watch::NotifySource,
};
use anyhow::Result;
use std::path::Path;

/// Compile every template under `input`, then keep watching when `watch` is set.
pub fn compile_batch(
    input: &Path,
    output: Option<&Path>,
    watch: bool,
    config: &ToolConfig,
) -> Result<()> {
    let compiler = CommandCompiler::new(config);
    let (pair, _) = build_tree(input, output, config, &compiler)?;

    if watch {
        let mut source = NotifySource::subscribe(&pair.input_dir, config)?;
        log!("watch"; "watching {} for changes...", pair.input_dir.display());
        run_watcher(&mut source, &pair, &config.extensions(), &compiler)?;
    }

    Ok(())
}

/// Resolve the directory pair and run the one-shot walk.
///
/// A missing input directory fails before anything is created.
pub fn build_tree(
    input: &Path,
    output: Option<&Path>,
    config: &ToolConfig,
    compiler: &dyn Compiler,
) -> Result<(DirectoryPair, WalkReport)> {
    let input_dir = resolve_input_dir(input)?;
    let output_dir = resolve_output_dir(&input_dir, output, &config.compile.output_dir)?;
    let pair = DirectoryPair::new(input_dir, output_dir);

    log!(
        "compile";
        "{} -> {}",
        pair.input_dir.display(),
        pair.output_dir.display()
    );
    let report = walk(&pair, &config.extensions(), compiler)?;
    log_build_result(&report, &config.compile.source_ext);

    Ok((pair, report))
}

/// Log build result based on what the walk produced
fn log_build_result(report: &WalkReport, source_ext: &str) {
    if report.files == 0 {
        log!("warn"; "nothing compiled, check if input has .{source_ext} files");
    } else {
        log!(
            "compile";
            "done: {} files, {} directories",
            report.files,
            report.dirs
        );
    }
}
