//! One-shot walk of the input tree.
//!
//! Directories are visited depth-first in pre-order, entries sorted by file
//! name. The traversal runs on `walkdir`'s explicit stack, so tree depth is
//! not bounded by the call stack.
//!
//! Every run recompiles every template; there is no staleness check. The
//! first collaborator failure aborts the walk.

use super::{Compiler, compile_task};
use crate::error::ToolError;
use crate::log;
use crate::paths::{DirectoryPair, Extensions, rel_display};
use anyhow::{Result, anyhow};
use std::fs;
use walkdir::WalkDir;

/// What a walk produced, for the completion log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Output directories ensured (excluding the root)
    pub dirs: usize,
    /// Templates compiled
    pub files: usize,
}

/// Compile every template under `pair.input_dir` into `pair.output_dir`.
///
/// When the output root lives inside the input tree it is skipped, so the
/// walker never descends into its own output.
pub fn walk(pair: &DirectoryPair, ext: &Extensions, compiler: &dyn Compiler) -> Result<WalkReport> {
    let skip_output = pair.output_is_nested();
    let mut report = WalkReport::default();

    let entries = WalkDir::new(&pair.input_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(skip_output && pair.is_output(e.path())));

    for entry in entries {
        let entry = entry.map_err(walk_error)?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            let dir = pair.mirror_dir(path)?;
            fs::create_dir_all(&dir).map_err(|e| ToolError::io(&dir, e))?;
            report.dirs += 1;
        } else if entry.file_type().is_file() && ext.is_source(path) {
            let task = pair.task_for(path, ext)?;
            log!(
                "compile";
                "{} -> {}",
                rel_display(&task.input, &pair.input_dir),
                rel_display(&task.output, &pair.output_dir)
            );
            compile_task(&task, compiler)?;
            report.files += 1;
        }
    }

    Ok(report)
}

fn walk_error(err: walkdir::Error) -> anyhow::Error {
    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
    match err.into_io_error() {
        Some(io) => ToolError::io(path, io).into(),
        None => anyhow!("symlink loop at {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeCompiler;
    use super::*;
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    fn pug() -> Extensions {
        Extensions::new("pug", "html")
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Input and output roots as sibling directories under one temp dir.
    fn fixture() -> (TempDir, DirectoryPair) {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("in")).unwrap();
        fs::create_dir_all(root.join("out")).unwrap();
        let pair = DirectoryPair::new(root.join("in"), root.join("out"));
        (dir, pair)
    }

    /// All files under `root`, relative and sorted.
    fn files_under(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_walk_preserves_structure() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "a/b/c.pug", "p c");
        write(&pair.input_dir, "a/d.pug", "p d");

        let report = walk(&pair, &pug(), &FakeCompiler::default()).unwrap();

        assert_eq!(report, WalkReport { dirs: 2, files: 2 });
        assert_eq!(
            files_under(&pair.output_dir),
            vec![PathBuf::from("a/b/c.html"), PathBuf::from("a/d.html")]
        );
        assert_eq!(
            fs::read_to_string(pair.output_dir.join("a/b/c.html")).unwrap(),
            "<rendered>p c</rendered>"
        );
    }

    #[test]
    fn test_walk_single_index() {
        let dir = tempdir().unwrap();
        let input = dir.path().canonicalize().unwrap();
        write(&input, "index.pug", "h1 Home");
        let output = crate::paths::resolve_output_dir(&input, None, "output").unwrap();
        let pair = DirectoryPair::new(&input, output);

        walk(&pair, &pug(), &FakeCompiler::default()).unwrap();

        assert_eq!(
            fs::read_to_string(input.join("output/index.html")).unwrap(),
            "<rendered>h1 Home</rendered>"
        );
    }

    #[test]
    fn test_walk_ignores_other_files() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "index.pug", "p");
        write(&pair.input_dir, "style.css", "body {}");
        write(&pair.input_dir, "notes.txt", "todo");
        write(&pair.input_dir, "partials/README", "x");

        let compiler = FakeCompiler::default();
        walk(&pair, &pug(), &compiler).unwrap();

        assert_eq!(compiler.call_count(), 1);
        assert_eq!(files_under(&pair.output_dir), vec![PathBuf::from("index.html")]);
        // Directories are mirrored even when they hold no templates
        assert!(pair.output_dir.join("partials").is_dir());
    }

    #[test]
    fn test_walk_is_idempotent() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "index.pug", "h1 one");
        write(&pair.input_dir, "blog/post.pug", "h1 two");

        walk(&pair, &pug(), &FakeCompiler::default()).unwrap();
        let first: Vec<_> = files_under(&pair.output_dir)
            .iter()
            .map(|p| fs::read(pair.output_dir.join(p)).unwrap())
            .collect();

        walk(&pair, &pug(), &FakeCompiler::default()).unwrap();
        let second: Vec<_> = files_under(&pair.output_dir)
            .iter()
            .map(|p| fs::read(pair.output_dir.join(p)).unwrap())
            .collect();

        assert_eq!(first, second);
        assert_eq!(files_under(&pair.output_dir).len(), 2);
    }

    #[test]
    fn test_walk_recompiles_every_run() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "index.pug", "p");

        let compiler = FakeCompiler::default();
        walk(&pair, &pug(), &compiler).unwrap();
        walk(&pair, &pug(), &compiler).unwrap();
        assert_eq!(compiler.call_count(), 2);
    }

    #[test]
    fn test_walk_aborts_on_first_error() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "a.pug", "p a");
        write(&pair.input_dir, "b.pug", "!error");
        write(&pair.input_dir, "c.pug", "p c");

        let compiler = FakeCompiler::default();
        let err = walk(&pair, &pug(), &compiler).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::Collaborator { .. })
        ));
        // Sorted order: a compiled, b failed, c never attempted
        assert_eq!(compiler.call_count(), 2);
        assert!(pair.output_dir.join("a.html").exists());
        assert!(!pair.output_dir.join("c.html").exists());
    }

    #[test]
    fn test_walk_skips_nested_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().canonicalize().unwrap();
        write(&input, "index.pug", "p");
        let output = input.join("output");
        // Leftover from an earlier run that must not be walked
        write(&output, "stray.pug", "p stray");
        let pair = DirectoryPair::new(&input, &output);

        let compiler = FakeCompiler::default();
        walk(&pair, &pug(), &compiler).unwrap();

        assert_eq!(compiler.call_count(), 1);
        assert!(!output.join("output").exists());
        assert!(output.join("index.html").exists());
    }

    #[test]
    fn test_walk_preorder_visits_dirs_before_contents() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "b/z.pug", "p");
        write(&pair.input_dir, "a.pug", "p");
        write(&pair.input_dir, "c.pug", "p");

        let compiler = FakeCompiler::default();
        walk(&pair, &pug(), &compiler).unwrap();

        let order: Vec<_> = compiler
            .calls
            .borrow()
            .iter()
            .map(|p| p.strip_prefix(&pair.input_dir).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            order,
            vec![PathBuf::from("a.pug"), PathBuf::from("b/z.pug"), PathBuf::from("c.pug")]
        );
    }

    #[test]
    fn test_walk_custom_extensions() {
        let (_dir, pair) = fixture();
        write(&pair.input_dir, "index.jade", "p");
        write(&pair.input_dir, "other.pug", "p");

        walk(&pair, &Extensions::new("jade", "htm"), &FakeCompiler::default()).unwrap();
        assert_eq!(files_under(&pair.output_dir), vec![PathBuf::from("index.htm")]);
    }
}
