//! Path resolution and output mirroring.
//!
//! Every output path is a pure function of its input path and the root
//! [`DirectoryPair`]: same position relative to the root, extension mapped
//! from the template extension to the rendered one.
//!
//! ```text
//! views/a/b/c.pug ──strip views──► a/b/c.pug ──join out──► out/a/b/c.pug ──ext──► out/a/b/c.html
//! ```

use crate::error::ToolError;
use anyhow::{Result, anyhow};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Types
// ============================================================================

/// Source/target extension pair, stored without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions {
    pub source: String,
    pub target: String,
}

impl Extensions {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_owned(),
            target: target.to_owned(),
        }
    }

    /// Whether `path` is a template source file.
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.source))
    }

    /// Whether `path` is an html document.
    pub fn is_html(path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    }
}

/// One level of the mirrored tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPair {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl DirectoryPair {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Output directory mirroring `dir` (which must live under `input_dir`).
    pub fn mirror_dir(&self, dir: &Path) -> Result<PathBuf> {
        let rel = relative_to(dir, &self.input_dir)?;
        Ok(self.output_dir.join(rel))
    }

    /// Compile-and-write task for a template file under `input_dir`.
    pub fn task_for(&self, file: &Path, ext: &Extensions) -> Result<FileTask> {
        let output = map_input_to_output_path(file, &self.input_dir, &self.output_dir, ext)?;
        Ok(FileTask {
            input: file.to_path_buf(),
            output,
        })
    }

    /// Whether the output root sits inside the input tree (the `<input>/output` default).
    pub fn output_is_nested(&self) -> bool {
        self.output_dir != self.input_dir && self.output_dir.starts_with(&self.input_dir)
    }

    /// Whether `path` is the output root or lies below it.
    pub fn is_output(&self, path: &Path) -> bool {
        path.starts_with(&self.output_dir)
    }
}

/// A single template to render: read `input`, write `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

// ============================================================================
// Resolution
// ============================================================================

/// Normalize a path to absolute, using canonicalize if the path exists
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

/// Resolve an input directory, failing if it is missing or not a directory.
pub fn resolve_input_dir(path: &Path) -> Result<PathBuf> {
    let path = normalize_path(path);
    if !path.is_dir() {
        return Err(ToolError::missing_dir("input directory", path).into());
    }
    Ok(path)
}

/// Resolve an input file, failing if it is missing or not a regular file.
pub fn resolve_input_file(path: &Path, what: &'static str) -> Result<PathBuf> {
    let path = normalize_path(path);
    if !path.is_file() {
        return Err(ToolError::missing_file(what, path).into());
    }
    Ok(path)
}

/// Resolve an input that may be either a file or a directory.
pub fn resolve_input_path(path: &Path, what: &'static str) -> Result<PathBuf> {
    let path = normalize_path(path);
    if !path.exists() {
        return Err(ToolError::NotFound {
            what,
            kind: "file or directory",
            path,
        }
        .into());
    }
    Ok(path)
}

/// Resolve the output directory and make sure it exists.
///
/// Uses `explicit` when given, otherwise `<input>/<default_name>`.
pub fn resolve_output_dir(
    input: &Path,
    explicit: Option<&Path>,
    default_name: &str,
) -> Result<PathBuf> {
    let output = match explicit {
        Some(path) => normalize_path(path),
        None => input.join(default_name),
    };
    fs::create_dir_all(&output).map_err(|e| ToolError::io(&output, e))?;
    // Canonical now that it exists, so prefix checks against the input agree
    Ok(normalize_path(&output))
}

/// Map a template file to its rendered path under `output_root`.
pub fn map_input_to_output_path(
    file: &Path,
    input_root: &Path,
    output_root: &Path,
    ext: &Extensions,
) -> Result<PathBuf> {
    let rel = relative_to(file, input_root)?;
    Ok(output_root.join(rel).with_extension(&ext.target))
}

/// `path` with its extension replaced by `ext`.
pub fn swap_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root).map_err(|_| {
        anyhow!(
            "`{}` is not inside `{}`",
            path.display(),
            root.display()
        )
    })
}

/// Format path as relative to root for log display.
///
/// `/proj/views/a/index.pug` → `a/index.pug`
pub fn rel_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pug() -> Extensions {
        Extensions::new("pug", "html")
    }

    #[test]
    fn test_is_source() {
        let ext = pug();
        assert!(ext.is_source(Path::new("views/index.pug")));
        assert!(ext.is_source(Path::new("a.b.pug")));
        assert!(!ext.is_source(Path::new("views/index.html")));
        assert!(!ext.is_source(Path::new("views/pug")));
        assert!(!ext.is_source(Path::new("views/index.pug.bak")));
    }

    #[test]
    fn test_is_html() {
        assert!(Extensions::is_html(Path::new("a.html")));
        assert!(Extensions::is_html(Path::new("A.HTML")));
        assert!(!Extensions::is_html(Path::new("a.pug")));
        assert!(!Extensions::is_html(Path::new("html")));
    }

    #[test]
    fn test_map_input_to_output_path() {
        let out = map_input_to_output_path(
            Path::new("/in/a/b/c.pug"),
            Path::new("/in"),
            Path::new("/out"),
            &pug(),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/a/b/c.html"));
    }

    #[test]
    fn test_map_keeps_inner_dots() {
        let out = map_input_to_output_path(
            Path::new("/in/page.en.pug"),
            Path::new("/in"),
            Path::new("/out"),
            &pug(),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/page.en.html"));
    }

    #[test]
    fn test_map_outside_root_fails() {
        let result = map_input_to_output_path(
            Path::new("/elsewhere/x.pug"),
            Path::new("/in"),
            Path::new("/out"),
            &pug(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_pair_mirror() {
        let pair = DirectoryPair::new("/in", "/out");
        assert_eq!(pair.mirror_dir(Path::new("/in/a/b")).unwrap(), PathBuf::from("/out/a/b"));

        let task = pair.task_for(Path::new("/in/a/d.pug"), &pug()).unwrap();
        assert_eq!(task.input, PathBuf::from("/in/a/d.pug"));
        assert_eq!(task.output, PathBuf::from("/out/a/d.html"));
    }

    #[test]
    fn test_output_is_nested() {
        assert!(DirectoryPair::new("/in", "/in/output").output_is_nested());
        assert!(!DirectoryPair::new("/in", "/out").output_is_nested());
        assert!(!DirectoryPair::new("/in", "/in").output_is_nested());
        // Shared prefix is not nesting
        assert!(!DirectoryPair::new("/in", "/input").output_is_nested());
    }

    #[test]
    fn test_resolve_input_dir_missing() {
        let dir = tempdir().unwrap();
        let err = resolve_input_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_input_dir_rejects_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("index.pug");
        fs::write(&file, "p hi").unwrap();
        assert!(resolve_input_dir(&file).is_err());
        assert!(resolve_input_file(&file, "template file").is_ok());
        assert!(resolve_input_file(dir.path(), "template file").is_err());
    }

    #[test]
    fn test_resolve_input_path_accepts_both_kinds() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, "<p>").unwrap();
        assert!(resolve_input_path(dir.path(), "html input").is_ok());
        assert!(resolve_input_path(&page, "html input").is_ok());

        let err = resolve_input_path(&dir.path().join("missing"), "html input").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::NotFound { kind: "file or directory", .. })
        ));
    }

    #[test]
    fn test_resolve_output_dir_default() {
        let dir = tempdir().unwrap();
        let input = resolve_input_dir(dir.path()).unwrap();
        let output = resolve_output_dir(&input, None, "output").unwrap();
        assert_eq!(output, input.join("output"));
        assert!(output.is_dir());
    }

    #[test]
    fn test_resolve_output_dir_explicit_creates_parents() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("build/html/site");
        let output = resolve_output_dir(dir.path(), Some(&explicit), "output").unwrap();
        assert!(output.is_absolute());
        assert!(output.is_dir());
        assert!(!dir.path().join("output").exists());
    }

    #[test]
    fn test_swap_extension() {
        assert_eq!(swap_extension(Path::new("a/index.html"), "pug"), PathBuf::from("a/index.pug"));
        assert_eq!(swap_extension(Path::new("noext"), "css"), PathBuf::from("noext.css"));
    }

    #[test]
    fn test_rel_display() {
        assert_eq!(rel_display(Path::new("/in/a/x.pug"), Path::new("/in")), "a/x.pug");
        assert_eq!(rel_display(Path::new("/other/x.pug"), Path::new("/in")), "/other/x.pug");
    }
}
