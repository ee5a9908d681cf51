//! Template compilation and the directory mirror.
//!
//! - **command**: collaborator adapters backed by external programs
//! - **walk**: one-shot walk of the input tree into the mirrored output tree
//! - **watch**: per-file recompilation driven by change notifications
//!
//! # Build Flow
//!
//! ```text
//! walk() ───────► FileTask ──► compile_task() ──► Compiler::compile() ──► write
//!                    ▲
//! run_watcher() ─────┘
//! ```

pub mod command;
pub mod walk;
pub mod watch;

use crate::error::ToolError;
use crate::paths::FileTask;
use anyhow::Result;
use std::{fs, path::Path};

pub use command::{CommandCompiler, CommandConverter};
pub use walk::walk;
pub use watch::run_watcher;

// ============================================================================
// Collaborators
// ============================================================================

/// Renders one template source file into html.
pub trait Compiler {
    fn compile(&self, path: &Path) -> Result<String>;
}

/// Options forwarded to the html to template converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Indent the generated template with tabs instead of spaces.
    pub tabs: bool,
}

/// Turns html text into template source text.
pub trait Converter {
    fn convert(&self, html: &str, options: &ConvertOptions) -> Result<String>;
}

// ============================================================================
// Compile-and-write
// ============================================================================

/// Compile `task.input` and write the result to `task.output`.
///
/// Existing output is overwritten. The parent directory is created when
/// missing (the watcher may see files in directories the walk never mirrored).
pub fn compile_task(task: &FileTask, compiler: &dyn Compiler) -> Result<()> {
    let html = compiler
        .compile(&task.input)
        .map_err(|e| ToolError::collaborator(&task.input, e))?;

    if let Some(parent) = task.output.parent() {
        fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
    }
    fs::write(&task.output, html).map_err(|e| ToolError::io(&task.output, e))?;

    Ok(())
}

// ============================================================================
// Test doubles
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use anyhow::bail;
    use std::{cell::RefCell, path::PathBuf};

    /// Renders `<rendered>{file contents}</rendered>`; fails on files containing `!error`.
    #[derive(Default)]
    pub struct FakeCompiler {
        pub calls: RefCell<Vec<PathBuf>>,
    }

    impl Compiler for FakeCompiler {
        fn compile(&self, path: &Path) -> Result<String> {
            self.calls.borrow_mut().push(path.to_path_buf());
            let source = fs::read_to_string(path)?;
            if source.contains("!error") {
                bail!("{}:1:1 unexpected token", path.display());
            }
            Ok(format!("<rendered>{}</rendered>", source.trim()))
        }
    }

    impl FakeCompiler {
        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }
}
