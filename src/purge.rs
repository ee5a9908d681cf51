//! Unused css removal.
//!
//! # Pipeline
//!
//! ```text
//! html file/dir ──► collect_html_files()
//!                          │
//! stylesheet ─────► CssPurger::purge() ──► strip_comments() ──► Formatter::format() ──► write
//!                                          ([purge.strip_comments])   (skipped when [purge.formatter] = [])
//! ```

use crate::{
    config::ToolConfig,
    error::ToolError,
    log,
    paths::{normalize_path, resolve_input_file, resolve_input_path, swap_extension},
    pipe,
    utils::{
        css::{collect_html_files, parse_purge_report, strip_comments},
        exec::{FilterRule, exec},
    },
};
use anyhow::{Result, anyhow};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Collaborators
// ============================================================================

/// Removes rules whose selectors never appear in `content`.
pub trait CssPurger {
    fn purge(&self, css: &Path, content: &[PathBuf], safelist: &[String]) -> Result<String>;
}

/// Pretty-prints a stylesheet.
pub trait Formatter {
    fn format(&self, css: &str) -> Result<String>;
}

/// Purgecss filter: skip the version banner.
static PURGECSS_FILTER: FilterRule = FilterRule::new(&["PurgeCSS"]);

/// `purgecss --css <file> --content <html...> --safelist <selector...>`
#[derive(Debug, Clone)]
pub struct CommandPurger {
    command: Vec<String>,
}

impl CommandPurger {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            command: config.purge.command.clone(),
        }
    }
}

impl CssPurger for CommandPurger {
    fn purge(&self, css: &Path, content: &[PathBuf], safelist: &[String]) -> Result<String> {
        let mut args: Vec<OsString> = vec!["--css".into(), css.into(), "--content".into()];
        args.extend(content.iter().map(OsString::from));
        if !safelist.is_empty() {
            args.push("--safelist".into());
            args.extend(safelist.iter().map(OsString::from));
        }

        let output = exec(&self.command, &args, &PURGECSS_FILTER)?;
        parse_purge_report(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Css formatter run as a filter, `prettier --parser css` by default.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    command: Vec<String>,
}

impl CommandFormatter {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            command: config.purge.formatter.clone(),
        }
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, css: &str) -> Result<String> {
        pipe!(css.as_bytes(); &self.command;)
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// A resolved purge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeJob {
    pub css: PathBuf,
    pub content: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Purge the configured (or given) stylesheet against `html`. Returns the written path.
pub fn purge_unused(
    html: &Path,
    css: Option<&Path>,
    output: Option<&Path>,
    config: &ToolConfig,
) -> Result<PathBuf> {
    let job = resolve_job(html, css, output, config)?;
    let formatter = CommandFormatter::new(config);
    let formatter: Option<&dyn Formatter> = if config.purge.formatter.is_empty() {
        None
    } else {
        Some(&formatter)
    };

    run_purge(&job, config, &CommandPurger::new(config), formatter)?;
    Ok(job.output)
}

/// Validate inputs and work out where the result goes.
///
/// Default output: `page.html` → `page.css`; `dist/` → `dist/<stylesheet name>`.
/// When that default is the stylesheet itself, `<stem>.purged.css` is used instead.
pub fn resolve_job(
    html: &Path,
    css: Option<&Path>,
    output: Option<&Path>,
    config: &ToolConfig,
) -> Result<PurgeJob> {
    let html = resolve_input_path(html, "html input")?;

    let css = resolve_input_file(css.unwrap_or(config.purge.css.as_path()), "stylesheet")?;

    let content = collect_html_files(&html)?;
    if content.is_empty() {
        return Err(anyhow!("no html files found in {}", html.display()));
    }

    let output = match output {
        Some(path) => {
            let path = normalize_path(path);
            if path == css {
                return Err(anyhow!(
                    "output would overwrite the stylesheet being purged: {}",
                    css.display()
                ));
            }
            path
        }
        None => {
            let output = if html.is_dir() {
                let name = css
                    .file_name()
                    .ok_or_else(|| anyhow!("stylesheet has no file name: {}", css.display()))?;
                html.join(name)
            } else {
                swap_extension(&html, "css")
            };
            // The source stylesheet must survive so the purge can be rerun
            if output == css { purged_sibling(&css) } else { output }
        }
    };

    Ok(PurgeJob {
        css,
        content,
        output,
    })
}

/// `dist/bootstrap.css` → `dist/bootstrap.purged.css`
fn purged_sibling(css: &Path) -> PathBuf {
    let stem = css.file_stem().unwrap_or_default().to_string_lossy();
    css.with_file_name(format!("{stem}.purged.css"))
}

/// Purge, strip comments, format and write.
pub fn run_purge(
    job: &PurgeJob,
    config: &ToolConfig,
    purger: &dyn CssPurger,
    formatter: Option<&dyn Formatter>,
) -> Result<()> {
    log!(
        "purge";
        "{} against {} html file(s)",
        job.css.display(),
        job.content.len()
    );
    let mut css = purger
        .purge(&job.css, &job.content, &config.purge.safelist)
        .map_err(|e| ToolError::collaborator(&job.css, e))?;
    if css.trim().is_empty() {
        return Err(
            ToolError::collaborator(&job.css, anyhow!("purger returned no css")).into(),
        );
    }

    if config.purge.strip_comments {
        css = strip_comments(&css).into_owned();
    }

    if let Some(formatter) = formatter {
        log!("purge"; "formatting");
        css = formatter
            .format(&css)
            .map_err(|e| ToolError::collaborator(&job.css, e))?;
    }

    if let Some(parent) = job.output.parent() {
        fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
    }
    fs::write(&job.output, css).map_err(|e| ToolError::io(&job.output, e))?;

    log!("purge"; "wrote {}", job.output.display());
    Ok(())
}
