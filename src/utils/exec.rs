//! External program execution.
//!
//! Every collaborator (template compiler, converter, css purger, formatter)
//! is an external program configured as a command vector. Two ways to run one:
//!
//! - [`exec`]: arguments only, stdout captured (purgecss and its json report)
//! - [`pipe!`](crate::pipe): text on stdin, text back on stdout (pug, html2pug, prettier)
//!
//! On failure the error carries the program's stderr, so the collaborator's
//! own diagnostic reaches the user.

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    ffi::OsString,
    io::{self, ErrorKind, Write},
    process::{Command, Output, Stdio},
    sync::OnceLock,
    thread,
};

// ============================================================================
// Macros
// ============================================================================

/// Run a collaborator as a filter: `input` goes to stdin, stdout is returned
/// as a `String`.
///
/// Empty arguments are dropped, so optional flags can be written as
/// `if cond { "--flag" } else { "" }`.
///
/// # Examples
/// ```ignore
/// let html = pipe!(template.as_bytes(); &config.compile.command; "--path", path)?;
/// let css = pipe!(css.as_bytes(); &config.purge.formatter;)?;
/// ```
#[macro_export]
macro_rules! pipe {
    ($input:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::pipe(
            $input,
            $cmd,
            &$crate::utils::exec::non_empty(&[$(::std::ffi::OsString::from($arg)),*]),
        )
    };
}

/// Drop empty arguments.
#[doc(hidden)]
pub fn non_empty(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

// ============================================================================
// Execution
// ============================================================================

/// Run `cmd` followed by `args` and capture its output.
///
/// # Errors
/// Returns error if the program cannot be started or exits non-zero.
pub fn exec(cmd: &[String], args: &[OsString], filter: &'static FilterRule) -> Result<Output> {
    let (name, mut command) = prepare(cmd, args)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    if !output.status.success() {
        bail!(format_error(&name, &output, filter));
    }
    // Only stderr is logged; stdout is the result
    filter.log(&name, String::from_utf8_lossy(&output.stderr).trim());

    Ok(output)
}

/// Run `cmd` with `input` on stdin and return its stdout.
///
/// Stdin is fed from a separate thread: a collaborator that starts writing
/// before it has consumed all input would otherwise fill the stdout pipe and
/// deadlock against us.
///
/// # Errors
/// Returns error if the program cannot be started, exits non-zero, could not
/// be sent its whole input, or prints non-UTF-8 output.
pub fn pipe(input: &[u8], cmd: &[String], args: &[OsString]) -> Result<String> {
    let (name, mut command) = prepare(cmd, args)?;

    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to spawn `{name}`"))?;

    let mut stdin = child.stdin.take().context("Failed to acquire stdin")?;
    let input = input.to_vec();
    // Dropping stdin at the end of the closure signals EOF to the child
    let writer = thread::spawn(move || stdin.write_all(&input));

    let output = child
        .wait_with_output()
        .with_context(|| format!("`{name}` process failed"))?;

    let written = writer
        .join()
        .map_err(|_| anyhow::anyhow!("Failed to join stdin writer thread"))?;

    if !output.status.success() {
        bail!(format_error(&name, &output, &EMPTY_FILTER));
    }
    check_stdin(&name, written)?;

    EMPTY_FILTER.log(&name, String::from_utf8_lossy(&output.stderr).trim());

    String::from_utf8(output.stdout).with_context(|| format!("`{name}` printed invalid UTF-8"))
}

/// A child that exits successfully without reading all of stdin closes the
/// pipe early; that is its choice. Any other write failure means it worked
/// on partial input.
fn check_stdin(name: &str, written: io::Result<()>) -> Result<()> {
    match written {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => {
            Err(e).with_context(|| format!("Failed to write input to `{name}`"))
        }
        _ => Ok(()),
    }
}

/// Split the program name from the command vector and build the `Command`.
fn prepare(cmd: &[String], args: &[OsString]) -> Result<(String, Command)> {
    let Some((program, leading)) = cmd.split_first() else {
        bail!("Empty command");
    };

    let mut command = Command::new(program);
    command.args(leading).args(args);

    Ok((program.clone(), command))
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex"));
    re.replace_all(s, "")
}

/// Stderr lines to leave out of the log (version banners, known warnings).
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Empty lines and lines starting with a skip prefix are noise.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log the lines that survive the filter under the program's name.
    fn log(&self, name: &str, output: &str) {
        let kept: Vec<_> = output
            .lines()
            .filter(|line| !self.should_skip(strip_ansi(line).trim()))
            .collect();

        if !kept.is_empty() {
            log!(name; "{}", kept.join("\n"));
        }
    }
}

/// Stdout that is a document rather than a diagnostic.
const DOCUMENT_FILTER: FilterRule = FilterRule::new(&["<!DOCTYPE", "<html", "{", "["]);

/// No filtering.
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Error message for a failed run: exit status, filtered stderr and, when it
/// is not a document, stdout.
fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let diagnostic = stderr
        .lines()
        .filter(|line| !filter.should_skip(strip_ansi(line).trim()))
        .collect::<Vec<_>>()
        .join("\n");

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    if !diagnostic.is_empty() {
        msg.push('\n');
        msg.push_str(&diagnostic);
    }

    let stdout = stdout.trim();
    if !DOCUMENT_FILTER.should_skip(stdout) {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_non_empty() {
        let args = [OsString::from("a"), OsString::from(""), OsString::from("b")];
        assert_eq!(non_empty(&args), vec![OsString::from("a"), OsString::from("b")]);
    }

    #[test]
    fn test_prepare_empty() {
        assert!(prepare(&[], &[]).is_err());
    }

    #[test]
    fn test_prepare_splits_program() {
        let (name, command) = prepare(&cmd(&["pug", "--pretty"]), &[OsString::from("--path")]).unwrap();
        assert_eq!(name, "pug");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["--pretty", "--path"]);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["PurgeCSS", "INFO:"]);

        assert!(filter.should_skip("PurgeCSS 6.0.0"));
        assert!(filter.should_skip("INFO: something"));
        assert!(!filter.should_skip("Error: something"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[1;32mGreen Bold\x1b[0m"), "Green Bold");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_check_stdin_tolerates_closed_pipe() {
        let closed = Err(io::Error::new(ErrorKind::BrokenPipe, "closed"));
        assert!(check_stdin("prettier", closed).is_ok());
        assert!(check_stdin("prettier", Ok(())).is_ok());
    }

    #[test]
    fn test_check_stdin_reports_other_failures() {
        let failed = Err(io::Error::new(ErrorKind::Interrupted, "interrupted"));
        let err = check_stdin("prettier", failed).unwrap_err();
        assert!(err.to_string().contains("Failed to write input to `prettier`"));
    }

    #[cfg(unix)]
    #[test]
    fn test_format_error() {
        let output = Output {
            status: Command::new("false").status().unwrap(),
            stdout: b"partial output".to_vec(),
            stderr: b"PurgeCSS 6.0.0\nFatal error".to_vec(),
        };
        static BANNER: FilterRule = FilterRule::new(&["PurgeCSS"]);
        let msg = format_error("purgecss", &output, &BANNER);

        assert!(msg.contains("Command `purgecss` failed"));
        assert!(msg.contains("Fatal error"));
        assert!(!msg.contains("6.0.0"));
        assert!(msg.contains("partial output"));
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_roundtrips_stdin() {
        let out = crate::pipe!(b"p hello"; &cmd(&["cat"]);).unwrap();
        assert_eq!(out, "p hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_drops_empty_args() {
        let out = crate::pipe!(b""; &cmd(&["echo"]); "", "x").unwrap();
        assert_eq!(out, "x\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_child_ignoring_stdin() {
        // Exits without reading; the write side sees a closed pipe
        let input = vec![b'x'; 1 << 20];
        let out = pipe(&input, &cmd(&["true"]), &[]).unwrap();
        assert_eq!(out, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_failure_reports_stderr() {
        let err = crate::pipe!(b""; &cmd(&["sh", "-c", "echo boom >&2; exit 3"]);).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Command `sh` failed"));
        assert!(msg.contains("boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_stdout() {
        let output = exec(&cmd(&["echo"]), &[OsString::from("hi")], &EMPTY_FILTER).unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hi\n");
    }

    #[test]
    fn test_exec_missing_program() {
        assert!(exec(&cmd(&["pugkit-definitely-not-installed"]), &[], &EMPTY_FILTER).is_err());
    }
}
