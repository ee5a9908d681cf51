//! Single-file conversion between html and template source.
//!
//! The direction follows the input extension:
//!
//! | Input              | Collaborator | Default output            |
//! |--------------------|--------------|---------------------------|
//! | `page.html`        | `Converter`  | `page.<source_ext>`       |
//! | `page.<source_ext>`| `Compiler`   | `page.<target_ext>`       |
//! | anything else      | none         | `Unsupported` error       |

use crate::{
    compiler::{CommandCompiler, CommandConverter, Compiler, ConvertOptions, Converter},
    config::ToolConfig,
    error::ToolError,
    log,
    paths::{Extensions, normalize_path, resolve_input_file, swap_extension},
};
use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Convert `input` and write the result. Returns the written path.
pub fn convert_single(
    input: &Path,
    output: Option<&Path>,
    tabs: bool,
    config: &ToolConfig,
) -> Result<PathBuf> {
    convert_file(
        input,
        output,
        &ConvertOptions { tabs },
        &config.extensions(),
        &CommandConverter::new(config),
        &CommandCompiler::new(config),
    )
}

/// Convert with explicit collaborators.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    ext: &Extensions,
    converter: &dyn Converter,
    compiler: &dyn Compiler,
) -> Result<PathBuf> {
    let input = resolve_input_file(input, "input file")?;

    let (text, default_ext) = if Extensions::is_html(&input) {
        let html = fs::read_to_string(&input).map_err(|e| ToolError::io(&input, e))?;
        let template = converter
            .convert(&html, options)
            .map_err(|e| ToolError::collaborator(&input, e))?;
        (template, ext.source.as_str())
    } else if ext.is_source(&input) {
        let html = compiler
            .compile(&input)
            .map_err(|e| ToolError::collaborator(&input, e))?;
        (html, ext.target.as_str())
    } else {
        return Err(ToolError::Unsupported { path: input }.into());
    };

    let output = match output {
        Some(path) => normalize_path(path),
        None => swap_extension(&input, default_ext),
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
    }
    fs::write(&output, text).map_err(|e| ToolError::io(&output, e))?;

    log!("convert"; "{} -> {}", input.display(), output.display());
    Ok(output)
}
