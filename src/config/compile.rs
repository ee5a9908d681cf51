//! `[compile]` section configuration.
//!
//! Template compiler command and the source/target extension pair.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[compile]` section in pugkit.toml - template compilation.
///
/// # Example
/// ```toml
/// [compile]
/// command = ["pug", "--pretty"]   # template on stdin, html on stdout
/// path_flag = "--path"            # "" to not pass the file path
/// source_ext = "pug"
/// target_ext = "html"
/// output_dir = "output"
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Compiler command. Template text is piped to stdin, html read from stdout.
    #[serde(default = "defaults::compile::command")]
    #[educe(Default = defaults::compile::command())]
    pub command: Vec<String>,

    /// Flag used to hand the source path to the compiler (for relative includes).
    #[serde(default = "defaults::compile::path_flag")]
    #[educe(Default = defaults::compile::path_flag())]
    pub path_flag: String,

    /// Extension of template source files, without the dot.
    #[serde(default = "defaults::compile::source_ext")]
    #[educe(Default = defaults::compile::source_ext())]
    pub source_ext: String,

    /// Extension of rendered files, without the dot.
    #[serde(default = "defaults::compile::target_ext")]
    #[educe(Default = defaults::compile::target_ext())]
    pub target_ext: String,

    /// Output subdirectory created under the input when `--output` is omitted.
    #[serde(default = "defaults::compile::output_dir")]
    #[educe(Default = defaults::compile::output_dir())]
    pub output_dir: String,
}
