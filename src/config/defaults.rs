//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [compile] Section Defaults
// ============================================================================

pub mod compile {
    pub fn command() -> Vec<String> {
        vec!["pug".into(), "--pretty".into()]
    }

    pub fn path_flag() -> String {
        "--path".into()
    }

    pub fn source_ext() -> String {
        "pug".into()
    }

    pub fn target_ext() -> String {
        "html".into()
    }

    pub fn output_dir() -> String {
        "output".into()
    }
}

// ============================================================================
// [convert] Section Defaults
// ============================================================================

pub mod convert {
    pub fn command() -> Vec<String> {
        vec!["html2pug".into()]
    }

    pub fn tabs_flag() -> String {
        "--tabs".into()
    }
}

// ============================================================================
// [purge] Section Defaults
// ============================================================================

pub mod purge {
    use std::path::PathBuf;

    pub fn command() -> Vec<String> {
        vec!["purgecss".into()]
    }

    pub fn formatter() -> Vec<String> {
        vec!["prettier".into(), "--parser".into(), "css".into()]
    }

    pub fn css() -> PathBuf {
        "dist/bootstrap.css".into()
    }

    pub fn safelist() -> Vec<String> {
        vec!["active".into(), "show".into(), "modal-backdrop".into()]
    }
}

// ============================================================================
// [watch] Section Defaults
// ============================================================================

pub mod watch {
    pub fn debounce_ms() -> u64 {
        300
    }

    pub fn stable_retries() -> usize {
        20
    }
}
