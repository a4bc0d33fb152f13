pub mod answer;
pub mod init;
pub mod score;
pub mod topics;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use pdgrade_core::config::GraderConfig;
use pdgrade_core::dictionary::{load_with_builtins, Dictionary};

/// Built-in topics plus the `--dictionary` file, falling back to the one
/// named in config (or `PDGRADE_DICTIONARY`).
pub fn resolve_dictionary(flag: Option<PathBuf>, config: &GraderConfig) -> Result<Dictionary> {
    let path = flag.or_else(|| config.dictionary.clone());
    load_with_builtins(path.as_deref())
}
