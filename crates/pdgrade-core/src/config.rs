//! Grader configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

/// Top-level pdgrade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Extra TOML dictionary layered over the built-in topics.
    #[serde(default)]
    pub dictionary: Option<PathBuf>,
    /// Max submissions graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Fail submissions with unknown topics instead of scoring them as 0.
    #[serde(default)]
    pub strict_topics: bool,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./pdgrade-results")
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            dictionary: None,
            parallelism: default_parallelism(),
            strict_topics: false,
            output_dir: default_output_dir(),
        }
    }
}

impl GraderConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            parallelism: self.parallelism,
            strict_topics: self.strict_topics,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Parse configuration from a TOML string.
pub fn parse_config_str(content: &str) -> Result<GraderConfig> {
    let mut config: GraderConfig = toml::from_str(content)?;
    config.dictionary = config.dictionary.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);
    Ok(config)
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `pdgrade.toml` in the current directory
/// 2. `~/.config/pdgrade/config.toml`
///
/// Environment variable override: `PDGRADE_DICTIONARY`.
pub fn load_config() -> Result<GraderConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GraderConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("pdgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("using config {}", path.display());
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GraderConfig::default(),
    };

    if let Ok(dict) = std::env::var("PDGRADE_DICTIONARY") {
        if !dict.is_empty() {
            config.dictionary = Some(PathBuf::from(dict));
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("pdgrade"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_PDGRADE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_PDGRADE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_PDGRADE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${X"), "unterminated ${X");
        std::env::remove_var("_PDGRADE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_substituted_values() {
        std::env::set_var("_PDGRADE_SELF_REF", "${_PDGRADE_SELF_REF}");
        assert_eq!(
            resolve_env_vars("a/${_PDGRADE_SELF_REF}/${_PDGRADE_MISSING_VAR}b"),
            "a/${_PDGRADE_SELF_REF}/b"
        );
        std::env::remove_var("_PDGRADE_SELF_REF");
    }

    #[test]
    fn default_config() {
        let config = GraderConfig::default();
        assert_eq!(config.parallelism, 4);
        assert!(!config.strict_topics);
        assert!(config.dictionary.is_none());
        assert_eq!(config.engine_config().parallelism, 4);
    }

    #[test]
    fn parse_config() {
        std::env::set_var("_PDGRADE_DICT_DIR", "/opt/dicts");
        let config = parse_config_str(
            r#"
dictionary = "${_PDGRADE_DICT_DIR}/cts.toml"
parallelism = 8
strict_topics = true
"#,
        )
        .unwrap();
        std::env::remove_var("_PDGRADE_DICT_DIR");

        assert_eq!(config.dictionary, Some(PathBuf::from("/opt/dicts/cts.toml")));
        assert_eq!(config.parallelism, 8);
        assert!(config.engine_config().strict_topics);
        assert_eq!(config.output_dir, PathBuf::from("./pdgrade-results"));
    }

    #[test]
    fn explicit_missing_config_fails() {
        let err = load_config_from(Some(Path::new("/no/such/pdgrade.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdgrade.toml");
        std::fs::write(&path, "parallelism = 2\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.parallelism, 2);
    }
}
