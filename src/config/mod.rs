//! Configuration management.
//!
//! Values are layered: built-in defaults, then a TOML file, then `SELFCITE_*`
//! environment variables (nested keys use `__`, e.g.
//! `SELFCITE_ANALYSIS__POLICY=last`). Command-line flags override the result.

mod file_config;

pub use file_config::ConfigFileError;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::attribution::ClassificationPolicy;
use crate::utils::DEFAULT_USER_AGENT;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SELFCITE";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "selfcite.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub scholar: ScholarConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Classification settings for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Self-citation policy
    #[serde(default)]
    pub policy: ClassificationPolicy,

    /// Analyze only the first N publications
    #[serde(default)]
    pub max_publications: Option<usize>,
}

/// Google Scholar fetch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Citing works fetched per publication
    #[serde(default = "default_max_citing_works")]
    pub max_citing_works: usize,

    /// Pause before each page request
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Fetch detail pages for author lists the profile table cuts off with "..."
    #[serde(default = "default_true")]
    pub expand_truncated_authors: bool,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_citing_works: default_max_citing_works(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            expand_truncated_authors: true,
        }
    }
}

fn default_base_url() -> String {
    "https://scholar.google.com".to_string()
}

fn default_max_citing_works() -> usize {
    100
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_true() -> bool {
    true
}

/// Export settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory relative export paths are resolved against
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl ExportConfig {
    /// Resolve an export path against the configured directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.directory {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Defaults plus environment overrides, for runs without a config file
pub fn load_env_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder().add_source(environment()).build()?;

    settings.try_deserialize()
}

/// Look for `./selfcite.toml`, then `<config dir>/scholar-selfcite/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("scholar-selfcite").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.policy, ClassificationPolicy::AnyAuthorOverlap);
        assert_eq!(config.analysis.max_publications, None);
        assert_eq!(config.scholar.max_citing_works, 100);
        assert_eq!(config.scholar.request_delay_ms, 2000);
        assert!(config.scholar.expand_truncated_authors);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("selfcite.toml");
        std::fs::write(
            &path,
            r#"
[analysis]
policy = "last_author_only"
max_publications = 5

[scholar]
request_delay_ms = 500
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.analysis.policy, ClassificationPolicy::LastAuthorOnly);
        assert_eq!(config.analysis.max_publications, Some(5));
        assert_eq!(config.scholar.request_delay_ms, 500);
        assert_eq!(config.scholar.max_citing_works, 100);
    }

    fn config_from_env(vars: &[(&str, &str)]) -> Config {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config::Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_env_overrides_use_single_underscore_prefix() {
        let config = config_from_env(&[
            ("SELFCITE_ANALYSIS__POLICY", "last"),
            ("SELFCITE_SCHOLAR__MAX_CITING_WORKS", "25"),
        ]);
        assert_eq!(config.analysis.policy, ClassificationPolicy::LastAuthorOnly);
        assert_eq!(config.scholar.max_citing_works, 25);
        assert_eq!(config.scholar.request_delay_ms, 2000);
    }

    #[test]
    fn test_env_ignores_other_prefixes() {
        let config = config_from_env(&[("OTHERAPP_ANALYSIS__POLICY", "last")]);
        assert_eq!(config.analysis.policy, ClassificationPolicy::AnyAuthorOverlap);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/selfcite.toml")).is_err());
    }

    #[test]
    fn test_export_resolve() {
        let export = ExportConfig {
            directory: Some(PathBuf::from("/tmp/out")),
        };
        assert_eq!(
            export.resolve(Path::new("records.csv")),
            PathBuf::from("/tmp/out/records.csv")
        );
        assert_eq!(
            export.resolve(Path::new("/abs/records.csv")),
            PathBuf::from("/abs/records.csv")
        );
        assert_eq!(
            ExportConfig::default().resolve(Path::new("records.csv")),
            PathBuf::from("records.csv")
        );
    }
}
