use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};

/// Hard upper bound on the worker pool size.
pub const WORKER_CAP: usize = 4;

/// Configuration for a scan.
///
/// Values can be loaded from YAML files in order of precedence:
/// 1. Custom config file passed via `--config`
/// 2. Local `.webtinel.yaml` in the current directory
/// 3. Global `$CONFIG_DIR/webtinel/config.yaml`
///
/// CLI arguments take precedence over file values; the merging behavior
/// lives in [`ScanConfig::merge_with_cli`].
///
/// Example:
/// ```yaml
/// root_path: "/var/www"
/// rules_path: "rules/rule.txt"
/// file_extensions:
///   - "php"
///   - "jsp"
/// ignore_patterns:
///   - "vendor/**"
/// worker_count: 4
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root directory to scan
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Path to the newline-delimited regex rule file
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,

    /// File extensions eligible for scanning (case-sensitive suffix match)
    #[serde(default = "default_extensions")]
    pub file_extensions: Vec<String>,

    /// Paths to skip (glob syntax), e.g. "vendor/**"
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Whether to only report statistics instead of individual findings
    #[serde(default)]
    pub stats_only: bool,

    /// Number of scan workers; clamped to min(CPU count, 4) by default
    #[serde(default = "default_worker_count")]
    pub worker_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_rules_path() -> PathBuf {
    PathBuf::from("rules/rule.txt")
}

fn default_extensions() -> Vec<String> {
    vec!["php".to_string(), "jsp".to_string(), "java".to_string()]
}

pub(crate) fn default_worker_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().min(WORKER_CAP).max(1)).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl ScanConfig {
    /// Creates a configuration for the given root with all defaults.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root.into(),
            rules_path: default_rules_path(),
            file_extensions: default_extensions(),
            ignore_patterns: Vec::new(),
            stats_only: false,
            worker_count: default_worker_count(),
            log_level: default_log_level(),
        }
    }

    /// Loads configuration from the default locations plus an optional
    /// explicit file.
    ///
    /// Absent files are skipped, so with no config file anywhere this
    /// yields a fully-defaulted configuration.
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("webtinel/config.yaml")),
            // Local config
            Some(PathBuf::from(".webtinel.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ScanError::config_error(e.to_string()))
    }

    /// Merges CLI arguments with configuration file values; CLI values
    /// take precedence. The worker count is left to the caller, which
    /// knows whether the flag was given explicitly.
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        if cli_config.root_path != PathBuf::from(".") {
            self.root_path = cli_config.root_path;
        }
        if cli_config.rules_path != default_rules_path() {
            self.rules_path = cli_config.rules_path;
        }
        if cli_config.file_extensions != default_extensions() {
            self.file_extensions = cli_config.file_extensions;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.stats_only {
            self.stats_only = true;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }
}
