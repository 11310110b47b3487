use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while configuring or running a scan.
///
/// Configuration-level variants (`InvalidRoot`, `RuleFileNotFound`,
/// `InvalidRule`, `EmptyRuleSet`, `ConfigError`) are fatal: they are
/// reported before any worker starts. `IoError` raised inside a worker
/// is recovered per file and never aborts the scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid scan root: {0}")]
    InvalidRoot(PathBuf),
    #[error("Rule file not found: {0}")]
    RuleFileNotFound(PathBuf),
    #[error("Invalid rule at line {line}: {pattern}: {source}")]
    InvalidRule {
        line: usize,
        pattern: String,
        source: regex::Error,
    },
    #[error("Rule file contains no rules: {0}")]
    EmptyRuleSet(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid_root(path: impl Into<PathBuf>) -> Self {
        Self::InvalidRoot(path.into())
    }

    pub fn rule_file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RuleFileNotFound(path.into())
    }

    pub fn empty_rule_set(path: impl Into<PathBuf>) -> Self {
        Self::EmptyRuleSet(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("rules/rule.txt");
        let err = ScanError::rule_file_not_found(path);
        assert!(matches!(err, ScanError::RuleFileNotFound(_)));

        let err = ScanError::invalid_root(Path::new("/no/such/dir"));
        assert!(matches!(err, ScanError::InvalidRoot(_)));

        let err = ScanError::empty_rule_set(path);
        assert!(matches!(err, ScanError::EmptyRuleSet(_)));

        let err = ScanError::config_error("missing rules path");
        assert!(matches!(err, ScanError::ConfigError(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::rule_file_not_found("rules/rule.txt");
        assert_eq!(err.to_string(), "Rule file not found: rules/rule.txt");

        let err = ScanError::empty_rule_set("rules/empty.txt");
        assert_eq!(
            err.to_string(),
            "Rule file contains no rules: rules/empty.txt"
        );

        let err = ScanError::config_error("missing rules path");
        assert_eq!(err.to_string(), "Configuration error: missing rules path");
    }
}
