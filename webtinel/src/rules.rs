use regex::{Regex, RegexBuilder};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{ScanError, ScanResult};

/// One detection rule: the pattern text as written in the rule file plus
/// its compiled, case-insensitive regex.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    regex: Regex,
}

impl Rule {
    /// The pattern text exactly as it appeared in the rule file
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled case-insensitive regex
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// An ordered, immutable set of detection rules. Loaded once per scan
/// and shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Loads rules from a newline-delimited file.
    ///
    /// Blank lines and lines whose trimmed form starts with `#` are
    /// skipped. A missing file, an invalid pattern, or a file that
    /// yields no rules at all is a fatal configuration error.
    pub fn load(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ScanError::rule_file_not_found(path),
            _ => ScanError::IoError(e),
        })?;

        let rules = Self::parse(&content)?;
        if rules.is_empty() {
            return Err(ScanError::empty_rule_set(path));
        }

        info!("Loaded {} rules from {}", rules.len(), path.display());
        Ok(Self { rules })
    }

    /// Compiles rules from rule-file text, preserving line order.
    pub fn parse(content: &str) -> ScanResult<Vec<Rule>> {
        let mut rules = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let pattern = line.trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ScanError::InvalidRule {
                    line: idx + 1,
                    pattern: pattern.to_string(),
                    source: e,
                })?;
            debug!("Compiled rule {}: {}", rules.len() + 1, pattern);
            rules.push(Rule {
                pattern: pattern.to_string(),
                regex,
            });
        }
        Ok(rules)
    }

    /// Builds a rule set directly from pattern strings.
    pub fn from_patterns<I, S>(patterns: I) -> ScanResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let rules = Self::parse(&joined)?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let content = "eval\\(\n\n# shell family\n  \nshell_exec\\(\n   # indented comment\n";
        let rules = RuleSet::parse(content).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern(), "eval\\(");
        assert_eq!(rules[1].pattern(), "shell_exec\\(");
    }

    #[test]
    fn test_rules_are_case_insensitive() {
        let rules = RuleSet::parse("eval\\(").unwrap();
        assert!(rules[0].regex().is_match("EVAL($_POST['x'])"));
        assert!(rules[0].regex().is_match("eval($x)"));
    }

    #[test]
    fn test_order_preserved() {
        let set = RuleSet::from_patterns(["aaa", "bbb", "ccc"]).unwrap();
        let patterns: Vec<_> = set.iter().map(Rule::pattern).collect();
        assert_eq!(patterns, vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_invalid_pattern_reports_line() {
        let content = "eval\\(\n# c\n[unclosed\n";
        let err = RuleSet::parse(content).unwrap_err();
        match err {
            ScanError::InvalidRule { line, pattern, .. } => {
                assert_eq!(line, 3);
                assert_eq!(pattern, "[unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = RuleSet::load(Path::new("/no/such/rules.txt")).unwrap_err();
        assert!(matches!(err, ScanError::RuleFileNotFound(_)));
    }

    #[test]
    fn test_load_comment_only_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# only comments").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   ").unwrap();

        let err = RuleSet::load(&path).unwrap_err();
        assert!(matches!(err, ScanError::EmptyRuleSet(_)));
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.txt");
        std::fs::write(&path, "eval\\(\nbase64_decode\\(\n").unwrap();

        let set = RuleSet::load(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }
}
