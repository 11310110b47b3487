use serde::Serialize;
use std::fmt;

// Keyword tables checked in strict priority order against the
// lower-cased snippet. First category that matches wins.
const CRITICAL_PATTERNS: &[&str] = &["system(", "passthru(", "pcntl_exec("];
const HIGH_PATTERNS: &[&str] = &["eval(", "exec(", "shell_exec(", "assert("];
const MEDIUM_PATTERNS: &[&str] = &["base64_decode(", "gzinflate(", "str_rot13(", "preg_replace"];

/// Risk classification of a finding, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a matched code snippet.
///
/// Deliberately a fixed keyword table over the snippet content, not a
/// scored model, and independent of which rule triggered the match: a
/// rule targeting obfuscation still classifies CRITICAL when the
/// surrounding context contains a process-execution call.
pub fn classify(snippet: &str) -> Severity {
    let lower = snippet.to_lowercase();

    if CRITICAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Severity::Critical;
    }
    if HIGH_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Severity::High;
    }
    if MEDIUM_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Severity::Medium;
    }
    Severity::Low
}
