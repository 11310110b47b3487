use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;
use tracing::{trace, warn};

use crate::errors::ScanResult;
use crate::results::Finding;
use crate::rules::RuleSet;
use crate::severity::classify;

/// Context lines captured on each side of the matching line
const CONTEXT_LINES: usize = 2;
/// Files at or above this size are read through a memory map
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

const MATCH_MARKER: &str = ">>> ";
const CONTEXT_MARKER: &str = "    ";

/// Matches one file at a time against a shared rule set.
///
/// The per-file unit of work: decides which rules trigger, extracts the
/// code context around the first matching line, and classifies severity.
#[derive(Debug)]
pub struct FileMatcher {
    rules: RuleSet,
}

impl FileMatcher {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Scans a single file, producing one Finding per triggered rule.
    ///
    /// Any read or stat failure surfaces as `Err`; the caller (worker)
    /// logs it and moves on, so an unreadable file never aborts the scan.
    pub fn scan_file(&self, path: &Path) -> ScanResult<Vec<Finding>> {
        trace!("Scanning file: {}", path.display());

        let metadata = path.metadata()?;
        let file_size = metadata.len();
        let last_modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let contents = self.read_lossy(path, file_size)?;
        let lines: Vec<&str> = contents.lines().collect();

        let mut findings = Vec::new();
        for rule in self.rules.iter() {
            if !rule.regex().is_match(&contents) {
                continue;
            }

            let context = extract_context(&lines, rule.regex());
            let severity = classify(&context);
            trace!(
                "Rule '{}' triggered in {} ({})",
                rule.pattern(),
                path.display(),
                severity
            );

            findings.push(Finding {
                rule: rule.pattern().to_string(),
                context,
                path: path.to_path_buf(),
                file_size,
                last_modified,
                detected_at: SystemTime::now(),
                severity,
            });
        }

        Ok(findings)
    }

    /// Reads the file content with permissive UTF-8 decoding; invalid
    /// sequences are replaced, never fatal.
    fn read_lossy(&self, path: &Path, size: u64) -> ScanResult<String> {
        if size >= LARGE_FILE_THRESHOLD {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file) }?;
            Ok(decode_lossy(&mmap, path))
        } else {
            let bytes = std::fs::read(path)?;
            Ok(decode_lossy(&bytes, path))
        }
    }
}

fn decode_lossy(bytes: &[u8], path: &Path) -> String {
    let cow = String::from_utf8_lossy(bytes);
    if let std::borrow::Cow::Owned(_) = cow {
        warn!("Invalid UTF-8 replaced in file: {}", path.display());
    }
    cow.into_owned()
}

/// Builds the context snippet for the first line the rule matches.
///
/// Window is the matching line plus up to [`CONTEXT_LINES`] lines on
/// each side, clamped to the file bounds. Each line is trimmed; the
/// matching line carries the `>>> ` marker, context lines a neutral one.
/// Returns an empty string when the rule only matches across line
/// boundaries and no single line triggers it.
fn extract_context(lines: &[&str], regex: &regex::Regex) -> String {
    let Some(hit) = lines.iter().position(|line| regex.is_match(line)) else {
        return String::new();
    };

    let start = hit.saturating_sub(CONTEXT_LINES);
    let end = (hit + CONTEXT_LINES).min(lines.len().saturating_sub(1));

    let mut context = Vec::with_capacity(end - start + 1);
    for (idx, line) in lines.iter().enumerate().take(end + 1).skip(start) {
        let marker = if idx == hit {
            MATCH_MARKER
        } else {
            CONTEXT_MARKER
        };
        context.push(format!("{}{}", marker, line.trim()));
    }
    context.join("\n")
}
