use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::severity::Severity;

fn serialize_timestamp<S: Serializer>(time: &SystemTime, ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_str(&humantime::format_rfc3339_seconds(*time))
}

/// One confirmed rule match in one file.
///
/// Findings are append-only: created by a worker during matching, never
/// mutated afterwards. A single file contributes one Finding per
/// distinct triggered rule.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// The rule pattern that triggered, as written in the rule file
    pub rule: String,
    /// Context snippet: the first matching line plus up to two lines on
    /// each side, trimmed; the matching line carries a `>>> ` marker
    pub context: String,
    /// Path of the flagged file
    pub path: PathBuf,
    /// File size in bytes at scan time
    pub file_size: u64,
    /// Last-modified timestamp of the file
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_modified: SystemTime,
    /// When the match was detected
    #[serde(serialize_with = "serialize_timestamp")]
    pub detected_at: SystemTime,
    /// Risk classification derived from the context snippet
    pub severity: Severity,
}

impl Finding {
    /// Last-modified timestamp formatted as RFC 3339 (second precision)
    pub fn last_modified_rfc3339(&self) -> String {
        humantime::format_rfc3339_seconds(self.last_modified).to_string()
    }

    /// Detection timestamp formatted as RFC 3339 (second precision)
    pub fn detected_at_rfc3339(&self) -> String {
        humantime::format_rfc3339_seconds(self.detected_at).to_string()
    }
}

/// Aggregated output of one scan run.
///
/// Findings arrive from workers in no particular order; only the counts
/// are meaningful across runs.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// All findings, in discovery order (unspecified across workers)
    pub findings: Vec<Finding>,
    /// Files scanned to completion
    pub files_scanned: usize,
    /// Files that produced at least one finding
    pub files_flagged: usize,
    /// Files skipped because they could not be read
    pub files_skipped: usize,
}

impl ScanReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the outcome of one successfully scanned file
    pub fn add_scanned(&mut self, findings: Vec<Finding>) {
        self.files_scanned += 1;
        if !findings.is_empty() {
            self.files_flagged += 1;
        }
        self.findings.extend(findings);
    }

    /// Records a file that could not be read
    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    /// Files attempted, whether scanned or skipped
    pub fn files_attempted(&self) -> usize {
        self.files_scanned + self.files_skipped
    }

    /// Merges another report into this one
    pub fn merge(&mut self, other: ScanReport) {
        self.files_scanned += other.files_scanned;
        self.files_flagged += other.files_flagged;
        self.files_skipped += other.files_skipped;
        self.findings.extend(other.findings);
    }
}
