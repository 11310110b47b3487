use ignore::WalkBuilder;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};

use super::matcher::FileMatcher;
use super::pool;
use crate::config::{ScanConfig, WORKER_CAP};
use crate::errors::{ScanError, ScanResult};
use crate::filters::should_include_file;
use crate::results::ScanReport;
use crate::rules::RuleSet;

/// Runs a full scan: validate, load rules, enumerate, dispatch to the
/// worker pool.
///
/// Configuration failures (bad root, missing or empty rule file) abort
/// before any worker starts; per-file failures are absorbed inside the
/// pool and only show up in the skip counter.
pub fn scan(config: &ScanConfig) -> ScanResult<ScanReport> {
    let stop = AtomicBool::new(false);
    scan_with_signal(config, &stop)
}

/// Like [`scan`], with a cooperative stop flag. Once the flag is raised,
/// workers finish their current file and exit without draining the
/// remainder of the queue.
pub fn scan_with_signal(config: &ScanConfig, stop: &AtomicBool) -> ScanResult<ScanReport> {
    info!("Starting scan of {}", config.root_path.display());

    if !config.root_path.is_dir() {
        return Err(ScanError::invalid_root(&config.root_path));
    }

    let rules = RuleSet::load(&config.rules_path)?;
    let files = enumerate_files(config);
    info!(
        "Found {} candidate files under {}",
        files.len(),
        config.root_path.display()
    );

    let matcher = FileMatcher::new(rules);
    let worker_count = config.worker_count.get().min(WORKER_CAP);
    let report = pool::run(files, &matcher, worker_count, stop);

    info!(
        "Scan complete: {} findings in {} of {} files ({} skipped)",
        report.findings.len(),
        report.files_flagged,
        report.files_attempted(),
        report.files_skipped
    );

    Ok(report)
}

/// Walks the root recursively and returns every file passing the
/// extension allow-list and ignore globs.
///
/// Standard filters are disabled on purpose: webshells hide in dot
/// directories, and a planted .gitignore must not be able to mask them.
fn enumerate_files(config: &ScanConfig) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(&config.root_path);
    builder.standard_filters(false);

    let files: Vec<PathBuf> = builder
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| {
            should_include_file(
                entry.path(),
                &config.file_extensions,
                &config.ignore_patterns,
            )
        })
        .map(|entry| entry.into_path())
        .collect();

    debug!("Enumerated {} files", files.len());
    files
}
