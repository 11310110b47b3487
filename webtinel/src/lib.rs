//! Webtinel: a concurrent webshell scanner for PHP, JSP, and Java
//! source trees. Matches files against a rule set of case-insensitive
//! regexes, extracts the code context around each hit, and classifies
//! every finding by severity.

pub mod config;
pub mod errors;
pub mod filters;
pub mod results;
pub mod rules;
pub mod scan;
pub mod severity;

pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use results::{Finding, ScanReport};
pub use rules::{Rule, RuleSet};
pub use scan::{scan, scan_with_signal};
pub use severity::{classify, Severity};
