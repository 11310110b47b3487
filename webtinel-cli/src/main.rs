use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webtinel::{scan, Finding, RuleSet, ScanConfig, ScanReport, Severity};

#[derive(Parser)]
#[command(
    name = "webtinel",
    version,
    about = "Concurrent webshell scanner for PHP, JSP, and Java source trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree for webshell patterns
    Scan(Box<CliScanConfig>),

    /// Validate a rule file and list its patterns
    Rules {
        /// Path to the rule file
        #[arg(short, long, default_value = "rules/rule.txt")]
        rules: PathBuf,
    },
}

#[derive(Parser)]
struct CliScanConfig {
    /// Root directory to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Path to the newline-delimited regex rule file
    #[arg(short, long, default_value = "rules/rule.txt")]
    rules: PathBuf,

    /// Number of scan workers (default: min(CPU count, 4))
    #[arg(short = 'j', long)]
    workers: Option<NonZeroUsize>,

    /// File extensions to scan, comma separated (e.g. php,jsp,java)
    #[arg(short, long)]
    extensions: Option<String>,

    /// Paths to skip (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Show only statistics, not individual findings
    #[arg(short, long)]
    stats: bool,

    /// Emit findings as JSON instead of the formatted report
    #[arg(long)]
    json: bool,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(config) => run_scan(*config),
        Commands::Rules { rules } => {
            let set = RuleSet::load(&rules)?;
            println!(
                "{} rules loaded from {}",
                set.len().to_string().green(),
                rules.display()
            );
            for (i, rule) in set.iter().enumerate() {
                println!("{:>4}. {}", i + 1, rule.pattern());
            }
            Ok(())
        }
    }
}

fn run_scan(cli: CliScanConfig) -> anyhow::Result<()> {
    let file_extensions = cli
        .extensions
        .as_ref()
        .map(|e| {
            e.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| vec!["php".into(), "jsp".into(), "java".into()]);

    let mut cli_config = ScanConfig::with_root(cli.root);
    cli_config.rules_path = cli.rules;
    cli_config.file_extensions = file_extensions;
    cli_config.ignore_patterns = cli.ignore;
    cli_config.stats_only = cli.stats;
    cli_config.log_level = cli.log_level;

    // Discovered config files sit under the CLI flags; an explicit
    // -j wins over any file-set worker count
    let mut scan_config = ScanConfig::load_from(cli.config.as_deref())?.merge_with_cli(cli_config);
    if let Some(workers) = cli.workers {
        scan_config.worker_count = workers;
    }

    init_logging(&scan_config.log_level);

    let report = scan(&scan_config)?;
    tracing::debug!(
        "Scan finished: {} findings across {} files",
        report.findings.len(),
        report.files_attempted()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.findings)?);
    } else {
        print_report(&report, cli.stats);
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Diagnostics go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => severity.as_str().bright_red().bold(),
        Severity::High => severity.as_str().red(),
        Severity::Medium => severity.as_str().yellow(),
        Severity::Low => severity.as_str().green(),
    }
}

fn print_finding(finding: &Finding) {
    println!("\n{}", "╔════ Threat Details ════".blue());
    println!("{} {}", "║ File:".cyan(), finding.path.display());
    println!("{} {} bytes", "║ Size:".cyan(), finding.file_size);
    println!(
        "{} {}",
        "║ Last Modified:".cyan(),
        finding.last_modified_rfc3339()
    );
    println!(
        "{} {}",
        "║ Detection Time:".cyan(),
        finding.detected_at_rfc3339()
    );
    println!(
        "{} {}",
        "║ Threat Level:".cyan(),
        severity_label(finding.severity)
    );
    println!("{} {}", "║ Matched Pattern:".cyan(), finding.rule);
    println!("{}", "║ Code Context:".cyan());
    println!("{}", finding.context);
    println!("{}", format!("╚{}", "═".repeat(60)).blue());
}

fn print_report(report: &ScanReport, stats_only: bool) {
    if report.findings.is_empty() {
        println!("{}", "No malicious patterns detected.".green());
    } else if stats_only {
        print_summary(report);
        return;
    } else {
        println!(
            "{}",
            "═══════════════════ Threat Detection Results ═══════════════════".cyan()
        );
        for finding in &report.findings {
            print_finding(finding);
        }
    }
    print_summary(report);
}

fn print_summary(report: &ScanReport) {
    println!(
        "\nScanned {} files: {} flagged, {} findings, {} skipped",
        report.files_attempted(),
        report.files_flagged,
        report.findings.len(),
        report.files_skipped
    );
}
