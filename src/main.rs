use std::path::PathBuf;
use std::time::{Duration, Instant};

use portprobe::config::{self, ScanConfig};
use portprobe::findings;
use portprobe::ports::PortRange;
use portprobe::report;
use portprobe::scanner;
use portprobe::target::ScanTarget;
use portprobe::types::{Finding, PortResult, ScanResults};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const RULE_WIDTH: usize = 60;

/// portprobe — Fast async TCP port scanner with banner grabbing and heuristic findings.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portprobe",
    version,
    about = "Fast async TCP port scanner with banner grabbing and heuristic findings.",
    long_about = None
)]
struct Cli {
    /// Target IP or hostname.
    target: String,

    /// Port or inclusive port range, e.g. 22 or 1-1000.
    #[arg(short = 'p', long, default_value = config::DEFAULT_PORTS)]
    ports: String,

    /// Connect and banner timeout in seconds.
    #[arg(short = 't', long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: f64,

    /// Max concurrent TCP connect attempts.
    #[arg(short = 'T', long, alias = "concurrency", default_value_t = config::DEFAULT_CONCURRENCY)]
    threads: usize,

    /// Write a JSON report after the scan.
    #[arg(short = 'r', long, default_value_t = false)]
    report: bool,

    /// Directory the JSON report is written to.
    #[arg(long = "report-dir", default_value = ".")]
    report_dir: PathBuf,

    /// Stop admitting new probes after this many seconds.
    #[arg(long = "max-duration")]
    max_duration: Option<f64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG also works.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ports: PortRange = cli
        .ports
        .parse()
        .with_context(|| format!("invalid port specification '{}'", cli.ports))?;
    let max_duration = cli
        .max_duration
        .map(config::timeout_from_secs)
        .transpose()
        .context("invalid --max-duration")?;
    let target = ScanTarget::resolve(&cli.target).await?;
    let scan_config = ScanConfig::new(target, ports, cli.timeout, cli.threads)
        .context("invalid scan configuration")?;

    let started_at = report::now_local();
    println!("portprobe v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Scan started: {}",
        report::iso_timestamp(started_at).replace('T', " ")
    );
    print_scan_header(&scan_config);

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(cancel.clone(), max_duration);

    let (tx, mut rx) = mpsc::unbounded_channel::<PortResult>();
    let printer = tokio::spawn(async move {
        while let Some(found) = rx.recv().await {
            print_discovery(&found);
        }
    });

    let start = Instant::now();
    let results = scanner::scan_with_cancel(&scan_config, cancel, Some(tx)).await;
    let elapsed = start.elapsed();
    // The scan dropped its sender, so the printer drains and exits.
    if let Err(e) = printer.await {
        log::warn!("discovery printer failed: {e}");
    }

    let findings = findings::aggregate(&results.open_ports);
    print_summary(&cli.target, &results, &findings, elapsed);

    if cli.report {
        match report::export_report(
            &cli.report_dir,
            &cli.target,
            report::now_local(),
            results.open_ports,
            &findings,
        ) {
            Ok((_, path)) => println!("\nDetailed report saved to: {}", path.display()),
            Err(e) => eprintln!(
                "\nFailed to write report to {}: {}",
                cli.report_dir.display(),
                e
            ),
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_secs();
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

/// Ctrl-C and the optional scan deadline both cancel the scan.
fn spawn_cancel_triggers(cancel: CancellationToken, max_duration: Option<Duration>) {
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, waiting for in-flight probes...");
            cancel_ctrlc.cancel();
        }
    });

    if let Some(limit) = max_duration {
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            log::info!("scan deadline of {limit:?} reached");
            cancel.cancel();
        });
    }
}

fn print_scan_header(cfg: &ScanConfig) {
    println!("\nScanning {} ports {}", cfg.target(), cfg.ports());
    println!("Using {} concurrent probes", cfg.max_concurrency());
    println!("{:=<w$}", "", w = RULE_WIDTH);
    println!("{:<8} {:<8} {:<15} {}", "PORT", "STATE", "SERVICE", "BANNER");
    println!("{:=<w$}", "", w = RULE_WIDTH);
}

fn print_discovery(found: &PortResult) {
    println!(
        "[+] {:>5}/tcp  OPEN   {:<15} {}",
        found.port, found.service, found.banner
    );
}

fn print_summary(target: &str, results: &ScanResults, findings: &[Finding], elapsed: Duration) {
    println!("\n{:=<w$}", "", w = RULE_WIDTH);
    if results.cancelled {
        println!(
            "Scan cancelled after {:.2} seconds ({}/{} ports probed)",
            elapsed.as_secs_f64(),
            results.scanned_done,
            results.scanned_total
        );
    } else {
        println!("Scan completed in {:.2} seconds", elapsed.as_secs_f64());
    }
    println!("Found {} open ports on {}", results.open_count(), target);

    if !findings.is_empty() {
        println!("\nSECURITY FINDINGS:");
        for f in findings {
            println!("   • {f}");
        }
    }
}
