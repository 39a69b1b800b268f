//! graph-ancestry binary
//!
//! Draws the combined ancestry of a set of branches as a Graphviz diagram
//! (or a JSON export) on stdout.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default: graph_ancestry=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for terminals (default: pretty)
//!
//! Logs go to stderr so stdout can be piped straight into `dot`.
//!
//! ## Usage
//!
//! ```bash
//! graph-ancestry --contract feature/ fix/ | dot -Tpng -o ancestry.png
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ancestry_graph::{render_ancestry, AncestryConfig, GitHistory, OutputFormat};

/// Draw a compressed graph of branch ancestry.
#[derive(Debug, Parser)]
#[command(name = "graph-ancestry", version, about)]
struct Args {
    /// Collapse linear stretches of commits into single vertices.
    #[arg(long)]
    contract: bool,

    /// Keep branches whose tip is older than the age cutoff.
    #[arg(long)]
    keep_old_branches: bool,

    /// Repository directory.
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Output format: dot or json.
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Age cutoff in days for branch tips.
    #[arg(long)]
    max_age_days: Option<i64>,

    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Branch name patterns (regular expressions).
    #[arg(value_name = "BRANCH", required = true)]
    branches: Vec<String>,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s).ok_or_else(|| format!("unknown format {s:?} (expected dot or json)"))
}

impl Args {
    fn into_config(self) -> Result<(AncestryConfig, PathBuf), Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AncestryConfig::load(path)?,
            None => AncestryConfig::default(),
        };

        config.branch_patterns = self.branches;
        config.contract |= self.contract;
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(days) = self.max_age_days {
            config.max_branch_age_days = Some(days);
        }
        if self.keep_old_branches {
            config.max_branch_age_days = None;
        }
        Ok((config, self.directory))
    }
}

/// Initialize the tracing subscriber with pretty or JSON format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "graph_ancestry=info,ancestry_graph=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, directory) = args.into_config()?;
    info!(
        directory = %directory.display(),
        patterns = ?config.branch_patterns,
        contract = config.contract,
        format = %config.format,
        "starting graph-ancestry"
    );

    let history = GitHistory::discover(&directory)?;
    let report = render_ancestry(&history, &config)?;

    println!("{}", report.output);
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "graph-ancestry failed");
            ExitCode::FAILURE
        }
    }
}
