use std::path::PathBuf;

use ab_verdict::experiment::AnalysisResult;
use ab_verdict::request::AnalyzeRequest;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ab-verdict")]
#[command(version)]
#[command(about = "Analyze A/B/n experiment summary statistics", long_about = None)]
struct Cli {
    /// JSON request file (`-` reads stdin)
    #[arg(value_name = "INPUT", default_value = "-")]
    input: PathBuf,

    /// Input is a JSON array of requests, analyzed independently
    #[arg(short, long)]
    batch: bool,

    /// Pretty-print the JSON result
    #[arg(short, long)]
    pretty: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize tracing subscriber on stderr; stdout carries only JSON
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to encode result")
}

/// One batch entry: either the result or the error kind and message.
#[derive(Serialize)]
#[serde(untagged)]
enum BatchEntry {
    Ok(AnalysisResult),
    Err { error: &'static str, message: String },
}

fn run_batch(raw: &str) -> Result<Vec<BatchEntry>> {
    let requests: Vec<AnalyzeRequest> =
        serde_json::from_str(raw).context("Failed to decode batch request")?;

    #[cfg(feature = "rayon")]
    let results = ab_verdict::batch::analyze_many(&requests);
    #[cfg(not(feature = "rayon"))]
    let results: Vec<_> = requests.iter().map(AnalyzeRequest::analyze).collect();

    Ok(results
        .into_iter()
        .map(|r| match r {
            Ok(result) => BatchEntry::Ok(result),
            Err(e) => BatchEntry::Err {
                error: e.kind(),
                message: e.to_string(),
            },
        })
        .collect())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let raw = ab_verdict::request::read_source(&cli.input)
        .with_context(|| format!("Failed to read request from {}", cli.input.display()))?;
    let output = if cli.batch {
        render(&run_batch(&raw)?, cli.pretty)?
    } else {
        let result = ab_verdict::request::analyze_json(&raw).context("Analysis failed")?;
        render(&result, cli.pretty)?
    };

    println!("{output}");
    Ok(())
}
