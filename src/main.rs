use anyhow::Result;
use clap::Parser;
use content_aggregator::{CollectorConfig, ContentAggregator};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Collect product/engineering content from all configured sources and print
/// the normalized items as JSON (the hand-off format for the downstream
/// summarization step).
#[derive(Parser, Debug)]
#[command(name = "content-aggregator", version, about)]
struct Args {
    /// Recency window in days for feed sources
    #[arg(long, default_value_t = 7)]
    days_back: i64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Retries after the initial attempt for transient failures
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Overall run deadline in seconds (unset means no deadline)
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = CollectorConfig::default();
    config.days_back = args.days_back;
    config.fetch.timeout = Duration::from_secs(args.timeout_secs);
    config.fetch.max_retries = args.max_retries;
    config.deadline = args.deadline_secs.map(Duration::from_secs);

    info!("collecting content from all sources");
    let aggregator = ContentAggregator::new(config)?;
    let report = aggregator.collect_all().await;

    for outcome in &report.outcomes {
        match &outcome.error {
            None => info!("{}: {} items", outcome.source, outcome.count),
            Some(reason) => warn!("{}: failed ({})", outcome.source, reason),
        }
    }

    let mut per_label: HashMap<&str, usize> = HashMap::new();
    for item in &report.items {
        *per_label.entry(item.source.as_str()).or_default() += 1;
    }
    for (label, count) in &per_label {
        info!("  {}: {} items", label, count);
    }
    info!("total items collected: {}", report.total());

    if report.is_empty() {
        warn!("no items collected; nothing to hand off");
        std::process::exit(1);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&report.items)?
    } else {
        serde_json::to_string(&report.items)?
    };
    println!("{}", json);

    Ok(())
}
