//! CLI entry point for the emoji usage aggregator
//!
//! ## Usage
//!
//! ```bash
//! emoji-usage --months 12 --interval 3 --output emoji_usage.csv
//! ```
//!
//! ## Environment Variables
//!
//! - SLACK_TOKEN - Slack API bearer token (required)
//! - SLACK_API_BASE - API base URL (default: https://slack.com/api)
//! - MIN_INTERVAL_SECS - Minimum spacing between API calls (default: 5.0)
//! - MAX_RETRIES - Rate-limit retry budget per call (default: 3)
//! - MONTHS - Total span in months (default: 12)
//! - INTERVAL_MONTHS - Period width in months (default: 1)
//! - OUTPUT_PATH - Report destination (default: emoji_usage.csv)
//! - RUST_LOG - Logging level (optional, default: info)

use clap::Parser;
use emoji_usage::aggregator::{Aggregator, UsageRow};
use emoji_usage::catalog;
use emoji_usage::config::Settings;
use emoji_usage::periods::{generate_periods, Period};
use emoji_usage::pivot::build_pivot;
use emoji_usage::report;
use emoji_usage::slack::{HttpTransport, RatePacer, SlackClient};
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[command(name = "emoji-usage")]
#[command(version, about = "Rate-limit friendly Slack emoji usage aggregator")]
struct Cli {
    /// Number of months to aggregate
    #[arg(short = 'm', long)]
    months: Option<u32>,

    /// Aggregation interval in months
    #[arg(short = 'i', long)]
    interval: Option<u32>,

    /// Output CSV path
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Exclude standard emojis
    #[arg(long)]
    no_standard: bool,

    /// Aggregate standard emojis only
    #[arg(long)]
    only_standard: bool,

    /// Exclude workspace-custom emojis
    #[arg(long)]
    no_custom: bool,

    /// Aggregate workspace-custom emojis only
    #[arg(long)]
    only_custom: bool,

    /// Cap the number of emojis processed (trial runs)
    #[arg(long, value_name = "N")]
    max_emojis: Option<usize>,

    /// Show debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Resolve the selection flags into (include_standard, include_custom).
    fn emoji_selection(&self) -> Result<(bool, bool), String> {
        if self.only_standard && self.only_custom {
            return Err("--only-standard and --only-custom cannot be combined".to_string());
        }
        if self.only_standard && (self.no_standard || self.no_custom) {
            return Err("--only-standard cannot be combined with exclusion flags".to_string());
        }
        if self.only_custom && (self.no_standard || self.no_custom) {
            return Err("--only-custom cannot be combined with exclusion flags".to_string());
        }

        let (include_standard, include_custom) = if self.only_standard {
            (true, false)
        } else if self.only_custom {
            (false, true)
        } else {
            (!self.no_standard, !self.no_custom)
        };

        if !include_standard && !include_custom {
            return Err("cannot exclude both standard and custom emojis".to_string());
        }

        Ok((include_standard, include_custom))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    if let Err(e) = run(cli).await {
        log::error!("Aggregation failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (include_standard, include_custom) = cli.emoji_selection()?;

    let mut settings = Settings::from_env()?;
    if let Some(months) = cli.months {
        settings.months = months;
    }
    if let Some(interval) = cli.interval {
        settings.interval_months = interval;
    }
    if let Some(output) = cli.output {
        settings.output_path = output;
    }
    settings.validate()?;

    log::info!("🚀 Starting emoji usage aggregation");
    log::info!("   Target months: {}", settings.months);
    log::info!("   Interval: {} month(s)", settings.interval_months);
    log::info!("   Output path: {}", settings.output_path);
    log::info!(
        "   Standard emojis: {}, custom emojis: {}",
        include_standard,
        include_custom
    );

    // Fail on a bad destination before any API traffic.
    report::validate_output_path(&settings.output_path)?;
    report::backup_existing_file(&settings.output_path);

    let transport = HttpTransport::new(&settings.api_base, &settings.slack_token)?;
    let pacer = RatePacer::from_secs_f64(settings.min_interval_secs);
    let client = SlackClient::new(Box::new(transport), pacer, settings.max_retries);

    if let Some(workspace) = client.workspace_info().await {
        log::info!("Workspace: {}", workspace.name);
    }

    log::info!("Loading emoji list...");
    let mut emojis = catalog::load_emojis(&client, include_standard, include_custom).await;
    if emojis.is_empty() {
        return Err("no emojis loaded".into());
    }
    if let Some(max) = cli.max_emojis {
        emojis = catalog::filter_emojis(emojis, max);
    }
    log::info!("Processing {} emojis", emojis.len());

    let periods = generate_periods(settings.months, settings.interval_months);
    log::info!("Processing {} periods", periods.len());

    let rows = Aggregator::new(&client).aggregate(&emojis, &periods).await;

    log::info!("Writing results to CSV...");
    let table = build_pivot(&rows);
    report::write_report(&table.render(), &settings.output_path)?;

    log_statistics(&rows, &emojis, &periods);
    log::info!("✅ Emoji usage aggregation completed: {}", settings.output_path);
    Ok(())
}

/// Post-run summary: totals, non-zero rows, and the top ten emojis.
fn log_statistics(rows: &[UsageRow], emojis: &[String], periods: &[Period]) {
    let total_usage: u64 = rows.iter().map(|r| r.count).sum();
    let non_zero = rows.iter().filter(|r| r.count > 0).count();

    let mut usage_by_emoji: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        *usage_by_emoji.entry(row.key.emoji.as_str()).or_insert(0) += row.count;
    }
    let mut top: Vec<(&str, u64)> = usage_by_emoji.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    top.truncate(10);

    log::info!("=== Aggregation Statistics ===");
    log::info!("Total records: {}", rows.len());
    log::info!("Total usage count: {}", total_usage);
    log::info!("Records with usage > 0: {}", non_zero);
    log::info!("Emojis processed: {}", emojis.len());
    log::info!("Periods processed: {}", periods.len());
    for (i, (emoji, count)) in top.iter().enumerate() {
        log::info!("  {}. {}: {} usages", i + 1, emoji, count);
    }
    log::info!("===============================");
}
