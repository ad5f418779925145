//! Aggregation engine: one usage row per (emoji, period) pair
//!
//! Drives the query builder and the rate-limited client over every pair in
//! symbol-major, period-minor order. A pair that fails (invalid query,
//! transport error, exhausted retries) degrades to a zero count; it never
//! aborts the run and never skips the pairs after it.

use crate::periods::Period;
use crate::query::{build_period_queries, validate_query};
use crate::slack::SlackClient;

/// Composite row identity shared by the engine and the pivot builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub emoji: String,
    pub period: String,
}

/// One aggregated result: total text + reaction usage for a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    pub key: RowKey,
    pub count: u64,
}

impl UsageRow {
    pub fn new(emoji: &str, period: &str, count: u64) -> Self {
        Self {
            key: RowKey {
                emoji: emoji.to_string(),
                period: period.to_string(),
            },
            count,
        }
    }
}

/// Outcome of executing one pair's two queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    Success(u64),
    Degraded,
}

pub struct Aggregator<'a> {
    client: &'a SlackClient,
}

impl<'a> Aggregator<'a> {
    pub fn new(client: &'a SlackClient) -> Self {
        Self { client }
    }

    /// Aggregate usage for every (emoji, period) pair.
    ///
    /// Emits exactly `emojis.len() * periods.len()` rows in symbol-major,
    /// period-minor order, with degraded pairs recorded as zero counts.
    /// Inputs are never reordered or de-duplicated.
    pub async fn aggregate(&self, emojis: &[String], periods: &[Period]) -> Vec<UsageRow> {
        let mut rows = Vec::with_capacity(emojis.len() * periods.len());
        let total_queries = emojis.len() * periods.len() * 2;
        let mut processed_queries = 0usize;

        log::info!("Total queries to process: {}", total_queries);

        for (emoji_idx, emoji) in emojis.iter().enumerate() {
            log::info!(
                "Processing emoji {}/{}: {}",
                emoji_idx + 1,
                emojis.len(),
                emoji
            );

            for period in periods {
                let label = period.label();
                let count = match self.run_pair(emoji, period).await {
                    PairOutcome::Success(count) => {
                        if count > 0 {
                            log::info!("  {}: {} usages", label, count);
                        } else {
                            log::debug!("  {}: 0 usages", label);
                        }
                        count
                    }
                    PairOutcome::Degraded => {
                        log::debug!("  {}: recorded as 0 after degradation", label);
                        0
                    }
                };

                rows.push(UsageRow::new(emoji, &label, count));

                // A degraded pair still advances by its two queries.
                processed_queries += 2;
                if processed_queries % 10 == 0 {
                    let progress = (processed_queries as f64 / total_queries as f64) * 100.0;
                    log::info!(
                        "Progress: {}/{} queries ({:.1}%)",
                        processed_queries,
                        total_queries,
                        progress
                    );
                }
            }
        }

        log::info!("Aggregation completed: {} records generated", rows.len());
        rows
    }

    /// Execute one pair's text and reaction queries and sum the counts.
    ///
    /// Invalid descriptors degrade without contacting the client; any error
    /// surfaced by either query degrades the whole pair.
    async fn run_pair(&self, emoji: &str, period: &Period) -> PairOutcome {
        let pair = build_period_queries(emoji, period);

        if !validate_query(&pair.text_query) || !validate_query(&pair.reaction_query) {
            log::warn!("Invalid query for {}, recording zero", emoji);
            return PairOutcome::Degraded;
        }

        let text_count = match self.client.search_count(&pair.text_query).await {
            Ok(count) => count,
            Err(e) => {
                log::error!("Text query failed for {}: {}", emoji, e);
                return PairOutcome::Degraded;
            }
        };

        let reaction_count = match self.client.search_count(&pair.reaction_query).await {
            Ok(count) => count,
            Err(e) => {
                log::error!("Reaction query failed for {}: {}", emoji, e);
                return PairOutcome::Degraded;
            }
        };

        PairOutcome::Success(text_count + reaction_count)
    }
}
