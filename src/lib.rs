//! Rate-limit friendly Slack emoji usage aggregator
//!
//! Counts how often each emoji (standard and workspace-custom) was typed in
//! messages or attached as a reaction over calendar-month
//! aligned periods, via the Slack search API, and renders a pivoted CSV
//! report with per-emoji and grand totals.

pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod periods;
pub mod pivot;
pub mod query;
pub mod report;
pub mod slack;

pub use aggregator::{Aggregator, PairOutcome, RowKey, UsageRow};
pub use config::{ConfigError, Settings};
pub use periods::{generate_periods, generate_periods_from, Period};
pub use pivot::{build_pivot, PivotTable};
pub use query::{build_period_queries, validate_query, QueryPair};
pub use slack::{
    CustomEmoji, HttpTransport, RatePacer, SearchTransport, SlackClient, SlackError, WorkspaceInfo,
};
