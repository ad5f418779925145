//! Slack search query construction
//!
//! Each (emoji, period) pair maps to two self-contained query strings: one
//! matching the emoji typed in message text, one matching it used as a
//! reaction. Both carry the period's date bounds, so a query can be executed
//! without reference to any engine state.

use crate::periods::Period;

/// Slack rejects very long search strings; stay inside its limit.
pub const MAX_QUERY_LEN: usize = 1000;

/// Text-usage and reaction-usage queries for one (emoji, period) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub text_query: String,
    pub reaction_query: String,
}

/// Build the two search queries for `emoji_name` over `period`.
///
/// Date bounds are inclusive: `after:` the period's first day, `before:` its
/// last calendar day.
pub fn build_period_queries(emoji_name: &str, period: &Period) -> QueryPair {
    let start = period.start().format("%Y-%m-%d");
    let end = period.end().format("%Y-%m-%d");
    let name = escape_emoji_name(emoji_name);

    let text_query = format!(":{}: after:{} before:{}", name, start, end);
    let reaction_query = format!("has::{}: after:{} before:{}", name, start, end);

    log::debug!("Built queries for {} in {} to {}", emoji_name, start, end);
    QueryPair {
        text_query,
        reaction_query,
    }
}

/// Check a built query before dispatch: non-empty, within the length limit,
/// and carrying the `:` emoji delimiter.
pub fn validate_query(query: &str) -> bool {
    if query.is_empty() {
        return false;
    }
    if query.len() > MAX_QUERY_LEN {
        log::warn!("Query too long: {} characters", query.len());
        return false;
    }
    if !query.contains(':') {
        log::warn!("Query missing emoji pattern: {}", query);
        return false;
    }
    true
}

/// Escape an emoji name for safe embedding in a query string.
pub fn escape_emoji_name(emoji_name: &str) -> String {
    emoji_name.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn period(y: i32, m: u32, months: u32) -> Period {
        Period::new(NaiveDate::from_ymd_opt(y, m, 1).unwrap(), months)
    }

    #[test]
    fn test_basic_query_construction() {
        let pair = build_period_queries("smile", &period(2023, 1, 1));

        assert!(pair.text_query.contains(":smile:"));
        assert!(pair.text_query.contains("after:2023-01-01"));
        assert!(pair.text_query.contains("before:2023-01-31"));

        assert!(pair.reaction_query.contains("has::smile:"));
        assert!(pair.reaction_query.contains("after:2023-01-01"));
        assert!(pair.reaction_query.contains("before:2023-01-31"));
    }

    #[test]
    fn test_february_leap_year() {
        let pair = build_period_queries("heart", &period(2024, 2, 1));
        assert!(pair.text_query.contains("before:2024-02-29"));
        assert!(pair.reaction_query.contains("before:2024-02-29"));
    }

    #[test]
    fn test_february_non_leap_year() {
        let pair = build_period_queries("heart", &period(2023, 2, 1));
        assert!(pair.text_query.contains("before:2023-02-28"));
    }

    #[test]
    fn test_multi_month_period_bounds() {
        let pair = build_period_queries("thumbsup", &period(2023, 1, 3));
        assert!(pair.text_query.contains("after:2023-01-01"));
        assert!(pair.text_query.contains("before:2023-03-31"));
    }

    #[test]
    fn test_validate_query() {
        assert!(validate_query(":smile: after:2023-01-01 before:2023-01-31"));
        assert!(!validate_query(""));
        assert!(!validate_query("no delimiter here"));
        assert!(!validate_query(&"x".repeat(MAX_QUERY_LEN + 1)));
    }

    #[test]
    fn test_escape_emoji_name() {
        assert_eq!(escape_emoji_name("smile"), "smile");
        assert_eq!(escape_emoji_name("we\"ird"), "we\\\"ird");
    }
}
