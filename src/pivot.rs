//! Pivot builder: flat usage rows to a dense (emoji x period) report
//!
//! Built once from a completed row batch and never mutated afterwards.
//! Rendering is deterministic: symbols ascending, period columns in
//! ascending label order, fixed derived columns.

use crate::aggregator::UsageRow;
use std::collections::{BTreeMap, BTreeSet};

/// Per-symbol counts in first-occurrence order.
///
/// A duplicate (symbol, period) keeps its original position but takes the
/// last value seen, so the max-period tie-break follows the symbol's own
/// data ordering rather than the rendered column order.
#[derive(Debug, Clone, Default)]
struct SymbolSeries {
    entries: Vec<(String, u64)>,
}

impl SymbolSeries {
    fn insert(&mut self, period: &str, count: u64) {
        match self.entries.iter_mut().find(|(label, _)| label == period) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((period.to_string(), count)),
        }
    }

    fn get(&self, period: &str) -> u64 {
        self.entries
            .iter()
            .find(|(label, _)| label == period)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Label of the highest count; ties keep the first label encountered.
    fn max_period(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (label, count) in &self.entries {
            match best {
                Some((_, best_count)) if *count <= best_count => {}
                _ => best = Some((label, *count)),
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Read-only dense view over a completed set of usage rows.
#[derive(Debug, Clone, Default)]
pub struct PivotTable {
    symbols: BTreeMap<String, SymbolSeries>,
    periods: BTreeSet<String>,
}

impl PivotTable {
    /// Number of distinct period labels observed.
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Number of distinct symbols observed.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Render the table as CSV text, ready to hand to the report sink.
    ///
    /// Header: `emoji, <periods ascending>, total, average, max_period`,
    /// collapsing to `emoji, total` when no periods were observed. One data
    /// row per symbol (ascending), then a blank row and a `TOTAL` footer
    /// with per-period sums, grand total, and grand average. Averages are
    /// fixed to one decimal place; the footer's max_period cell is blank.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let n_periods = self.periods.len();

        if n_periods == 0 {
            out.push_str("emoji,total\n");
            for (symbol, series) in &self.symbols {
                out.push_str(&format!("{},{}\n", symbol, series.total()));
            }
            out.push('\n');
            let grand: u64 = self.symbols.values().map(|s| s.total()).sum();
            out.push_str(&format!("TOTAL,{}\n", grand));
            return out;
        }

        out.push_str("emoji");
        for period in &self.periods {
            out.push(',');
            out.push_str(period);
        }
        out.push_str(",total,average,max_period\n");

        for (symbol, series) in &self.symbols {
            out.push_str(symbol);
            for period in &self.periods {
                out.push_str(&format!(",{}", series.get(period)));
            }
            let total = series.total();
            let average = total as f64 / n_periods as f64;
            out.push_str(&format!(
                ",{},{:.1},{}\n",
                total,
                average,
                series.max_period().unwrap_or("")
            ));
        }

        out.push('\n');

        out.push_str("TOTAL");
        let mut grand_total = 0u64;
        for period in &self.periods {
            let sum: u64 = self.symbols.values().map(|s| s.get(period)).sum();
            grand_total += sum;
            out.push_str(&format!(",{}", sum));
        }
        let grand_average = grand_total as f64 / n_periods as f64;
        out.push_str(&format!(",{},{:.1},\n", grand_total, grand_average));

        out
    }
}

/// Build a pivot table from flat usage rows.
///
/// Rows are grouped by symbol, then period label; a duplicate key keeps the
/// last value seen.
pub fn build_pivot(rows: &[UsageRow]) -> PivotTable {
    let mut table = PivotTable::default();

    for row in rows {
        table.periods.insert(row.key.period.clone());
        table
            .symbols
            .entry(row.key.emoji.clone())
            .or_default()
            .insert(&row.key.period, row.count);
    }

    table
}
