//! DealTable Aggregation Engine
//!
//! Summary metrics over a set of deals: sums, counts, the stage breakdown,
//! conversion rate and how many deals close within the next thirty days.
//!
//! All functions here are pure. "Today" is passed in rather than read from
//! the system clock so the same input always yields the same totals.

use crate::deal::{Deal, Stage};
use crate::edit::parse_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Window, in days from today inclusive, for a deal to count as closing soon.
pub const CLOSING_SOON_DAYS: i64 = 30;

/// Totals shown in the dashboard's summary bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_deals: usize,
    pub total_value: f64,
    pub total_forecast: f64,
    pub total_contacts: usize,
    pub avg_deal_value: f64,
    pub stage_breakdown: BTreeMap<String, usize>,
    pub conversion_rate: f64,
    pub closing_soon: usize,
}

impl Totals {
    pub fn stage_count(&self, stage: &str) -> usize {
        self.stage_breakdown.get(stage).copied().unwrap_or(0)
    }
}

/// Row counts and owner breakdown for the grid footer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub visible: usize,
    pub total: usize,
    pub selected: usize,
    pub owner_breakdown: BTreeMap<String, usize>,
}

/// True when the deal's expected close date lies in `[today, today + 30]`.
/// Empty or unparseable dates never count.
pub fn is_closing_soon(deal: &Deal, today: NaiveDate) -> bool {
    match parse_date(&deal.expected_close) {
        Some(close) => {
            let days = (close - today).num_days();
            (0..=CLOSING_SOON_DAYS).contains(&days)
        }
        None => false,
    }
}

/// Compute totals over `records`.
pub fn aggregate<'a, I>(records: I, today: NaiveDate) -> Totals
where
    I: IntoIterator<Item = &'a Deal>,
{
    let mut totals = Totals::default();

    for deal in records {
        totals.total_deals += 1;
        totals.total_value += deal.deal_value;
        totals.total_forecast += deal.forecast_value;
        totals.total_contacts += deal.contacts.len();
        *totals
            .stage_breakdown
            .entry(deal.stage.label().to_string())
            .or_insert(0) += 1;
        if is_closing_soon(deal, today) {
            totals.closing_soon += 1;
        }
    }

    if totals.total_deals > 0 {
        let count = totals.total_deals as f64;
        let won = totals.stage_count(Stage::ClosedWon.label());
        totals.avg_deal_value = totals.total_value / count;
        totals.conversion_rate = 100.0 * won as f64 / count;
    }

    totals
}

/// Totals over the selection when it is non-empty, otherwise over `visible`.
pub fn aggregate_selection(visible: &[&Deal], selected: &[&Deal], today: NaiveDate) -> Totals {
    if selected.is_empty() {
        aggregate(visible.iter().copied(), today)
    } else {
        aggregate(selected.iter().copied(), today)
    }
}

/// Row counts plus the owner breakdown of the visible rows.
pub fn summarize(total: usize, visible: &[&Deal], selected: usize) -> TableSummary {
    let mut owner_breakdown = BTreeMap::new();
    for deal in visible {
        *owner_breakdown.entry(deal.owner.clone()).or_insert(0) += 1;
    }
    TableSummary {
        visible: visible.len(),
        total,
        selected,
        owner_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::seed_deals;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_aggregate_seed_deals() {
        let deals = seed_deals();
        let totals = aggregate(&deals, day("2024-01-01"));

        assert_eq!(totals.total_deals, 5);
        assert_eq!(totals.total_value, 415_000.0);
        assert_eq!(totals.total_forecast, 383_000.0);
        assert_eq!(totals.total_contacts, 12);
        assert_eq!(totals.avg_deal_value, 83_000.0);
        assert_eq!(totals.stage_count("Proposal"), 2);
        assert_eq!(totals.stage_count("Closed Lost"), 0);
        assert!((totals.conversion_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_empty_is_zero_not_nan() {
        let totals = aggregate(std::iter::empty(), day("2024-01-01"));
        assert_eq!(totals.avg_deal_value, 0.0);
        assert_eq!(totals.conversion_rate, 0.0);
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let deals = seed_deals();
        let today = day("2024-02-10");
        assert_eq!(aggregate(&deals, today), aggregate(&deals, today));
    }

    #[test]
    fn test_closing_soon_window() {
        let today = day("2024-02-14");
        let deal = |date: &str| Deal::new("x", "X").with_expected_close(date);

        assert!(is_closing_soon(&deal("2024-02-14"), today));
        assert!(is_closing_soon(&deal("2024-03-15"), today));
        assert!(!is_closing_soon(&deal("2024-03-16"), today));
        assert!(!is_closing_soon(&deal("2024-02-13"), today));
        assert!(!is_closing_soon(&deal(""), today));
        assert!(!is_closing_soon(&deal("soon"), today));
    }

    #[test]
    fn test_closing_soon_counts_seed_deals() {
        let deals = seed_deals();
        // 2024-02-15, 2024-02-28 and 2024-03-15 fall within 30 days of 2024-02-14
        let totals = aggregate(&deals, day("2024-02-14"));
        assert_eq!(totals.closing_soon, 3);
    }

    #[test]
    fn test_selection_overrides_visible_when_non_empty() {
        let deals = seed_deals();
        let visible: Vec<&Deal> = deals.iter().collect();
        let selected: Vec<&Deal> = deals.iter().filter(|d| d.stage == Stage::ClosedWon).collect();
        let today = day("2024-01-01");

        let totals = aggregate_selection(&visible, &selected, today);
        assert_eq!(totals.total_deals, 1);
        assert_eq!(totals.conversion_rate, 100.0);

        let fallback = aggregate_selection(&visible, &[], today);
        assert_eq!(fallback.total_deals, 5);
    }

    #[test]
    fn test_summarize_counts_owners() {
        let deals = seed_deals();
        let visible: Vec<&Deal> = deals.iter().take(3).collect();
        let summary = summarize(deals.len(), &visible, 1);
        assert_eq!(summary.visible, 3);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.selected, 1);
        assert_eq!(summary.owner_breakdown.get("Sam Wilson"), Some(&1));
    }
}
