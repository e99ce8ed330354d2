//! DealTable Filter Engine
//!
//! Filtering is a pure function of the record slice and the criteria. Input
//! order is preserved and the records themselves are never touched.

use crate::deal::Deal;
use serde::{Deserialize, Serialize};

/// Value range applied when nothing narrower has been chosen.
pub const DEFAULT_DEAL_VALUE_RANGE: (f64, f64) = (0.0, 200_000.0);

/// Filter settings for the deals grid.
///
/// A deal passes iff it satisfies every clause. An empty stage or owner list
/// accepts everything. The value range is inclusive on both ends; a range with
/// `min > max` matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search: String,
    pub stage: Vec<String>,
    pub owner: Vec<String>,
    pub deal_value_range: (f64, f64),
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            search: String::new(),
            stage: Vec::new(),
            owner: Vec::new(),
            deal_value_range: DEFAULT_DEAL_VALUE_RANGE,
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for stage in stages {
            self.add_stage(stage);
        }
        self
    }

    pub fn with_owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for owner in owners {
            self.add_owner(owner);
        }
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.deal_value_range = (min, max);
        self
    }

    /// Returns false when the stage was already present.
    pub fn add_stage(&mut self, stage: impl Into<String>) -> bool {
        add_unique(&mut self.stage, stage.into())
    }

    pub fn remove_stage(&mut self, stage: &str) -> bool {
        remove_entry(&mut self.stage, stage)
    }

    /// Returns false when the owner was already present.
    pub fn add_owner(&mut self, owner: impl Into<String>) -> bool {
        add_unique(&mut self.owner, owner.into())
    }

    pub fn remove_owner(&mut self, owner: &str) -> bool {
        remove_entry(&mut self.owner, owner)
    }

    /// Reset every clause to its default.
    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    /// True when any clause is narrower than the defaults.
    pub fn is_active(&self) -> bool {
        let (min, max) = self.deal_value_range;
        !self.search.is_empty()
            || !self.stage.is_empty()
            || !self.owner.is_empty()
            || min > DEFAULT_DEAL_VALUE_RANGE.0
            || max < DEFAULT_DEAL_VALUE_RANGE.1
    }

    pub fn matches_search(&self, deal: &Deal) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        [
            deal.deal.as_str(),
            deal.owner.as_str(),
            deal.accounts.as_str(),
            deal.contacts.to_display().as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn matches_stage(&self, deal: &Deal) -> bool {
        self.stage.is_empty() || self.stage.iter().any(|s| s == deal.stage.label())
    }

    pub fn matches_owner(&self, deal: &Deal) -> bool {
        self.owner.is_empty() || self.owner.iter().any(|o| *o == deal.owner)
    }

    pub fn matches_range(&self, deal: &Deal) -> bool {
        let (min, max) = self.deal_value_range;
        min <= deal.deal_value && deal.deal_value <= max
    }

    pub fn matches(&self, deal: &Deal) -> bool {
        self.matches_search(deal)
            && self.matches_stage(deal)
            && self.matches_owner(deal)
            && self.matches_range(deal)
    }
}

fn add_unique(entries: &mut Vec<String>, value: String) -> bool {
    if entries.contains(&value) {
        false
    } else {
        entries.push(value);
        true
    }
}

fn remove_entry(entries: &mut Vec<String>, value: &str) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry != value);
    entries.len() != before
}

/// Positions of the records that pass `criteria`, in input order.
pub fn filter_positions(records: &[Deal], criteria: &FilterCriteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, deal)| criteria.matches(deal))
        .map(|(i, _)| i)
        .collect()
}

/// The records that pass `criteria`, in input order.
pub fn filter<'a>(records: &'a [Deal], criteria: &FilterCriteria) -> Vec<&'a Deal> {
    records.iter().filter(|deal| criteria.matches(deal)).collect()
}
