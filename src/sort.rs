//! DealTable Sort Engine
//!
//! Multi-column sorting over deals. The comparator walks the sort keys in
//! order and the first key on which two deals differ decides. Sorting is
//! stable, so deals that tie on every key keep their input order, and an
//! empty spec leaves the input exactly as it was.
//!
//! # Examples
//!
//! ```
//! use dealtable::{seed_deals, sort, SortDirection, SortSpec};
//!
//! let deals = seed_deals();
//! let rows: Vec<_> = deals.iter().collect();
//!
//! let mut spec = SortSpec::new();
//! spec.toggle("dealValue");
//!
//! let sorted = sort(&rows, &spec);
//! assert_eq!(sorted[0].deal_value, 45_000.0);
//! assert_eq!(spec.direction_of("dealValue"), Some(SortDirection::Asc));
//! ```

use crate::deal::{Deal, DealField, FieldValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ascending"),
            SortDirection::Desc => f.write_str("descending"),
        }
    }
}

/// A single sort key: a column id and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        SortKey {
            column: column.into(),
            direction,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

/// Ordered list of sort keys with unique columns.
///
/// Serialized as a plain JSON array. When an array carries the same column
/// twice, the later entry replaces the earlier one in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SortKey>", into = "Vec<SortKey>")]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new() -> Self {
        SortSpec { keys: Vec::new() }
    }

    /// A spec holding exactly one key.
    pub fn single(column: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            keys: vec![SortKey::new(column, direction)],
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        self.keys
            .iter()
            .find(|key| key.column == column)
            .map(|key| key.direction)
    }

    /// Insert a key, replacing the existing entry for the same column.
    pub fn upsert(&mut self, key: SortKey) {
        match self.keys.iter_mut().find(|k| k.column == key.column) {
            Some(existing) => existing.direction = key.direction,
            None => self.keys.push(key),
        }
    }

    pub fn remove(&mut self, column: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|key| key.column != column);
        self.keys.len() != before
    }

    /// Cycle a column through unsorted -> asc -> desc -> unsorted.
    ///
    /// Returns the column's direction after the toggle.
    pub fn toggle(&mut self, column: &str) -> Option<SortDirection> {
        match self.direction_of(column) {
            None => {
                self.keys.push(SortKey::ascending(column));
                Some(SortDirection::Asc)
            }
            Some(SortDirection::Asc) => {
                self.upsert(SortKey::descending(column));
                Some(SortDirection::Desc)
            }
            Some(SortDirection::Desc) => {
                self.remove(column);
                None
            }
        }
    }

    /// Discard every key and sort by `column` alone.
    pub fn set_single(&mut self, column: impl Into<String>, direction: SortDirection) {
        *self = SortSpec::single(column, direction);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Compare two deals under this spec.
    pub fn compare(&self, a: &Deal, b: &Deal) -> Ordering {
        for key in &self.keys {
            let Some(field) = DealField::from_column_id(&key.column) else {
                continue;
            };
            let cmp = compare_values(&a.get(field), &b.get(field));
            if cmp != Ordering::Equal {
                return key.direction.apply(cmp);
            }
        }
        Ordering::Equal
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        let mut spec = SortSpec::new();
        for key in keys {
            spec.upsert(key);
        }
        spec
    }
}

impl From<SortSpec> for Vec<SortKey> {
    fn from(spec: SortSpec) -> Self {
        spec.keys
    }
}

/// Text compares case-insensitively, numbers by value.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(a), FieldValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        // A field never mixes kinds; treat it as a tie
        _ => Ordering::Equal,
    }
}

/// Reorder `positions` (indices into `records`) under `spec`.
pub fn sort_positions(records: &[Deal], positions: &mut [usize], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    positions.sort_by(|&a, &b| spec.compare(&records[a], &records[b]));
}

/// Return a sorted copy of `records`; the input slice is left untouched.
pub fn sort<'a>(records: &[&'a Deal], spec: &SortSpec) -> Vec<&'a Deal> {
    let mut sorted = records.to_vec();
    if !spec.is_empty() {
        sorted.sort_by(|a, b| spec.compare(a, b));
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{seed_deals, Stage};

    fn values(deals: &[&Deal]) -> Vec<f64> {
        deals.iter().map(|d| d.deal_value).collect()
    }

    fn ids<'a>(deals: &[&'a Deal]) -> Vec<&'a str> {
        deals.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_empty_spec_keeps_input_order() {
        let deals = seed_deals();
        let rows: Vec<&Deal> = deals.iter().collect();
        let sorted = sort(&rows, &SortSpec::new());
        assert_eq!(ids(&sorted), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_sort_by_value_both_directions() {
        let deals = seed_deals();
        let rows: Vec<&Deal> = deals.iter().collect();

        let asc = sort(&rows, &SortSpec::single("dealValue", SortDirection::Asc));
        assert_eq!(values(&asc), vec![45_000.0, 65_000.0, 85_000.0, 95_000.0, 125_000.0]);

        let desc = sort(&rows, &SortSpec::single("dealValue", SortDirection::Desc));
        assert_eq!(values(&desc), vec![125_000.0, 95_000.0, 85_000.0, 65_000.0, 45_000.0]);

        // Input untouched
        assert_eq!(ids(&rows), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_strings_compare_case_insensitively() {
        let deals = vec![
            Deal::new("a", "beta"),
            Deal::new("b", "Alpha"),
            Deal::new("c", "alpha"),
            Deal::new("d", "Gamma"),
        ];
        let rows: Vec<&Deal> = deals.iter().collect();
        let sorted = sort(&rows, &SortSpec::single("deal", SortDirection::Asc));
        // "Alpha" and "alpha" tie, so input order between b and c is kept
        assert_eq!(ids(&sorted), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_secondary_key_breaks_ties() {
        let deals = vec![
            Deal::new("a", "One").with_stage(Stage::Proposal).with_value(10.0),
            Deal::new("b", "Two").with_stage(Stage::Discovery).with_value(30.0),
            Deal::new("c", "Three").with_stage(Stage::Proposal).with_value(20.0),
            Deal::new("d", "Four").with_stage(Stage::Discovery).with_value(30.0),
        ];
        let rows: Vec<&Deal> = deals.iter().collect();

        let spec = SortSpec::from(vec![
            SortKey::ascending("stage"),
            SortKey::descending("dealValue"),
        ]);
        let sorted = sort(&rows, &spec);
        // b and d tie on both keys and stay in input order
        assert_eq!(ids(&sorted), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_dates_sort_lexicographically() {
        let deals = seed_deals();
        let rows: Vec<&Deal> = deals.iter().collect();
        let sorted = sort(&rows, &SortSpec::single("expectedClose", SortDirection::Asc));
        assert_eq!(ids(&sorted), vec!["4", "3", "2", "1", "5"]);
    }

    #[test]
    fn test_unknown_column_is_ignored() {
        let deals = seed_deals();
        let rows: Vec<&Deal> = deals.iter().collect();
        let sorted = sort(&rows, &SortSpec::single("lastInteraction", SortDirection::Desc));
        assert_eq!(ids(&sorted), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_toggle_cycle() {
        let mut spec = SortSpec::new();
        spec.toggle("owner");
        assert_eq!(spec.toggle("stage"), Some(SortDirection::Asc));
        assert_eq!(spec.toggle("stage"), Some(SortDirection::Desc));
        assert_eq!(spec.keys()[1], SortKey::descending("stage"));
        assert_eq!(spec.toggle("stage"), None);
        assert_eq!(spec.keys(), &[SortKey::ascending("owner")]);
    }

    #[test]
    fn test_set_single_replaces_everything() {
        let mut spec = SortSpec::from(vec![SortKey::ascending("owner"), SortKey::ascending("stage")]);
        spec.set_single("dealValue", SortDirection::Desc);
        assert_eq!(spec.keys(), &[SortKey::descending("dealValue")]);
    }

    #[test]
    fn test_duplicate_columns_collapse_on_deserialize() {
        let spec: SortSpec = serde_json::from_str(
            r#"[{"column":"stage","direction":"asc"},{"column":"owner","direction":"asc"},{"column":"stage","direction":"desc"}]"#,
        )
        .unwrap();
        assert_eq!(
            spec.keys(),
            &[SortKey::descending("stage"), SortKey::ascending("owner")]
        );
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"[{"column":"stage","direction":"desc"},{"column":"owner","direction":"asc"}]"#
        );
    }

    #[test]
    fn test_sort_positions() {
        let deals = seed_deals();
        let mut positions = vec![0, 2, 4];
        sort_positions(&deals, &mut positions, &SortSpec::single("dealValue", SortDirection::Asc));
        assert_eq!(positions, vec![2, 4, 0]);
    }
}
