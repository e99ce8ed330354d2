//! DealTable Record Store
//!
//! The store owns the ordered collection of deals. Every mutation bumps a
//! generation counter, which derived views compare against to decide whether
//! their cached row order is still valid.
//!
//! # Examples
//!
//! ```
//! use dealtable::{CellInput, DealField, DealStore};
//!
//! let mut store = DealStore::seeded();
//! let before = store.generation();
//!
//! store.update_field("2", DealField::DealValue, CellInput::text("$90,000")).unwrap();
//!
//! assert_eq!(store.get("2").unwrap().deal_value, 90_000.0);
//! assert!(store.generation() > before);
//! ```

use crate::deal::{seed_deals, Deal, DealField, Stage};
use crate::edit::{apply_cell, CellInput};
use crate::error::{DealError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct DealStore {
    deals: Vec<Deal>,
    generation: u64,
}

impl DealStore {
    pub fn new() -> Self {
        DealStore {
            deals: Vec::new(),
            generation: 0,
        }
    }

    /// Build a store from records, rejecting duplicate ids.
    pub fn from_deals(deals: Vec<Deal>) -> Result<Self> {
        let mut store = DealStore::new();
        store.replace_all(deals)?;
        Ok(store)
    }

    /// A store holding the dashboard's seed data.
    pub fn seeded() -> Self {
        DealStore {
            deals: seed_deals(),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    /// All deals in insertion order.
    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn get(&self, id: &str) -> Option<&Deal> {
        self.deals.iter().find(|deal| deal.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.deals.iter().position(|deal| deal.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    pub fn append(&mut self, deal: Deal) -> Result<()> {
        if self.contains(&deal.id) {
            return Err(DealError::DuplicateId(deal.id));
        }
        self.deals.push(deal);
        self.touch();
        Ok(())
    }

    /// Append a copy of `id` under `new_id`, suffixing the name with " (Copy)".
    pub fn duplicate(&mut self, id: &str, new_id: impl Into<String>) -> Result<&Deal> {
        let original = self
            .get(id)
            .ok_or_else(|| DealError::NotFound(id.to_string()))?;

        let mut copy = original.clone();
        copy.id = new_id.into();
        copy.deal = format!("{} (Copy)", original.deal);

        self.append(copy)?;
        let last = self.deals.len() - 1;
        Ok(&self.deals[last])
    }

    /// Apply an editor value to a single field.
    pub fn update_field(&mut self, id: &str, field: DealField, input: CellInput) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| DealError::NotFound(id.to_string()))?;
        apply_cell(&mut self.deals[index], field, input)?;
        self.touch();
        Ok(())
    }

    /// Set the stage on every listed deal. Returns how many deals changed.
    pub fn set_stage<'a, I>(&mut self, ids: I, stage: &Stage) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.update_matching(ids, |deal| deal.stage = stage.clone())
    }

    /// Set the owner on every listed deal. Returns how many deals changed.
    pub fn set_owner<'a, I>(&mut self, ids: I, owner: &str) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.update_matching(ids, |deal| deal.owner = owner.to_string())
    }

    fn update_matching<'a, I, F>(&mut self, ids: I, mut update: F) -> usize
    where
        I: IntoIterator<Item = &'a str>,
        F: FnMut(&mut Deal),
    {
        let ids: HashSet<&str> = ids.into_iter().collect();
        let mut count = 0;
        for deal in self.deals.iter_mut().filter(|d| ids.contains(d.id.as_str())) {
            update(deal);
            count += 1;
        }
        if count > 0 {
            self.touch();
        }
        count
    }

    pub fn delete(&mut self, id: &str) -> Result<Deal> {
        let index = self
            .position(id)
            .ok_or_else(|| DealError::NotFound(id.to_string()))?;
        let removed = self.deals.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Remove every listed deal. Unknown ids are ignored.
    pub fn delete_many<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: HashSet<&str> = ids.into_iter().collect();
        let before = self.deals.len();
        self.deals.retain(|deal| !ids.contains(deal.id.as_str()));
        let removed = before - self.deals.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Replace the whole collection. Fails without changes on duplicate ids.
    pub fn replace_all(&mut self, deals: Vec<Deal>) -> Result<()> {
        let mut seen = HashSet::new();
        for deal in &deals {
            if !seen.insert(deal.id.as_str()) {
                return Err(DealError::DuplicateId(deal.id.clone()));
            }
        }
        self.deals = deals;
        self.touch();
        Ok(())
    }
}
