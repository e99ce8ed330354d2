//! DealTable Controller
//!
//! `DealsTable` owns the record store and the UI preferences and applies
//! `Action`s to them one at a time. Derived state (visible rows, totals,
//! footer summary, dynamic columns) is read back through accessors.
//!
//! The visible row order is memoized on the store generation plus the
//! filters and sorts it was computed from, so repeated reads between
//! mutations reuse the same index list.
//!
//! UI-level actions write the preferences; record edits never do.
//!
//! # Examples
//!
//! ```
//! use dealtable::{Action, DealsTable, MemoryStorage};
//!
//! let mut table = DealsTable::new(MemoryStorage::new());
//! table.apply(Action::AddStageFilter { stage: "Proposal".into() });
//!
//! assert_eq!(table.visible_rows().len(), 2);
//! assert_eq!(table.totals().total_value, 170_000.0);
//! ```

use crate::actions::{
    deal_count, Action, BulkAction, ColumnCommand, MoveDirection, Outcome, RowAction,
};
use crate::aggregate::{aggregate, aggregate_selection, summarize, TableSummary, Totals};
use crate::columns::{find_template, resize, ColumnLayout, DynamicColumn};
use crate::config::{Clock, SystemClock, TableConfig};
use crate::deal::{lookup_owner, Deal, DealField, Stage};
use crate::error::{DealError, Result};
use crate::filter::{filter_positions, FilterCriteria};
use crate::prefs::{PreferenceStore, Storage, UiState, UiStatePatch};
use crate::sort::{sort_positions, SortSpec};
use crate::store::DealStore;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Cached visible row order and the inputs it was derived from.
struct DerivedRows {
    generation: u64,
    filters: FilterCriteria,
    sorts: SortSpec,
    order: Vec<usize>,
}

pub struct DealsTable<S: Storage, C: Clock = SystemClock> {
    store: DealStore,
    prefs: PreferenceStore<S>,
    clock: C,
    config: TableConfig,
    derived: RefCell<Option<DerivedRows>>,
}

impl<S: Storage> DealsTable<S> {
    /// Seed deals, default configuration and the system clock.
    pub fn new(storage: S) -> Self {
        Self::with_parts(DealStore::seeded(), storage, SystemClock, TableConfig::default())
    }
}

impl<S: Storage, C: Clock> DealsTable<S, C> {
    pub fn with_parts(store: DealStore, storage: S, clock: C, config: TableConfig) -> Self {
        let prefs = PreferenceStore::open_with_key(storage, config.storage_key.clone());
        debug!(
            "opened deals table with {} deals, {} columns",
            store.len(),
            prefs.state().column_config.len()
        );
        DealsTable {
            store,
            prefs,
            clock,
            config,
            derived: RefCell::new(None),
        }
    }

    pub fn store(&self) -> &DealStore {
        &self.store
    }

    pub fn ui_state(&self) -> &UiState {
        self.prefs.state()
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.prefs.state().column_config
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        self.prefs.storage()
    }

    pub fn into_storage(self) -> S {
        self.prefs.into_storage()
    }

    /// Store positions of the visible rows in display order.
    fn visible_positions(&self) -> Vec<usize> {
        let state = self.prefs.state();
        let generation = self.store.generation();
        let mut derived = self.derived.borrow_mut();

        if let Some(cached) = derived.as_ref() {
            if cached.generation == generation
                && cached.filters == state.filters
                && cached.sorts == state.sorts
            {
                return cached.order.clone();
            }
        }

        let deals = self.store.deals();
        let mut order = filter_positions(deals, &state.filters);
        sort_positions(deals, &mut order, &state.sorts);
        debug!(
            "derived {} of {} rows at generation {}",
            order.len(),
            deals.len(),
            generation
        );

        *derived = Some(DerivedRows {
            generation,
            filters: state.filters.clone(),
            sorts: state.sorts.clone(),
            order: order.clone(),
        });
        order
    }

    /// Filtered and sorted rows.
    pub fn visible_rows(&self) -> Vec<&Deal> {
        let deals = self.store.deals();
        self.visible_positions()
            .into_iter()
            .map(|index| &deals[index])
            .collect()
    }

    /// Ids marked as selected, whether or not they are currently visible.
    pub fn selected_ids(&self) -> Vec<String> {
        self.prefs
            .state()
            .selected_ids()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Totals over every visible row, ignoring the selection.
    pub fn visible_totals(&self) -> Totals {
        aggregate(self.visible_rows(), self.clock.today())
    }

    /// Totals over every selected deal, whether or not it passes the current
    /// filters, or over all visible rows when nothing is selected.
    pub fn totals(&self) -> Totals {
        let state = self.prefs.state();
        let visible = self.visible_rows();
        let selected: Vec<&Deal> = self
            .store
            .deals()
            .iter()
            .filter(|deal| state.is_selected(&deal.id))
            .collect();
        aggregate_selection(&visible, &selected, self.clock.today())
    }

    pub fn summary(&self) -> TableSummary {
        let visible = self.visible_rows();
        let selected = self.prefs.state().selected_ids().len();
        summarize(self.store.len(), &visible, selected)
    }

    pub fn dynamic_columns(&self) -> Vec<DynamicColumn> {
        let state = self.prefs.state();
        state.column_config.dynamic_columns(
            &state.selected_templates,
            &state.header_values,
            &state.column_widths,
        )
    }

    pub fn total_width(&self) -> f64 {
        let state = self.prefs.state();
        state
            .column_config
            .total_width(&state.selected_templates, &state.column_widths)
    }

    /// Apply an action. Rejected actions are logged and leave state unchanged.
    pub fn apply(&mut self, action: Action) -> Outcome {
        match self.try_apply(action) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("action rejected: {}", err);
                Outcome::none()
            }
        }
    }

    /// Apply an action, returning the error instead of logging it.
    pub fn try_apply(&mut self, action: Action) -> Result<Outcome> {
        debug!("applying {:?}", action);
        let outcome = match action {
            Action::UpdateCell {
                row_id,
                column_id,
                value,
            } => {
                let field = DealField::from_column_id(&column_id)
                    .ok_or_else(|| DealError::InvalidField(column_id.clone()))?;
                self.store.update_field(&row_id, field, value)?;
                Outcome::none()
            }

            Action::SetFilters { filters } => self.update_filters(|current| replace(current, filters)),
            Action::SetSearch { search } => {
                self.update_filters(|current| replace(&mut current.search, search))
            }
            Action::AddStageFilter { stage } => self.update_filters(|current| current.add_stage(stage)),
            Action::RemoveStageFilter { stage } => {
                self.update_filters(|current| current.remove_stage(&stage))
            }
            Action::AddOwnerFilter { owner } => self.update_filters(|current| current.add_owner(owner)),
            Action::RemoveOwnerFilter { owner } => {
                self.update_filters(|current| current.remove_owner(&owner))
            }
            Action::ClearFilters => self.persist(UiStatePatch {
                filters: Some(FilterCriteria::default()),
                sorts: Some(SortSpec::new()),
                ..Default::default()
            }),

            Action::ToggleSort { column } => self.update_sorts(|sorts| {
                sorts.toggle(&column);
                true
            }),
            Action::SetSorts { sorts } => self.update_sorts(|current| replace(current, sorts)),

            Action::ColumnAction { column_id, action } => self.column_action(&column_id, action),
            Action::SetColumns { mut columns } => {
                if columns.is_empty() {
                    return Err(DealError::InvalidValue {
                        field: "columns".to_string(),
                        reason: "layout has no columns".to_string(),
                    });
                }
                if let Some(id) = columns.duplicate_id() {
                    return Err(DealError::InvalidValue {
                        field: "columns".to_string(),
                        reason: format!("duplicate column id '{}'", id),
                    });
                }
                columns.enforce_locked();
                self.update_layout(|layout| replace(layout, columns))
            }
            Action::ToggleColumn { column_id } => {
                self.update_layout(|layout| layout.toggle_visibility(&column_id))
            }
            Action::ReorderColumns { from_id, to_id } => {
                self.update_layout(|layout| layout.reorder(&from_id, &to_id))
            }
            Action::ResizeColumn { column_id, width } => {
                let mut widths = self.prefs.state().column_widths.clone();
                let stored = resize(&mut widths, &column_id, width, self.config.width_limits);
                debug!("resized column '{}' to {}", column_id, stored);
                self.persist(UiStatePatch {
                    column_widths: Some(widths),
                    ..Default::default()
                })
            }
            Action::ResetColumns => {
                self.update_layout(|layout| replace(layout, ColumnLayout::default_columns()))
            }
            Action::ShowAllColumns => self.update_layout(|layout| {
                let before = layout.clone();
                layout.show_all();
                *layout != before
            }),
            Action::HideAllColumns => self.update_layout(|layout| {
                let before = layout.clone();
                layout.hide_all();
                *layout != before
            }),

            Action::ToggleRowExpansion { row_id } => {
                let mut rows = self.prefs.state().expanded_rows.clone();
                match rows.iter().position(|id| *id == row_id) {
                    Some(index) => {
                        rows.remove(index);
                    }
                    None => rows.push(row_id),
                }
                self.persist(UiStatePatch {
                    expanded_rows: Some(rows),
                    ..Default::default()
                })
            }
            Action::ToggleRowSelection { row_id } => {
                let mut selection = self.prefs.state().row_selection.clone();
                let selected = !selection.get(&row_id).copied().unwrap_or(false);
                selection.insert(row_id, selected);
                self.save_selection(selection)
            }
            Action::SelectAll => {
                let visible: Vec<String> =
                    self.visible_rows().iter().map(|deal| deal.id.clone()).collect();
                let state = self.prefs.state();
                let selection = if visible.iter().all(|id| state.is_selected(id)) {
                    BTreeMap::new()
                } else {
                    visible.into_iter().map(|id| (id, true)).collect()
                };
                self.save_selection(selection)
            }
            Action::ClearSelection => self.save_selection(BTreeMap::new()),

            Action::ToggleTemplate {
                template_id,
                selected,
            } => self.toggle_template(template_id, selected)?,
            Action::RenameHeader { column_id, label } => {
                let mut headers = self.prefs.state().header_values.clone();
                let label = label.trim();
                let changed = if label.is_empty() {
                    headers.remove(&column_id).is_some()
                } else {
                    headers.insert(column_id, label.to_string()).as_deref() != Some(label)
                };
                if !changed {
                    return Ok(Outcome::none());
                }
                self.persist(UiStatePatch {
                    header_values: Some(headers),
                    ..Default::default()
                })
            }

            Action::Bulk { action } => self.bulk_action(action),
            Action::Row { deal_id, action } => self.row_action(&deal_id, action)?,
        };
        Ok(outcome)
    }

    fn persist(&mut self, patch: UiStatePatch) -> Outcome {
        self.prefs.save(patch);
        Outcome::persisted()
    }

    fn update_filters(&mut self, update: impl FnOnce(&mut FilterCriteria) -> bool) -> Outcome {
        let mut filters = self.prefs.state().filters.clone();
        if !update(&mut filters) {
            return Outcome::none();
        }
        self.persist(UiStatePatch {
            filters: Some(filters),
            ..Default::default()
        })
    }

    fn update_sorts(&mut self, update: impl FnOnce(&mut SortSpec) -> bool) -> Outcome {
        let mut sorts = self.prefs.state().sorts.clone();
        if !update(&mut sorts) {
            return Outcome::none();
        }
        self.persist(UiStatePatch {
            sorts: Some(sorts),
            ..Default::default()
        })
    }

    fn update_layout(&mut self, update: impl FnOnce(&mut ColumnLayout) -> bool) -> Outcome {
        let mut layout = self.prefs.state().column_config.clone();
        if !update(&mut layout) {
            return Outcome::none();
        }
        self.persist(UiStatePatch {
            column_config: Some(layout),
            ..Default::default()
        })
    }

    fn save_selection(&mut self, selection: BTreeMap<String, bool>) -> Outcome {
        self.persist(UiStatePatch {
            row_selection: Some(selection),
            ..Default::default()
        })
    }

    fn column_action(&mut self, column_id: &str, command: ColumnCommand) -> Outcome {
        match command {
            ColumnCommand::Sort(direction) => {
                let outcome = self.update_sorts(|sorts| {
                    replace(sorts, SortSpec::single(column_id, direction))
                });
                Outcome::announce(format!("Sorted by {} {}", column_id, direction))
                    .and_persisted(outcome.persisted)
            }
            ColumnCommand::Filter => {
                info!("filter requested for column '{}'", column_id);
                Outcome::announce(format!("Filtering by {}", column_id))
            }
            ColumnCommand::Hide => {
                let outcome = self.update_layout(|layout| layout.hide(column_id));
                if !outcome.persisted {
                    return Outcome::none();
                }
                Outcome::announce(format!("Hidden {} column", column_id)).and_persisted(true)
            }
            ColumnCommand::Pin => {
                info!("pin requested for column '{}'", column_id);
                Outcome::announce(format!("{} column pinned", column_id))
            }
            ColumnCommand::Move(direction) => {
                let outcome = self.update_layout(|layout| match direction {
                    MoveDirection::Left => layout.move_left(column_id),
                    MoveDirection::Right => layout.move_right(column_id),
                });
                if !outcome.persisted {
                    return Outcome::none();
                }
                Outcome::announce(format!("Moved {} column {}", column_id, direction))
                    .and_persisted(true)
            }
            ColumnCommand::Resize(mode) => {
                info!("auto-resize ({:?}) requested for column '{}'", mode, column_id);
                Outcome::announce(format!("Auto-resized {} column", column_id))
            }
        }
    }

    fn toggle_template(&mut self, template_id: String, selected: bool) -> Result<Outcome> {
        let mut templates = self.prefs.state().selected_templates.clone();
        let changed = if selected {
            if find_template(&template_id).is_none() {
                return Err(DealError::InvalidValue {
                    field: "templateId".to_string(),
                    reason: format!("unknown template '{}'", template_id),
                });
            }
            if templates.contains(&template_id) {
                false
            } else {
                templates.push(template_id);
                true
            }
        } else {
            let before = templates.len();
            templates.retain(|id| *id != template_id);
            templates.len() != before
        };

        if !changed {
            return Ok(Outcome::none());
        }
        Ok(self.persist(UiStatePatch {
            selected_templates: Some(templates),
            ..Default::default()
        }))
    }

    fn bulk_action(&mut self, action: BulkAction) -> Outcome {
        let ids = self.selected_ids();
        let count = ids.len();

        match action {
            BulkAction::Delete => {
                let removed = self.store.delete_many(ids.iter().map(String::as_str));
                debug!("bulk delete removed {} of {} selected deals", removed, count);
                let expanded: Vec<String> = self
                    .prefs
                    .state()
                    .expanded_rows
                    .iter()
                    .filter(|id| self.store.contains(id))
                    .cloned()
                    .collect();
                self.persist(UiStatePatch {
                    row_selection: Some(BTreeMap::new()),
                    expanded_rows: Some(expanded),
                    ..Default::default()
                });
                Outcome::announce(format!("Deleted {}", deal_count(count))).and_persisted(true)
            }
            BulkAction::Archive => {
                info!("archiving deals: {:?}", ids);
                Outcome::announce(format!("Archived {}", deal_count(count)))
            }
            BulkAction::Email => {
                info!("preparing email for deals: {:?}", ids);
                Outcome::announce(format!("Preparing email for {}", deal_count(count)))
            }
            BulkAction::ChangeStage(value) => {
                if value.is_empty() {
                    return Outcome::none();
                }
                let stage = Stage::lookup(&value);
                self.store.set_stage(ids.iter().map(String::as_str), &stage);
                Outcome::announce(format!("Changed {} to {}", deal_count(count), stage))
            }
            BulkAction::ChangeOwner(value) => {
                if value.is_empty() {
                    return Outcome::none();
                }
                let owner = lookup_owner(&value);
                self.store.set_owner(ids.iter().map(String::as_str), &owner);
                Outcome::announce(format!("Assigned {} to {}", deal_count(count), owner))
            }
        }
    }

    fn row_action(&mut self, deal_id: &str, action: RowAction) -> Result<Outcome> {
        let outcome = match action {
            RowAction::Edit => {
                info!("edit requested for deal '{}'", deal_id);
                Outcome::announce("Editing deal")
            }
            RowAction::Duplicate => {
                let new_id = self.copy_id(deal_id);
                let copy = self.store.duplicate(deal_id, new_id)?;
                debug!("duplicated deal '{}' as '{}'", deal_id, copy.id);
                Outcome::announce("Deal duplicated successfully")
            }
            RowAction::ChangeOwner(value) => {
                if value.is_empty() {
                    return Ok(Outcome::none());
                }
                self.require(deal_id)?;
                let owner = lookup_owner(&value);
                self.store.set_owner([deal_id], &owner);
                Outcome::announce(format!("Deal owner changed to {}", owner))
            }
            RowAction::ChangeStage(value) => {
                if value.is_empty() {
                    return Ok(Outcome::none());
                }
                self.require(deal_id)?;
                let stage = Stage::lookup(&value);
                self.store.set_stage([deal_id], &stage);
                Outcome::announce(format!("Deal stage changed to {}", stage))
            }
            RowAction::Email => {
                info!("preparing email for deal '{}'", deal_id);
                Outcome::announce("Preparing email for deal")
            }
            RowAction::Call => {
                info!("scheduling call for deal '{}'", deal_id);
                Outcome::announce("Scheduling call for deal")
            }
            RowAction::Meeting => {
                info!("scheduling meeting for deal '{}'", deal_id);
                Outcome::announce("Scheduling meeting for deal")
            }
            RowAction::Archive => {
                info!("archiving deal '{}'", deal_id);
                Outcome::announce("Deal archived")
            }
            RowAction::Delete => {
                self.store.delete(deal_id)?;
                let persisted = self.forget_row(deal_id);
                Outcome::announce("Deal deleted").and_persisted(persisted)
            }
        };
        Ok(outcome)
    }

    fn require(&self, deal_id: &str) -> Result<()> {
        if self.store.contains(deal_id) {
            Ok(())
        } else {
            Err(DealError::NotFound(deal_id.to_string()))
        }
    }

    /// `<id>-copy-<millis>`, with a numeric suffix if that id is taken.
    fn copy_id(&self, deal_id: &str) -> String {
        let base = format!("{}-copy-{}", deal_id, self.clock.now_millis());
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.store.contains(&candidate) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        candidate
    }

    /// Drop a deleted row from the selection and the expanded set.
    fn forget_row(&mut self, deal_id: &str) -> bool {
        let state = self.prefs.state();
        let mut patch = UiStatePatch::default();
        if state.row_selection.contains_key(deal_id) {
            let mut selection = state.row_selection.clone();
            selection.remove(deal_id);
            patch.row_selection = Some(selection);
        }
        if state.is_expanded(deal_id) {
            let mut rows = state.expanded_rows.clone();
            rows.retain(|id| id != deal_id);
            patch.expanded_rows = Some(rows);
        }
        if patch == UiStatePatch::default() {
            return false;
        }
        self.prefs.save(patch);
        true
    }
}

/// Overwrite `current` with `next`, reporting whether it changed.
fn replace<T: PartialEq>(current: &mut T, next: T) -> bool {
    if *current == next {
        false
    } else {
        *current = next;
        true
    }
}
