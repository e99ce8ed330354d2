//! DealTable - Deals Grid Engine
//!
//! An in-process engine for an editable deals spreadsheet: a record store,
//! a filter -> sort -> aggregate pipeline, a column layout model with
//! template columns, and UI preferences persisted to key/value storage.
//! A presentation layer dispatches `Action`s into a `DealsTable` and reads
//! the derived rows and totals back.

pub mod error;
pub mod deal;
pub mod edit;
pub mod store;
pub mod filter;
pub mod sort;
pub mod aggregate;
pub mod columns;
pub mod prefs;
pub mod actions;
pub mod config;
pub mod table;

pub use error::{DealError, Result};
pub use deal::{find_owner, lookup_owner, seed_deals, Contacts, Deal, DealField, FieldValue, Owner, Stage, OWNERS};
pub use edit::{apply_cell, normalize_date, parse_amount, parse_date, CellInput};
pub use store::DealStore;
pub use filter::{filter, filter_positions, FilterCriteria, DEFAULT_DEAL_VALUE_RANGE};
pub use sort::{sort, sort_positions, SortDirection, SortKey, SortSpec};
pub use aggregate::{aggregate, aggregate_selection, is_closing_soon, summarize, TableSummary, Totals};
pub use columns::{
    default_width, find_template, resize, ColumnDescriptor, ColumnLayout, ColumnWidths, DynamicColumn,
    HeaderValues, Template, WidthLimits, TEMPLATES,
};
pub use prefs::{FileStorage, MemoryStorage, PreferenceStore, Storage, UiState, UiStatePatch, STORAGE_KEY};
pub use actions::{Action, BulkAction, ColumnCommand, MoveDirection, Outcome, ResizeMode, RowAction};
pub use config::{Clock, FixedClock, SystemClock, TableConfig};
pub use table::DealsTable;
