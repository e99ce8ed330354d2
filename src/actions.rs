//! Actions dispatched into a `DealsTable`, and what applying one reports back.
//!
//! Actions are plain data so a presentation layer can send them as JSON:
//!
//! ```
//! use dealtable::{Action, BulkAction};
//!
//! let action: Action = serde_json::from_str(
//!     r#"{"type":"bulk","action":{"kind":"changeStage","value":"closed-won"}}"#,
//! ).unwrap();
//! assert_eq!(action, Action::Bulk { action: BulkAction::ChangeStage("closed-won".into()) });
//! ```

use crate::columns::ColumnLayout;
use crate::edit::CellInput;
use crate::filter::FilterCriteria;
use crate::sort::{SortDirection, SortSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Commit an inline edit
    UpdateCell {
        row_id: String,
        column_id: String,
        value: CellInput,
    },

    /// Replace every filter clause
    SetFilters { filters: FilterCriteria },
    SetSearch { search: String },
    AddStageFilter { stage: String },
    RemoveStageFilter { stage: String },
    AddOwnerFilter { owner: String },
    RemoveOwnerFilter { owner: String },
    /// Reset filters and drop every sort key
    ClearFilters,

    /// Cycle one column through asc, desc and unsorted
    ToggleSort { column: String },
    SetSorts { sorts: SortSpec },

    /// A command from a column header's context menu
    ColumnAction {
        column_id: String,
        action: ColumnCommand,
    },
    SetColumns { columns: ColumnLayout },
    ToggleColumn { column_id: String },
    ReorderColumns { from_id: String, to_id: String },
    ResizeColumn { column_id: String, width: f64 },
    ResetColumns,
    ShowAllColumns,
    HideAllColumns,

    ToggleRowExpansion { row_id: String },
    ToggleRowSelection { row_id: String },
    /// Select every visible row, or clear the selection when all are selected
    SelectAll,
    ClearSelection,

    ToggleTemplate { template_id: String, selected: bool },
    RenameHeader { column_id: String, label: String },

    /// Apply to every selected deal
    Bulk { action: BulkAction },
    /// Apply to one deal from its context menu
    Row { deal_id: String, action: RowAction },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum BulkAction {
    Delete,
    Archive,
    Email,
    /// Stage code or label
    ChangeStage(String),
    /// Owner id or name
    ChangeOwner(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum RowAction {
    Edit,
    Duplicate,
    ChangeStage(String),
    ChangeOwner(String),
    Email,
    Call,
    Meeting,
    Archive,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColumnCommand {
    /// Sort by this column alone
    Sort(SortDirection),
    Filter,
    Hide,
    Pin,
    Move(MoveDirection),
    Resize(ResizeMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Left,
    Right,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Left => f.write_str("left"),
            MoveDirection::Right => f.write_str("right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Auto,
    Fit,
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Message for a screen-reader live region
    pub announcement: Option<String>,
    /// Whether the UI preferences were written
    pub persisted: bool,
}

impl Outcome {
    /// Nothing changed.
    pub fn none() -> Self {
        Outcome::default()
    }

    /// Preferences were written; nothing to announce.
    pub fn persisted() -> Self {
        Outcome {
            announcement: None,
            persisted: true,
        }
    }

    pub fn announce(message: impl Into<String>) -> Self {
        Outcome {
            announcement: Some(message.into()),
            persisted: false,
        }
    }

    pub fn and_persisted(mut self, persisted: bool) -> Self {
        self.persisted = persisted;
        self
    }
}

/// "1 deal", "3 deals".
pub(crate) fn deal_count(count: usize) -> String {
    if count == 1 {
        "1 deal".to_string()
    } else {
        format!("{} deals", count)
    }
}
