//! DealTable Column Layout
//!
//! The grid's columns are an ordered list of descriptors. Order is
//! significant and persisted. Locked columns can never be hidden, so every
//! operation that changes visibility leaves them alone.
//!
//! Besides the fixed layout there is a catalog of templates. A selected
//! template contributes a "dynamic" column bound to one deal field, which the
//! user can relabel through header values.
//!
//! # Examples
//!
//! ```
//! use dealtable::ColumnLayout;
//!
//! let mut layout = ColumnLayout::default();
//! assert!(!layout.toggle_visibility("deal")); // locked
//! assert!(layout.toggle_visibility("contacts"));
//! assert!(layout.get("contacts").unwrap().visible);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Per-column width overrides, keyed by column id.
pub type ColumnWidths = BTreeMap<String, f64>;

/// User-edited header labels, keyed by column id.
pub type HeaderValues = BTreeMap<String, String>;

/// Width of the trailing "add template" gutter.
pub const TEMPLATES_GUTTER_WIDTH: f64 = 60.0;

/// Width used for template-bound columns and anything without a default.
pub const TEMPLATE_COLUMN_WIDTH: f64 = 180.0;

/// Default width for a column id.
pub fn default_width(id: &str) -> f64 {
    match id {
        "select" | "expand" => 36.0,
        "deal" | "stage" | "lastInteraction" => 150.0,
        "activitiesTimeline" => 200.0,
        "quotesInvoices" => 220.0,
        "templates" => TEMPLATES_GUTTER_WIDTH,
        _ => TEMPLATE_COLUMN_WIDTH,
    }
}

/// Bounds applied when a column is resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for WidthLimits {
    fn default() -> Self {
        WidthLimits { min: 80.0, max: 400.0 }
    }
}

impl WidthLimits {
    pub fn new(min: f64, max: f64) -> Self {
        WidthLimits { min, max }
    }

    pub fn clamp(&self, width: f64) -> f64 {
        width.max(self.min).min(self.max)
    }
}

/// Store a clamped width for `id` and return the stored value.
pub fn resize(widths: &mut ColumnWidths, id: &str, new_width: f64, limits: WidthLimits) -> f64 {
    let width = limits.clamp(new_width);
    widths.insert(id.to_string(), width);
    width
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub id: String,
    pub label: String,
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>, visible: bool) -> Self {
        ColumnDescriptor {
            id: id.into(),
            label: label.into(),
            visible,
            locked: false,
            width: None,
        }
    }

    /// A locked column; always visible.
    pub fn locked(id: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnDescriptor {
            locked: true,
            ..ColumnDescriptor::new(id, label, true)
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

/// A template that can be added to the grid as a dynamic column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const TEMPLATES: [Template; 8] = [
    Template {
        id: "activitiesTimeline",
        label: "Activities Timeline",
        description: "Timeline of activities and interactions for this deal",
    },
    Template {
        id: "stage",
        label: "Stage",
        description: "Current stage of the deal in the sales pipeline",
    },
    Template {
        id: "dealValue",
        label: "Deal Value",
        description: "Total monetary value of the deal",
    },
    Template {
        id: "contacts",
        label: "Contacts",
        description: "Key contacts involved in this deal",
    },
    Template {
        id: "owner",
        label: "Owner",
        description: "Sales representative responsible for this deal",
    },
    Template {
        id: "accounts",
        label: "Accounts",
        description: "Account information and classification",
    },
    Template {
        id: "expectedClose",
        label: "Expected Close",
        description: "Anticipated closing date for this deal",
    },
    Template {
        id: "forecastValue",
        label: "Forecast Value",
        description: "Projected value based on probability and stage",
    },
];

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.id == id)
}

/// A template-bound column ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicColumn {
    pub id: String,
    pub label: String,
    pub width: f64,
}

/// Ordered column descriptors for the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnLayout {
    columns: Vec<ColumnDescriptor>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout::default_columns()
    }
}

impl ColumnLayout {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let mut layout = ColumnLayout { columns };
        layout.enforce_locked();
        layout
    }

    /// The fixed default layout.
    pub fn default_columns() -> Self {
        let column = |id: &str, label: &str, visible: bool| {
            ColumnDescriptor::new(id, label, visible).with_width(default_width(id))
        };
        ColumnLayout {
            columns: vec![
                ColumnDescriptor::locked("select", "Select").with_width(default_width("select")),
                ColumnDescriptor::locked("expand", "Expand").with_width(default_width("expand")),
                ColumnDescriptor::locked("deal", "Deal").with_width(default_width("deal")),
                column("stage", "Stage", true),
                column("dealValue", "Deal Value", true),
                column("owner", "Owner", true),
                column("expectedClose", "Expected Close", true),
                column("activitiesTimeline", "Activities Timeline", false),
                column("lastInteraction", "Last Interaction", false),
                column("quotesInvoices", "Quotes & Invoices", false),
                column("contacts", "Contacts", false),
                column("accounts", "Accounts", false),
                column("forecastValue", "Forecast Value", false),
            ],
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|col| col.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.id == id)
    }

    /// The first id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(|col| col.id.as_str())
            .find(|id| !seen.insert(*id))
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|col| col.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// Force every locked column visible. Used after loading foreign data.
    pub fn enforce_locked(&mut self) {
        for col in self.columns.iter_mut().filter(|col| col.locked) {
            col.visible = true;
        }
    }

    /// Flip visibility. Locked or unknown columns are left as they are.
    /// Returns true when something changed.
    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        match self.columns.iter_mut().find(|col| col.id == id) {
            Some(col) if !col.locked => {
                col.visible = !col.visible;
                true
            }
            _ => false,
        }
    }

    /// Hide one column unless it is locked.
    pub fn hide(&mut self, id: &str) -> bool {
        match self.columns.iter_mut().find(|col| col.id == id) {
            Some(col) if !col.locked && col.visible => {
                col.visible = false;
                true
            }
            _ => false,
        }
    }

    pub fn show_all(&mut self) {
        self.set_all_unlocked(true);
    }

    pub fn hide_all(&mut self) {
        self.set_all_unlocked(false);
    }

    fn set_all_unlocked(&mut self, visible: bool) {
        for col in self.columns.iter_mut().filter(|col| !col.locked) {
            col.visible = visible;
        }
    }

    /// Move `from_id` into the slot currently held by `to_id`.
    ///
    /// A no-op when either id is missing or both are the same.
    pub fn reorder(&mut self, from_id: &str, to_id: &str) -> bool {
        if from_id == to_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(from_id), self.position(to_id)) else {
            return false;
        };
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        true
    }

    /// Swap a column with its left neighbour.
    pub fn move_left(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) if index > 0 => {
                self.columns.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap a column with its right neighbour.
    pub fn move_right(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) if index + 1 < self.columns.len() => {
                self.columns.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn reset_to_default(&mut self) {
        *self = ColumnLayout::default_columns();
    }

    /// Width override first, then the descriptor's own width, then the template width.
    pub fn effective_width(&self, id: &str, widths: &ColumnWidths) -> f64 {
        widths
            .get(id)
            .copied()
            .or_else(|| self.get(id).and_then(|col| col.width))
            .unwrap_or(TEMPLATE_COLUMN_WIDTH)
    }

    /// Template columns to render for the selected templates.
    ///
    /// Unknown template ids are skipped, as are templates whose matching
    /// layout column is hidden.
    pub fn dynamic_columns(
        &self,
        selected_templates: &[String],
        header_values: &HeaderValues,
        widths: &ColumnWidths,
    ) -> Vec<DynamicColumn> {
        selected_templates
            .iter()
            .filter_map(|id| {
                let template = find_template(id)?;
                if self.get(id).is_some_and(|col| !col.visible) {
                    return None;
                }
                let label = header_values
                    .get(id)
                    .filter(|label| !label.is_empty())
                    .cloned()
                    .unwrap_or_else(|| template.label.to_string());
                Some(DynamicColumn {
                    id: id.clone(),
                    label,
                    width: widths.get(id).copied().unwrap_or(TEMPLATE_COLUMN_WIDTH),
                })
            })
            .collect()
    }

    /// Minimum table width: gutter, visible columns, and visible template
    /// columns that are not already part of the layout.
    pub fn total_width(&self, selected_templates: &[String], widths: &ColumnWidths) -> f64 {
        let mut width = widths
            .get("templates")
            .copied()
            .unwrap_or(TEMPLATES_GUTTER_WIDTH);

        for col in self.visible() {
            width += self.effective_width(&col.id, widths);
        }

        for id in selected_templates.iter().filter(|id| self.get(id).is_none()) {
            width += widths.get(id).copied().unwrap_or(TEMPLATE_COLUMN_WIDTH);
        }

        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(layout: &ColumnLayout) -> Vec<&str> {
        layout.columns().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_default_layout() {
        let layout = ColumnLayout::default();
        assert_eq!(layout.len(), 13);
        let visible: Vec<&str> = layout.visible().map(|c| c.id.as_str()).collect();
        assert_eq!(
            visible,
            vec!["select", "expand", "deal", "stage", "dealValue", "owner", "expectedClose"]
        );
        assert!(layout.get("select").unwrap().locked);
        assert_eq!(layout.get("quotesInvoices").unwrap().width, Some(220.0));
    }

    #[test]
    fn test_toggle_visibility_skips_locked() {
        let mut layout = ColumnLayout::default();
        assert!(!layout.toggle_visibility("select"));
        assert!(layout.get("select").unwrap().visible);

        assert!(layout.toggle_visibility("stage"));
        assert!(!layout.get("stage").unwrap().visible);
        assert!(!layout.toggle_visibility("nope"));
    }

    #[test]
    fn test_hide_all_and_show_all() {
        let mut layout = ColumnLayout::default();
        layout.hide_all();
        let visible: Vec<&str> = layout.visible().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["select", "expand", "deal"]);

        layout.show_all();
        assert_eq!(layout.visible_count(), 13);
    }

    #[test]
    fn test_hide_single_column() {
        let mut layout = ColumnLayout::default();
        assert!(layout.hide("owner"));
        assert!(!layout.hide("owner"));
        assert!(!layout.hide("deal"));
    }

    #[test]
    fn test_reorder_moves_to_target_slot() {
        let mut layout = ColumnLayout::default();
        assert!(layout.reorder("owner", "stage"));
        assert_eq!(&ids(&layout)[..7], &["select", "expand", "deal", "owner", "stage", "dealValue", "expectedClose"]);

        assert!(layout.reorder("select", "expectedClose"));
        assert_eq!(ids(&layout)[6], "select");
    }

    #[test]
    fn test_reorder_noops() {
        let mut layout = ColumnLayout::default();
        let before = layout.clone();
        assert!(!layout.reorder("stage", "stage"));
        assert!(!layout.reorder("stage", "missing"));
        assert!(!layout.reorder("missing", "stage"));
        assert_eq!(layout, before);
    }

    #[test]
    fn test_move_left_right_edges() {
        let mut layout = ColumnLayout::default();
        assert!(!layout.move_left("select"));
        assert!(!layout.move_right("forecastValue"));
        assert!(layout.move_right("select"));
        assert_eq!(&ids(&layout)[..2], &["expand", "select"]);
        assert!(layout.move_left("select"));
        assert_eq!(ids(&layout)[0], "select");
    }

    #[test]
    fn test_reset_to_default() {
        let mut layout = ColumnLayout::default();
        layout.hide_all();
        layout.reorder("forecastValue", "select");
        layout.reset_to_default();
        assert_eq!(layout, ColumnLayout::default_columns());
    }

    #[test]
    fn test_resize_clamps() {
        let mut widths = ColumnWidths::new();
        let limits = WidthLimits::default();
        assert_eq!(resize(&mut widths, "stage", 20.0, limits), 80.0);
        assert_eq!(resize(&mut widths, "deal", 900.0, limits), 400.0);
        assert_eq!(resize(&mut widths, "owner", 222.5, limits), 222.5);
        assert_eq!(widths.get("stage"), Some(&80.0));

        let narrow = WidthLimits::new(50.0, 120.0);
        assert_eq!(resize(&mut widths, "stage", 20.0, narrow), 50.0);
    }

    #[test]
    fn test_duplicate_id() {
        assert_eq!(ColumnLayout::default().duplicate_id(), None);

        let layout = ColumnLayout::new(vec![
            ColumnDescriptor::locked("deal", "Deal"),
            ColumnDescriptor::new("stage", "Stage", true),
            ColumnDescriptor::new("stage", "Stage", false),
        ]);
        assert_eq!(layout.duplicate_id(), Some("stage"));
    }

    #[test]
    fn test_new_enforces_locked_visibility() {
        let mut hidden = ColumnDescriptor::locked("deal", "Deal");
        hidden.visible = false;
        let layout = ColumnLayout::new(vec![hidden]);
        assert!(layout.get("deal").unwrap().visible);
    }

    #[test]
    fn test_dynamic_columns() {
        let mut layout = ColumnLayout::default();
        let mut headers = HeaderValues::new();
        headers.insert("owner".to_string(), "Rep".to_string());
        let mut widths = ColumnWidths::new();
        widths.insert("owner".to_string(), 210.0);

        let selected = vec!["owner".to_string(), "contacts".to_string(), "bogus".to_string()];
        // contacts is a hidden layout column, bogus is not a template
        let dynamic = layout.dynamic_columns(&selected, &headers, &widths);
        assert_eq!(
            dynamic,
            vec![DynamicColumn { id: "owner".to_string(), label: "Rep".to_string(), width: 210.0 }]
        );

        layout.toggle_visibility("contacts");
        let dynamic = layout.dynamic_columns(&selected, &headers, &widths);
        assert_eq!(dynamic[1].label, "Contacts");
        assert_eq!(dynamic[1].width, TEMPLATE_COLUMN_WIDTH);
    }

    #[test]
    fn test_total_width() {
        let layout = ColumnLayout::default();
        let widths = ColumnWidths::new();
        // gutter + select + expand + deal + stage + 3 template-width columns
        let expected = 60.0 + 36.0 + 36.0 + 150.0 + 150.0 + 3.0 * 180.0;
        assert_eq!(layout.total_width(&[], &widths), expected);

        // A visible layout column is not counted twice; a hidden one is not counted
        let selected = vec!["owner".to_string(), "contacts".to_string()];
        assert_eq!(layout.total_width(&selected, &widths), expected);

        let extra = ColumnLayout::new(vec![ColumnDescriptor::locked("deal", "Deal")]);
        let selected = vec!["accounts".to_string()];
        assert_eq!(extra.total_width(&selected, &widths), 60.0 + 180.0 + 180.0);
    }

    #[test]
    fn test_layout_json_is_array() {
        let layout = ColumnLayout::new(vec![ColumnDescriptor::new("stage", "Stage", true)]);
        let json = serde_json::to_string(&layout).unwrap();
        assert_eq!(json, r#"[{"id":"stage","label":"Stage","visible":true,"locked":false}]"#);
    }
}
