//! DealTable UI Preferences
//!
//! The grid's layout, filters, sorts, selection and expansion state are saved
//! as one JSON blob under a fixed storage key.
//!
//! # Loading
//!
//! A stored blob is an overlay, never a replacement: each top-level field that
//! is present and well-formed replaces the default, anything else keeps the
//! default. A blob that fails to parse at all, or that was written by a newer
//! schema version, is ignored.
//!
//! # Saving
//!
//! `save` merges a partial update over the last known state and writes the
//! merged result. Writes are fire-and-forget: a failing backend is logged and
//! the in-memory state still advances.
//!
//! # Examples
//!
//! ```
//! use dealtable::{MemoryStorage, PreferenceStore, UiStatePatch, SortSpec, SortDirection};
//!
//! let mut prefs = PreferenceStore::open(MemoryStorage::new());
//! prefs.save(UiStatePatch {
//!     sorts: Some(SortSpec::single("dealValue", SortDirection::Desc)),
//!     ..Default::default()
//! });
//!
//! let reloaded = PreferenceStore::open(prefs.into_storage());
//! assert_eq!(reloaded.state().sorts.len(), 1);
//! ```

use crate::columns::{ColumnLayout, ColumnWidths, HeaderValues};
use crate::error::{DealError, Result};
use crate::filter::FilterCriteria;
use crate::sort::SortSpec;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage key for the persisted UI state.
pub const STORAGE_KEY: &str = "deals-table-ui-state";

/// Version written into every saved blob.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything about the grid that survives a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub version: u32,
    pub column_config: ColumnLayout,
    pub filters: FilterCriteria,
    pub sorts: SortSpec,
    pub row_selection: BTreeMap<String, bool>,
    pub expanded_rows: Vec<String>,
    pub selected_templates: Vec<String>,
    pub header_values: HeaderValues,
    pub column_widths: ColumnWidths,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            version: SCHEMA_VERSION,
            column_config: ColumnLayout::default(),
            filters: FilterCriteria::default(),
            sorts: SortSpec::default(),
            row_selection: BTreeMap::new(),
            expanded_rows: Vec::new(),
            selected_templates: Vec::new(),
            header_values: HeaderValues::new(),
            column_widths: ColumnWidths::new(),
        }
    }
}

impl UiState {
    /// Ids currently marked as selected, in key order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.row_selection
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.row_selection.get(id).copied().unwrap_or(false)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded_rows.iter().any(|row| row == id)
    }

    /// Overlay every field present in `patch`.
    pub fn apply(&mut self, patch: UiStatePatch) {
        if let Some(column_config) = patch.column_config {
            self.column_config = column_config;
        }
        if let Some(filters) = patch.filters {
            self.filters = filters;
        }
        if let Some(sorts) = patch.sorts {
            self.sorts = sorts;
        }
        if let Some(row_selection) = patch.row_selection {
            self.row_selection = row_selection;
        }
        if let Some(expanded_rows) = patch.expanded_rows {
            self.expanded_rows = expanded_rows;
        }
        if let Some(selected_templates) = patch.selected_templates {
            self.selected_templates = selected_templates;
        }
        if let Some(header_values) = patch.header_values {
            self.header_values = header_values;
        }
        if let Some(column_widths) = patch.column_widths {
            self.column_widths = column_widths;
        }
        self.column_config.enforce_locked();
    }

    /// Parse a stored blob over the defaults.
    ///
    /// Never fails: malformed input yields `UiState::default()`.
    pub fn from_json_overlay(raw: &str) -> UiState {
        let map = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("persisted ui state is not a JSON object, using defaults");
                return UiState::default();
            }
            Err(err) => {
                warn!("discarding unparseable ui state: {}", err);
                return UiState::default();
            }
        };

        let version = take_field::<u32>(&map, "version").unwrap_or(SCHEMA_VERSION);
        if version > SCHEMA_VERSION {
            warn!(
                "persisted ui state has schema version {} (supported {}), using defaults",
                version, SCHEMA_VERSION
            );
            return UiState::default();
        }

        let mut state = UiState::default();
        let patch = UiStatePatch {
            column_config: take_field::<ColumnLayout>(&map, "columnConfig").filter(usable_layout),
            filters: take_field(&map, "filters"),
            sorts: take_field(&map, "sorts"),
            row_selection: take_field(&map, "rowSelection"),
            expanded_rows: take_field(&map, "expandedRows"),
            selected_templates: take_field(&map, "selectedTemplates"),
            header_values: take_field(&map, "headerValues"),
            column_widths: take_field(&map, "columnWidths"),
        };
        state.apply(patch);
        state
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Stored layouts must be non-empty with unique column ids.
fn usable_layout(layout: &ColumnLayout) -> bool {
    if layout.is_empty() {
        return false;
    }
    match layout.duplicate_id() {
        Some(id) => {
            warn!("ignoring stored column layout with duplicate column '{}'", id);
            false
        }
        None => true,
    }
}

/// Deserialize one top-level field, logging and dropping it when malformed.
fn take_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("ignoring malformed ui state field '{}': {}", key, err);
            None
        }
    }
}

/// A partial update of `UiState`; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_config: Option<ColumnLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorts: Option<SortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_selection: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_rows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_templates: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_values: Option<HeaderValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<ColumnWidths>,
}

impl From<UiState> for UiStatePatch {
    fn from(state: UiState) -> Self {
        UiStatePatch {
            column_config: Some(state.column_config),
            filters: Some(state.filters),
            sorts: Some(state.sorts),
            row_selection: Some(state.row_selection),
            expanded_rows: Some(state.expanded_rows),
            selected_templates: Some(state.selected_templates),
            header_values: Some(state.header_values),
            column_widths: Some(state.column_widths),
        }
    }
}

/// A string key/value store in the shape of browser local storage.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// In-process storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one raw value.
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_string(), value.to_string());
        MemoryStorage { items }
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage backed by one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(DealError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key)?, value)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps the last known `UiState` and mirrors it into a `Storage` backend.
#[derive(Debug)]
pub struct PreferenceStore<S: Storage> {
    storage: S,
    key: String,
    state: UiState,
}

impl<S: Storage> PreferenceStore<S> {
    /// Open with the default key and load whatever is stored there.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = PreferenceStore {
            storage,
            key: key.into(),
            state: UiState::default(),
        };
        store.state = store.load();
        store
    }

    /// Read the stored state. Missing, unreadable or malformed content yields defaults.
    pub fn load(&self) -> UiState {
        match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => UiState::from_json_overlay(&raw),
            Ok(None) => UiState::default(),
            Err(err) => {
                warn!("failed to read '{}': {}", self.key, err);
                UiState::default()
            }
        }
    }

    /// Merge `patch` into the last known state and write the result.
    pub fn save(&mut self, patch: UiStatePatch) -> &UiState {
        self.state.apply(patch);
        self.state.version = SCHEMA_VERSION;
        self.write();
        &self.state
    }

    /// Replace the whole state and write it.
    pub fn save_state(&mut self, state: UiState) -> &UiState {
        self.save(UiStatePatch::from(state))
    }

    fn write(&mut self) {
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize ui state: {}", err);
                return;
            }
        };
        match self.storage.set_item(&self.key, &json) {
            Ok(()) => debug!("saved ui state under '{}' ({} bytes)", self.key, json.len()),
            Err(err) => warn!("failed to write '{}': {}", self.key, err),
        }
    }

    /// Drop the stored blob and return to defaults.
    pub fn clear(&mut self) {
        if let Err(err) = self.storage.remove_item(&self.key) {
            warn!("failed to remove '{}': {}", self.key, err);
        }
        self.state = UiState::default();
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
