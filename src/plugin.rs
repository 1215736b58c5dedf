//! Record-type plugins.
//!
//! Each feature area describes its entity to the generic collection
//! controller through a [`RecordPlugin`]: how a row reads in the list, which
//! fields the edit form shows, and what a fresh record looks like. Plugins are
//! plain values built at render time, so a plugin can borrow the parent
//! collection it needs for a join.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Intent emitted from a list row. The host hands it back to
/// [`CollectionController::dispatch`](crate::collection::CollectionController::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowAction {
    Edit(String),
    Delete(String),
}

/// The edit and delete intents for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowActions {
    pub edit: RowAction,
    pub delete: RowAction,
}

impl RowActions {
    pub fn for_id(id: &str) -> Self {
        Self {
            edit: RowAction::Edit(id.to_string()),
            delete: RowAction::Delete(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowView {
    pub id: String,
    pub heading: String,
    pub details: Vec<String>,
    pub actions: RowActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    pub value: String,
}

impl FormField {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormView {
    pub title: String,
    pub fields: Vec<FormField>,
}

/// Display strings for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLabels {
    /// Capitalised singular, e.g. "Finca".
    pub singular: &'static str,
    /// Heading of the list screen.
    pub title: &'static str,
    pub empty_message: &'static str,
    /// Picks "Nueva"/"esta" over "Nuevo"/"este".
    pub feminine: bool,
}

impl ItemLabels {
    pub fn new_title(&self) -> String {
        let adjective = if self.feminine { "Nueva" } else { "Nuevo" };
        format!("{adjective} {}", self.singular)
    }

    pub fn edit_title(&self) -> String {
        format!("Editar {}", self.singular)
    }

    pub fn delete_prompt(&self) -> String {
        let article = if self.feminine { "esta" } else { "este" };
        format!(
            "¿Estás seguro de que quieres eliminar {article} {}?",
            self.singular.to_lowercase()
        )
    }
}

pub trait RecordPlugin {
    type Record: Record;

    fn labels(&self) -> ItemLabels;

    /// Confirmation text shown before a delete.
    fn delete_prompt(&self) -> String {
        self.labels().delete_prompt()
    }

    /// Renders one list row. `actions` carries the edit and delete intents
    /// for this record.
    fn render_row(&self, record: &Self::Record, actions: RowActions) -> RowView;

    /// Fields of the edit form for the current draft.
    fn render_form(&self, draft: &Self::Record) -> Vec<FormField>;

    /// A fresh record with a new id and default field values.
    fn default_record(&self) -> Self::Record;
}
