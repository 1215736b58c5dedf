//! Generic collection controller.
//!
//! Owns the records of one slot plus an optional draft. The controller is in
//! [`Mode::List`] while there is no draft and in [`Mode::Edit`] while there is
//! one:
//!
//! ```text
//!   List --create/edit--> Edit --save/back--> List
//! ```
//!
//! A draft is never visible in the collection until [`save`] merges it.
//! Entity specifics (row text, form fields, default values) come from the
//! [`RecordPlugin`] passed to the rendering calls; the controller knows
//! nothing about foreign keys.
//!
//! [`save`]: CollectionController::save

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::persisted_slot::PersistedSlot;
use crate::plugin::{FormView, RecordPlugin, RowAction, RowActions, RowView};
use crate::record::Record;
use crate::slot_backend::SlotBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListView {
    Empty { title: String, message: String },
    Rows { title: String, rows: Vec<RowView> },
}

impl ListView {
    pub fn rows(&self) -> &[RowView] {
        match self {
            ListView::Empty { .. } => &[],
            ListView::Rows { rows, .. } => rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ListView::Empty { .. })
    }
}

pub struct CollectionController<T> {
    slot: PersistedSlot<Vec<T>>,
    draft: Option<T>,
}

impl<T: Record> CollectionController<T> {
    /// Loads the collection stored under `slot`; an absent slot is an empty
    /// collection.
    pub fn load(backend: Arc<dyn SlotBackend>, slot: &str) -> Self {
        let slot = PersistedSlot::load(backend, slot, Vec::new());
        debug!("Loaded {} records from slot '{}'", slot.get().len(), slot.key());
        Self { slot, draft: None }
    }

    pub fn slot_name(&self) -> &str {
        self.slot.key()
    }

    /// Records in insertion order.
    pub fn items(&self) -> &[T] {
        self.slot.get()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items().iter().any(|item| item.id() == id)
    }

    pub fn failed_writes(&self) -> usize {
        self.slot.failed_writes()
    }

    pub fn mode(&self) -> Mode {
        if self.draft.is_some() {
            Mode::Edit
        } else {
            Mode::List
        }
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    /// Renders every record, in collection order.
    pub fn list<P>(&self, plugin: &P) -> ListView
    where
        P: RecordPlugin<Record = T>,
    {
        self.list_records(plugin, self.items().iter())
    }

    /// Renders the given subset or ordering of records.
    pub fn list_records<'a, P, I>(&self, plugin: &P, records: I) -> ListView
    where
        P: RecordPlugin<Record = T>,
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let labels = plugin.labels();
        let rows: Vec<RowView> = records
            .into_iter()
            .map(|record| plugin.render_row(record, RowActions::for_id(record.id())))
            .collect();

        if rows.is_empty() {
            ListView::Empty {
                title: labels.title.to_string(),
                message: labels.empty_message.to_string(),
            }
        } else {
            ListView::Rows {
                title: labels.title.to_string(),
                rows,
            }
        }
    }

    /// Starts a draft from the plugin's default record.
    pub fn create<P>(&mut self, plugin: &P) -> &T
    where
        P: RecordPlugin<Record = T>,
    {
        self.draft.insert(plugin.default_record())
    }

    /// Starts a draft from a copy of `record`.
    pub fn edit(&mut self, record: &T) {
        self.draft = Some(record.clone());
    }

    /// Starts a draft from the stored record with `id`.
    pub fn edit_by_id(&mut self, id: &str) -> bool {
        match self.items().iter().find(|item| item.id() == id).cloned() {
            Some(record) => {
                self.draft = Some(record);
                true
            }
            None => false,
        }
    }

    /// Mutates the draft in place. Returns `false` outside edit mode.
    pub fn update_draft<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.draft.as_mut() {
            Some(draft) => {
                f(draft);
                true
            }
            None => false,
        }
    }

    /// Merges the draft into the collection and persists it.
    ///
    /// A draft whose id is already stored replaces that record in place;
    /// any other draft is appended. Returns the saved id, or `None` when there
    /// was no draft.
    pub fn save(&mut self) -> Option<String> {
        let draft = self.draft.take()?;
        let id = draft.id().to_string();
        let exists = self.contains(&id);

        self.slot.update(|items| {
            let mut next = items.clone();
            match next.iter_mut().find(|item| item.id() == draft.id()) {
                Some(slot) => *slot = draft,
                None => next.push(draft),
            }
            next
        });

        info!(
            "{} record {} in slot '{}'",
            if exists { "Updated" } else { "Inserted" },
            id,
            self.slot.key()
        );
        Some(id)
    }

    /// Removes the record with `id` and persists the result. Nothing is
    /// written when no record matches.
    pub fn delete(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            debug!("Delete of unknown id {} in slot '{}' ignored", id, self.slot.key());
            return false;
        }
        self.slot.update(|items| {
            items
                .iter()
                .filter(|item| item.id() != id)
                .cloned()
                .collect()
        });
        info!("Deleted record {} from slot '{}'", id, self.slot.key());
        true
    }

    /// Drops the draft without persisting anything.
    pub fn back(&mut self) {
        self.draft = None;
    }

    /// Confirmation text for deleting `id`, or `None` if no such record.
    pub fn delete_prompt<P>(&self, plugin: &P, id: &str) -> Option<String>
    where
        P: RecordPlugin<Record = T>,
    {
        self.contains(id).then(|| plugin.delete_prompt())
    }

    /// Applies a row intent. Deletion happens only if `confirm` accepts the
    /// prompt text.
    pub fn dispatch<P, C>(&mut self, plugin: &P, action: RowAction, confirm: C) -> bool
    where
        P: RecordPlugin<Record = T>,
        C: FnOnce(&str) -> bool,
    {
        match action {
            RowAction::Edit(id) => self.edit_by_id(&id),
            RowAction::Delete(id) => match self.delete_prompt(plugin, &id) {
                Some(prompt) if confirm(&prompt) => self.delete(&id),
                _ => false,
            },
        }
    }

    /// Header of the edit screen: "Editar X" for stored records, "Nuevo X"
    /// for new ones.
    pub fn edit_title<P>(&self, plugin: &P) -> Option<String>
    where
        P: RecordPlugin<Record = T>,
    {
        let draft = self.draft.as_ref()?;
        let labels = plugin.labels();
        Some(if self.contains(draft.id()) {
            labels.edit_title()
        } else {
            labels.new_title()
        })
    }

    pub fn form<P>(&self, plugin: &P) -> Option<FormView>
    where
        P: RecordPlugin<Record = T>,
    {
        let title = self.edit_title(plugin)?;
        let draft = self.draft.as_ref()?;
        Some(FormView {
            title,
            fields: plugin.render_form(draft),
        })
    }
}
