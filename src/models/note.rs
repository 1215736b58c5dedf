use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::plugin::{FormField, ItemLabels, RecordPlugin, RowActions, RowView};
use crate::record::{new_record_id, Record};

use super::is_blank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Opaque image reference (URI or base64 blob) chosen by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Note {
    pub fn new() -> Self {
        Self {
            id: new_record_id(),
            text: String::new(),
            created_at: Utc::now(),
            photo: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn attach_photo(&mut self, photo: impl Into<String>) {
        self.photo = Some(photo.into());
    }

    pub fn remove_photo(&mut self) {
        self.photo = None;
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if is_blank(&self.text) {
            return Err(AppResponse::validation(
                "Por favor, escribe algo en la nota antes de guardar.",
            ));
        }
        Ok(())
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct NotePlugin;

impl RecordPlugin for NotePlugin {
    type Record = Note;

    fn labels(&self) -> ItemLabels {
        ItemLabels {
            singular: "Nota",
            title: "Mis Notas",
            empty_message: "No tienes notas todavía. ¡Añade una!",
            feminine: true,
        }
    }

    fn render_row(&self, note: &Note, actions: RowActions) -> RowView {
        let mut details = vec![note.created_at.format("%d/%m/%Y %H:%M").to_string()];
        if note.photo.is_some() {
            details.push("Foto adjunta".to_string());
        }
        RowView {
            id: note.id.clone(),
            heading: note.text.clone(),
            details,
            actions,
        }
    }

    fn render_form(&self, draft: &Note) -> Vec<FormField> {
        let photo = if draft.photo.is_some() { "Cambiar Foto" } else { "Añadir Foto" };
        vec![
            FormField::new("Nota", draft.text.clone()),
            FormField::new("Foto", photo),
        ]
    }

    fn default_record(&self) -> Note {
        Note::new()
    }
}
