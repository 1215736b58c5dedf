use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::plugin::{FormField, ItemLabels, RecordPlugin, RowActions, RowView};
use crate::record::{display_date, new_record_id, today, Record};

use super::is_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimalType {
    #[serde(rename = "cabra")]
    Goat,
    #[default]
    #[serde(rename = "oveja")]
    Sheep,
}

impl AnimalType {
    pub fn label(self) -> &'static str {
        match self {
            AnimalType::Goat => "Cabra",
            AnimalType::Sheep => "Oveja",
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            AnimalType::Goat => "cabra",
            AnimalType::Sheep => "oveja",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: String,
    /// Ear tag ("crotal").
    pub tag: String,
    #[serde(rename = "type")]
    pub animal_type: AnimalType,
    #[serde(default, deserialize_with = "crate::record::deserialize_optional_date")]
    pub birth_date: Option<NaiveDate>,
    pub notes: String,
}

impl Animal {
    pub fn new() -> Self {
        Self {
            id: new_record_id(),
            tag: String::new(),
            animal_type: AnimalType::default(),
            birth_date: Some(today()),
            notes: String::new(),
        }
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn set_animal_type(&mut self, animal_type: AnimalType) {
        self.animal_type = animal_type;
    }

    pub fn set_birth_date(&mut self, date: Option<NaiveDate>) {
        self.birth_date = date;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// "tag (Type)", used wherever another record points at this animal.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.tag, self.animal_type.label())
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if is_blank(&self.tag) || self.birth_date.is_none() {
            return Err(AppResponse::validation(
                "El número de crotal y la fecha de nacimiento son obligatorios.",
            ));
        }
        Ok(())
    }
}

impl Default for Animal {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for Animal {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct AnimalPlugin;

impl RecordPlugin for AnimalPlugin {
    type Record = Animal;

    fn labels(&self) -> ItemLabels {
        ItemLabels {
            singular: "Animal",
            title: "Gestión de Ganado",
            empty_message: "No tienes animales registrados. ¡Añade uno!",
            feminine: false,
        }
    }

    fn render_row(&self, animal: &Animal, actions: RowActions) -> RowView {
        let mut details = vec![format!(
            "{} - Nac.: {}",
            animal.animal_type.label(),
            display_date(animal.birth_date)
        )];
        if !is_blank(&animal.notes) {
            details.push(animal.notes.clone());
        }
        RowView {
            id: animal.id.clone(),
            heading: format!("Crotal: {}", animal.tag),
            details,
            actions,
        }
    }

    fn render_form(&self, draft: &Animal) -> Vec<FormField> {
        let birth = draft
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        vec![
            FormField::new("Número de Crotal", draft.tag.clone()),
            FormField::new("Tipo", draft.animal_type.label()),
            FormField::new("Fecha de Nacimiento", birth),
            FormField::new("Notas", draft.notes.clone()),
        ]
    }

    fn default_record(&self) -> Animal {
        Animal::new()
    }
}
