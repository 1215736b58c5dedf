use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::lookup::display_or_unknown;
use crate::plugin::{FormField, ItemLabels, RecordPlugin, RowActions, RowView};
use crate::record::{display_date, new_record_id, today, Record};

use super::animal::Animal;
use super::is_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CareType {
    #[serde(rename = "vacuna")]
    Vaccine,
    #[default]
    #[serde(rename = "tratamiento")]
    Treatment,
    #[serde(rename = "alimentacion")]
    SpecialFeeding,
    #[serde(rename = "otro")]
    Other,
}

impl CareType {
    pub fn label(self) -> &'static str {
        match self {
            CareType::Vaccine => "Vacuna",
            CareType::Treatment => "Tratamiento",
            CareType::SpecialFeeding => "Alimentación Especial",
            CareType::Other => "Otro Cuidado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestockCare {
    pub id: String,
    pub animal_id: String,
    #[serde(rename = "type")]
    pub care_type: CareType,
    pub product: String,
    #[serde(default, deserialize_with = "crate::record::deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    pub notes: String,
}

impl LivestockCare {
    pub fn new(animal_id: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            animal_id: animal_id.into(),
            care_type: CareType::default(),
            product: String::new(),
            date: Some(today()),
            notes: String::new(),
        }
    }

    pub fn set_animal_id(&mut self, animal_id: impl Into<String>) {
        self.animal_id = animal_id.into();
    }

    pub fn set_care_type(&mut self, care_type: CareType) {
        self.care_type = care_type;
    }

    pub fn set_product(&mut self, product: impl Into<String>) {
        self.product = product.into();
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if is_blank(&self.product) || self.date.is_none() {
            return Err(AppResponse::validation("El producto y la fecha son obligatorios."));
        }
        Ok(())
    }
}

impl Record for LivestockCare {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn animal_label(animals: &[Animal], animal_id: &str) -> String {
    display_or_unknown(animals, animal_id, Animal::describe)
}

pub struct LivestockCarePlugin<'a> {
    pub animals: &'a [Animal],
    pub animal_id: Option<&'a str>,
}

impl<'a> LivestockCarePlugin<'a> {
    pub fn new(animals: &'a [Animal]) -> Self {
        Self {
            animals,
            animal_id: None,
        }
    }

    pub fn for_animal(animals: &'a [Animal], animal_id: &'a str) -> Self {
        Self {
            animals,
            animal_id: Some(animal_id),
        }
    }
}

impl RecordPlugin for LivestockCarePlugin<'_> {
    type Record = LivestockCare;

    fn labels(&self) -> ItemLabels {
        ItemLabels {
            singular: "Cuidado",
            title: "Cuidado de Ganado",
            empty_message: match self.animal_id {
                Some(_) => "No tienes cuidados para este animal. ¡Añade uno!",
                None => "No tienes cuidados todavía. ¡Añade uno!",
            },
            feminine: false,
        }
    }

    fn delete_prompt(&self) -> String {
        "¿Estás seguro de que quieres eliminar este registro de cuidado?".to_string()
    }

    fn render_row(&self, care: &LivestockCare, actions: RowActions) -> RowView {
        let mut details = vec![
            format!("Animal: {}", animal_label(self.animals, &care.animal_id)),
            format!("Fecha: {}", display_date(care.date)),
        ];
        if !is_blank(&care.notes) {
            details.push(care.notes.clone());
        }
        RowView {
            id: care.id.clone(),
            heading: format!("{}: {}", care.care_type.label(), care.product),
            details,
            actions,
        }
    }

    fn render_form(&self, draft: &LivestockCare) -> Vec<FormField> {
        let date = draft
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        vec![
            FormField::new("Animal", animal_label(self.animals, &draft.animal_id)),
            FormField::new("Tipo de Cuidado", draft.care_type.label()),
            FormField::new("Producto / Tratamiento", draft.product.clone()),
            FormField::new("Fecha", date),
            FormField::new("Notas", draft.notes.clone()),
        ]
    }

    fn default_record(&self) -> LivestockCare {
        let animal_id = match self.animal_id {
            Some(id) => id.to_string(),
            None => self.animals.first().map(|a| a.id.clone()).unwrap_or_default(),
        };
        LivestockCare::new(animal_id)
    }
}
