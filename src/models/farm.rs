use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::plugin::{FormField, ItemLabels, RecordPlugin, RowActions, RowView};
use crate::record::{new_record_id, Record};

use super::is_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FarmType {
    #[default]
    #[serde(rename = "olivar")]
    Grove,
    #[serde(rename = "pinar")]
    PineForest,
    #[serde(rename = "frutales")]
    Orchard,
    #[serde(rename = "otro")]
    Other,
}

impl FarmType {
    pub const ALL: [FarmType; 4] = [
        FarmType::Grove,
        FarmType::PineForest,
        FarmType::Orchard,
        FarmType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FarmType::Grove => "Olivar",
            FarmType::PineForest => "Pinar",
            FarmType::Orchard => "Árboles Frutales",
            FarmType::Other => "Otro",
        }
    }

    /// Stored token, also used in suggestion prompts.
    pub fn token(self) -> &'static str {
        match self {
            FarmType::Grove => "olivar",
            FarmType::PineForest => "pinar",
            FarmType::Orchard => "frutales",
            FarmType::Other => "otro",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.token() == token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub farm_type: FarmType,
    pub location: String,
    pub notes: String,
}

impl Farm {
    pub fn new() -> Self {
        Self {
            id: new_record_id(),
            name: String::new(),
            farm_type: FarmType::default(),
            location: String::new(),
            notes: String::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_farm_type(&mut self, farm_type: FarmType) {
        self.farm_type = farm_type;
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if is_blank(&self.name) || is_blank(&self.location) {
            return Err(AppResponse::validation("El nombre y la ubicación son obligatorios."));
        }
        Ok(())
    }
}

impl Default for Farm {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for Farm {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct FarmPlugin;

impl RecordPlugin for FarmPlugin {
    type Record = Farm;

    fn labels(&self) -> ItemLabels {
        ItemLabels {
            singular: "Finca",
            title: "Gestión de Fincas",
            empty_message: "No tienes fincas todavía. ¡Añade una!",
            feminine: true,
        }
    }

    fn render_row(&self, farm: &Farm, actions: RowActions) -> RowView {
        let mut details = vec![format!("{} - {}", farm.farm_type.label(), farm.location)];
        if !is_blank(&farm.notes) {
            details.push(farm.notes.clone());
        }
        RowView {
            id: farm.id.clone(),
            heading: farm.name.clone(),
            details,
            actions,
        }
    }

    fn render_form(&self, draft: &Farm) -> Vec<FormField> {
        vec![
            FormField::new("Nombre de la Finca", draft.name.clone()),
            FormField::new("Tipo", draft.farm_type.label()),
            FormField::new("Ubicación", draft.location.clone()),
            FormField::new("Notas", draft.notes.clone()),
        ]
    }

    fn default_record(&self) -> Farm {
        Farm::new()
    }
}
