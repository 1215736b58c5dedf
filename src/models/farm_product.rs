use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::lookup::display_or_unknown;
use crate::plugin::{FormField, ItemLabels, RecordPlugin, RowActions, RowView};
use crate::record::{display_date, new_record_id, today, Record};

use super::farm::Farm;
use super::is_blank;

/// Phytosanitary product applied on a farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, deserialize_with = "crate::record::deserialize_optional_date")]
    pub application_date: Option<NaiveDate>,
    pub farm_id: String,
}

impl FarmProduct {
    pub fn new(farm_id: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: String::new(),
            description: String::new(),
            application_date: Some(today()),
            farm_id: farm_id.into(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_application_date(&mut self, date: Option<NaiveDate>) {
        self.application_date = date;
    }

    pub fn set_farm_id(&mut self, farm_id: impl Into<String>) {
        self.farm_id = farm_id.into();
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if is_blank(&self.name) || self.application_date.is_none() {
            return Err(AppResponse::validation(
                "El nombre del producto y la fecha son obligatorios.",
            ));
        }
        Ok(())
    }
}

impl Record for FarmProduct {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn farm_name(farms: &[Farm], farm_id: &str) -> String {
    display_or_unknown(farms, farm_id, |farm| farm.name.clone())
}

/// Joins products against `farms` when rendering. `farm_id` binds new drafts
/// to one farm; without it they go to the first farm.
pub struct FarmProductPlugin<'a> {
    pub farms: &'a [Farm],
    pub farm_id: Option<&'a str>,
}

impl<'a> FarmProductPlugin<'a> {
    pub fn new(farms: &'a [Farm]) -> Self {
        Self { farms, farm_id: None }
    }

    pub fn for_farm(farms: &'a [Farm], farm_id: &'a str) -> Self {
        Self {
            farms,
            farm_id: Some(farm_id),
        }
    }
}

impl RecordPlugin for FarmProductPlugin<'_> {
    type Record = FarmProduct;

    fn labels(&self) -> ItemLabels {
        ItemLabels {
            singular: "Producto",
            title: "Productos Fitosanitarios",
            empty_message: match self.farm_id {
                Some(_) => "No tienes productos para esta finca. ¡Añade uno!",
                None => "No tienes productos todavía. ¡Añade uno!",
            },
            feminine: false,
        }
    }

    fn render_row(&self, product: &FarmProduct, actions: RowActions) -> RowView {
        let mut details = vec![
            format!("Finca: {}", farm_name(self.farms, &product.farm_id)),
            format!("Aplicación: {}", display_date(product.application_date)),
        ];
        if !is_blank(&product.description) {
            details.push(product.description.clone());
        }
        RowView {
            id: product.id.clone(),
            heading: product.name.clone(),
            details,
            actions,
        }
    }

    fn render_form(&self, draft: &FarmProduct) -> Vec<FormField> {
        let date = draft
            .application_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        vec![
            FormField::new("Finca", farm_name(self.farms, &draft.farm_id)),
            FormField::new("Nombre del Producto", draft.name.clone()),
            FormField::new("Fecha de Aplicación", date),
            FormField::new("Descripción / Dosis", draft.description.clone()),
        ]
    }

    fn default_record(&self) -> FarmProduct {
        let farm_id = match self.farm_id {
            Some(id) => id.to_string(),
            None => self.farms.first().map(|f| f.id.clone()).unwrap_or_default(),
        };
        FarmProduct::new(farm_id)
    }
}
