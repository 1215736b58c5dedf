//! Feature areas of the notebook.
//!
//! [`Notebook`] holds one collection controller per entity, all over the same
//! slot backend. It adds what the generic controller leaves to callers:
//! required-field checks before saving, the note ordering, per-parent views
//! and the joins between products and farms, and care records and animals.

use std::sync::Arc;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::collection::{CollectionController, ListView};
use crate::config::NotebookConfig;
use crate::local_db_state::LocalSlotDb;
use crate::lookup::{find_by_id, orphans};
use crate::models::farm_product::farm_name;
use crate::models::livestock_care::animal_label;
use crate::models::{
    Animal, AnimalPlugin, Farm, FarmPlugin, FarmProduct, FarmProductPlugin, LivestockCare,
    LivestockCarePlugin, Note, NotePlugin, FARMS_SLOT, FARM_PRODUCTS_SLOT, LIVESTOCK_CARE_SLOT,
    LIVESTOCK_SLOT, NOTES_SLOT,
};
use crate::plugin::RecordPlugin;
use crate::record::Record;
use crate::slot_backend::SlotBackend;
use crate::suggestions::{Suggestion, SuggestionService, TextGenerator};

pub const NO_FARMS_MESSAGE: &str =
    "Debes crear al menos una finca antes de poder añadir productos.";

pub const NO_ANIMALS_MESSAGE: &str =
    "Debes registrar al menos un animal antes de poder añadir cuidados.";

pub struct Notebook {
    pub notes: CollectionController<Note>,
    pub farms: CollectionController<Farm>,
    pub products: CollectionController<FarmProduct>,
    pub animals: CollectionController<Animal>,
    pub care: CollectionController<LivestockCare>,
}

impl Notebook {
    pub fn open(backend: Arc<dyn SlotBackend>) -> Self {
        let notebook = Self {
            notes: CollectionController::load(Arc::clone(&backend), NOTES_SLOT),
            farms: CollectionController::load(Arc::clone(&backend), FARMS_SLOT),
            products: CollectionController::load(Arc::clone(&backend), FARM_PRODUCTS_SLOT),
            animals: CollectionController::load(Arc::clone(&backend), LIVESTOCK_SLOT),
            care: CollectionController::load(backend, LIVESTOCK_CARE_SLOT),
        };
        info!(
            "Notebook opened: {} notes, {} farms, {} products, {} animals, {} care records",
            notebook.notes.items().len(),
            notebook.farms.items().len(),
            notebook.products.items().len(),
            notebook.animals.items().len(),
            notebook.care.items().len()
        );
        notebook
    }

    /// Opens the LMDB environment named by `config` and loads every slot.
    pub fn open_with_config(config: &NotebookConfig) -> Result<Self, AppResponse> {
        let db = LocalSlotDb::from_config(config)?;
        Ok(Self::open(Arc::new(db)))
    }

    // Notes

    /// Notes, newest first. Storage keeps insertion order.
    pub fn notes_list(&self) -> ListView {
        let mut sorted: Vec<&Note> = self.notes.items().iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.notes.list_records(&NotePlugin, sorted)
    }

    pub fn new_note(&mut self) -> &Note {
        self.notes.create(&NotePlugin)
    }

    pub fn save_note(&mut self) -> Result<String, AppResponse> {
        save_validated(&mut self.notes, Note::validate)
    }

    // Farms

    pub fn farms_list(&self) -> ListView {
        self.farms.list(&FarmPlugin)
    }

    pub fn new_farm(&mut self) -> &Farm {
        self.farms.create(&FarmPlugin)
    }

    pub fn save_farm(&mut self) -> Result<String, AppResponse> {
        save_validated(&mut self.farms, Farm::validate)
    }

    // Farm products

    /// All products. Without farms the list is replaced by a hint to create
    /// one first.
    pub fn products_list(&self) -> ListView {
        let plugin = FarmProductPlugin::new(self.farms.items());
        if self.farms.items().is_empty() {
            return ListView::Empty {
                title: plugin.labels().title.to_string(),
                message: NO_FARMS_MESSAGE.to_string(),
            };
        }
        self.products.list(&plugin)
    }

    /// Products applied on one farm.
    pub fn products_for_farm(&self, farm_id: &str) -> ListView {
        let plugin = FarmProductPlugin::for_farm(self.farms.items(), farm_id);
        let records = self.products.items().iter().filter(|p| p.farm_id == farm_id);
        self.products.list_records(&plugin, records)
    }

    /// New product draft, bound to `farm_id` or to the first farm. Refused
    /// while no farm exists.
    pub fn new_product(&mut self, farm_id: Option<&str>) -> Result<&FarmProduct, AppResponse> {
        if farm_id.is_none() && self.farms.items().is_empty() {
            return Err(AppResponse::validation(NO_FARMS_MESSAGE));
        }
        let plugin = FarmProductPlugin {
            farms: self.farms.items(),
            farm_id,
        };
        Ok(self.products.create(&plugin))
    }

    pub fn save_product(&mut self) -> Result<String, AppResponse> {
        save_validated(&mut self.products, FarmProduct::validate)
    }

    /// Name of the farm a stored product points at; "Desconocido" once the
    /// farm is gone.
    pub fn product_farm_name(&self, product_id: &str) -> Option<String> {
        let product = find_by_id(self.products.items(), product_id)?;
        Some(farm_name(self.farms.items(), &product.farm_id))
    }

    pub fn orphaned_products(&self) -> Vec<&FarmProduct> {
        orphans(self.products.items(), self.farms.items(), |p| p.farm_id.as_str())
    }

    // Livestock

    pub fn animals_list(&self) -> ListView {
        self.animals.list(&AnimalPlugin)
    }

    pub fn new_animal(&mut self) -> &Animal {
        self.animals.create(&AnimalPlugin)
    }

    pub fn save_animal(&mut self) -> Result<String, AppResponse> {
        save_validated(&mut self.animals, Animal::validate)
    }

    // Livestock care

    /// All care records. Without animals the list is replaced by a hint to
    /// register one first.
    pub fn care_list(&self) -> ListView {
        let plugin = LivestockCarePlugin::new(self.animals.items());
        if self.animals.items().is_empty() {
            return ListView::Empty {
                title: plugin.labels().title.to_string(),
                message: NO_ANIMALS_MESSAGE.to_string(),
            };
        }
        self.care.list(&plugin)
    }

    pub fn care_for_animal(&self, animal_id: &str) -> ListView {
        let plugin = LivestockCarePlugin::for_animal(self.animals.items(), animal_id);
        let records = self.care.items().iter().filter(|c| c.animal_id == animal_id);
        self.care.list_records(&plugin, records)
    }

    /// New care draft, bound to `animal_id` or to the first animal. Refused
    /// while no animal exists.
    pub fn new_care(&mut self, animal_id: Option<&str>) -> Result<&LivestockCare, AppResponse> {
        if animal_id.is_none() && self.animals.items().is_empty() {
            return Err(AppResponse::validation(NO_ANIMALS_MESSAGE));
        }
        let plugin = LivestockCarePlugin {
            animals: self.animals.items(),
            animal_id,
        };
        Ok(self.care.create(&plugin))
    }

    pub fn save_care(&mut self) -> Result<String, AppResponse> {
        save_validated(&mut self.care, LivestockCare::validate)
    }

    pub fn care_animal_label(&self, care_id: &str) -> Option<String> {
        let care = find_by_id(self.care.items(), care_id)?;
        Some(animal_label(self.animals.items(), &care.animal_id))
    }

    pub fn orphaned_care(&self) -> Vec<&LivestockCare> {
        orphans(self.care.items(), self.animals.items(), |c| c.animal_id.as_str())
    }

    // Suggestions

    pub fn suggest_for_farm<G: TextGenerator>(
        &self,
        service: &SuggestionService<G>,
        farm_id: &str,
    ) -> Option<Suggestion> {
        find_by_id(self.farms.items(), farm_id).map(|farm| service.for_farm(farm))
    }

    pub fn suggest_for_animal<G: TextGenerator>(
        &self,
        service: &SuggestionService<G>,
        animal_id: &str,
    ) -> Option<Suggestion> {
        find_by_id(self.animals.items(), animal_id).map(|animal| service.for_animal(animal))
    }

    /// Total failed slot writes across all collections.
    pub fn failed_writes(&self) -> usize {
        self.notes.failed_writes()
            + self.farms.failed_writes()
            + self.products.failed_writes()
            + self.animals.failed_writes()
            + self.care.failed_writes()
    }
}

/// Checks the draft before handing it to the controller. A rejected draft
/// stays in place for correction.
fn save_validated<T, V>(
    controller: &mut CollectionController<T>,
    validate: V,
) -> Result<String, AppResponse>
where
    T: Record,
    V: Fn(&T) -> Result<(), AppResponse>,
{
    let draft = controller.draft().ok_or_else(|| {
        AppResponse::BadRequest(format!(
            "No draft in edit for slot '{}'",
            controller.slot_name()
        ))
    })?;
    if let Err(e) = validate(draft) {
        warn!("Draft rejected in slot '{}': {}", controller.slot_name(), e);
        return Err(e);
    }
    controller.save().ok_or_else(|| {
        AppResponse::BadRequest(format!("Nothing saved in slot '{}'", controller.slot_name()))
    })
}
