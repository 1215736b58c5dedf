//! Test suite for the field notebook core.
//!
//! Tests are grouped by layer, bottom-up:
//!
//! 1. Slot backends and the persisted-slot adapter
//! 2. Collection controller state machine
//! 3. Feature areas: validation, ordering, joins, orphans
//! 4. Suggestions, calendar and router
//! 5. LMDB storage and the FFI surface
//!
//! LMDB tests run inside `tempfile` directories, so nothing is left behind.

#[cfg(test)]
pub mod tests {
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::app_response::AppResponse;
    use crate::calendar::{days_in_month, DayKind, Holiday, HolidayTable, MonthCursor};
    use crate::collection::{CollectionController, ListView, Mode};
    use crate::config::{NotebookConfig, DEFAULT_FALLBACK, DEFAULT_PERSONA};
    use crate::local_db_state::LocalSlotDb;
    use crate::lookup::UNKNOWN;
    use crate::models::{
        Animal, AnimalType, CareType, Farm, FarmProduct, FarmType, LivestockCarePlugin, Note,
        NotePlugin, FARMS_SLOT, FARM_PRODUCTS_SLOT, LIVESTOCK_SLOT, NOTES_SLOT,
    };
    use crate::notebook::{Notebook, NO_ANIMALS_MESSAGE, NO_FARMS_MESSAGE};
    use crate::persisted_slot::PersistedSlot;
    use crate::plugin::RowAction;
    use crate::record::{new_record_id, parse_date};
    use crate::router::{Router, Screen, Tab, HOME_CARDS};
    use crate::slot_backend::{MemorySlotBackend, SlotBackend};
    use crate::suggestions::{
        farm_prompt, format_blocks, SuggestionBlock, SuggestionRequest, SuggestionService,
    };
    use crate::{close_database, create_db, free_response, read_slot, write_slot};

    /// Memory backend that counts writes and can be told to fail them.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemorySlotBackend,
        writes: AtomicUsize,
        fail_writes: bool,
    }

    impl CountingBackend {
        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl SlotBackend for CountingBackend {
        fn read(&self, slot: &str) -> Result<Option<String>, AppResponse> {
            self.inner.read(slot)
        }

        fn write(&self, slot: &str, value: &str) -> Result<(), AppResponse> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(AppResponse::DatabaseError("disk full".to_string()));
            }
            self.inner.write(slot, value)
        }

        fn remove(&self, slot: &str) -> Result<bool, AppResponse> {
            self.inner.remove(slot)
        }
    }

    fn memory_notes() -> CollectionController<Note> {
        CollectionController::load(Arc::new(MemorySlotBackend::new()), NOTES_SLOT)
    }

    fn memory_notebook() -> Notebook {
        Notebook::open(Arc::new(MemorySlotBackend::new()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn saved_note(controller: &mut CollectionController<Note>, text: &str) -> String {
        controller.create(&NotePlugin);
        controller.update_draft(|note| note.set_text(text));
        controller.save().unwrap()
    }

    fn add_farm(
        notebook: &mut Notebook,
        name: &str,
        farm_type: FarmType,
        location: &str,
    ) -> String {
        notebook.new_farm();
        notebook.farms.update_draft(|farm| {
            farm.set_name(name);
            farm.set_farm_type(farm_type);
            farm.set_location(location);
        });
        notebook.save_farm().unwrap()
    }

    fn add_animal(notebook: &mut Notebook, tag: &str) -> String {
        notebook.new_animal();
        notebook.animals.update_draft(|animal| animal.set_tag(tag));
        notebook.save_animal().unwrap()
    }

    // ===============================
    // PERSISTED SLOT
    // ===============================

    #[test]
    fn test_slot_uses_default_when_absent() {
        let slot = PersistedSlot::load(Arc::new(MemorySlotBackend::new()), "farms", vec![1, 2]);
        assert_eq!(slot.get(), &vec![1, 2]);
        assert_eq!(slot.key(), "farms");
    }

    #[test]
    fn test_slot_reads_stored_value() {
        let backend = MemorySlotBackend::new().with_slot("counter", "[7,8,9]");
        let slot: PersistedSlot<Vec<u32>> =
            PersistedSlot::load(Arc::new(backend), "counter", vec![]);
        assert_eq!(slot.get(), &vec![7, 8, 9]);
    }

    #[test]
    fn test_slot_falls_back_on_unreadable_value() {
        let backend = MemorySlotBackend::new().with_slot("notes", "{not json");
        let slot: PersistedSlot<Vec<Note>> =
            PersistedSlot::load(Arc::new(backend), "notes", vec![]);
        assert!(slot.get().is_empty());
    }

    #[test]
    fn test_slot_set_and_update_persist() {
        let backend = Arc::new(CountingBackend::default());
        let mut slot = PersistedSlot::load(backend.clone(), "counter", 1u32);

        slot.set(5);
        slot.update(|prev| prev * 2);

        assert_eq!(*slot.get(), 10);
        assert_eq!(backend.writes(), 2);
        assert_eq!(backend.read("counter").unwrap().as_deref(), Some("10"));
    }

    #[test]
    fn test_slot_write_failure_keeps_memory_value() {
        let backend = Arc::new(CountingBackend::failing());
        let mut slot = PersistedSlot::load(backend.clone(), "counter", 0u32);

        slot.set(42);

        assert_eq!(*slot.get(), 42);
        assert_eq!(slot.failed_writes(), 1);
        assert_eq!(backend.read("counter").unwrap(), None);
    }

    // ===============================
    // COLLECTION CONTROLLER
    // ===============================

    #[test]
    fn test_create_then_save_stores_record_once() {
        let mut notes = memory_notes();
        assert_eq!(notes.mode(), Mode::List);

        let draft_id = notes.create(&NotePlugin).id.clone();
        assert_eq!(notes.mode(), Mode::Edit);
        assert!(notes.items().is_empty(), "draft must not be visible before save");

        let saved = notes.save().unwrap();
        assert_eq!(saved, draft_id);
        assert_eq!(notes.mode(), Mode::List);
        assert_eq!(notes.items().iter().filter(|n| n.id == draft_id).count(), 1);
    }

    #[test]
    fn test_edit_then_back_leaves_collection_untouched() {
        let backend = Arc::new(CountingBackend::default());
        let mut notes = CollectionController::<Note>::load(backend.clone(), NOTES_SLOT);
        let id = saved_note(&mut notes, "primera versión");
        let before = notes.items().to_vec();
        let writes = backend.writes();

        assert!(notes.edit_by_id(&id));
        notes.update_draft(|note| note.set_text("changed"));
        notes.back();

        assert_eq!(notes.items(), before.as_slice());
        assert_eq!(backend.writes(), writes);
        assert_eq!(notes.mode(), Mode::List);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let backend = Arc::new(CountingBackend::default());
        let mut notes = CollectionController::<Note>::load(backend.clone(), NOTES_SLOT);
        saved_note(&mut notes, "keep me");
        let writes = backend.writes();

        assert!(!notes.delete("does-not-exist"));
        assert_eq!(notes.items().len(), 1);
        assert_eq!(backend.writes(), writes);
    }

    #[test]
    fn test_second_save_updates_instead_of_inserting() {
        let mut notes = memory_notes();
        let id = saved_note(&mut notes, "riego");

        assert!(notes.edit_by_id(&id));
        notes.save();
        assert!(notes.save().is_none(), "no draft left after save");

        let record = notes.items()[0].clone();
        notes.edit(&record);
        notes.update_draft(|note| note.set_text("riego por goteo"));
        notes.save();

        assert_eq!(notes.items().len(), 1);
        assert_eq!(notes.items()[0].text, "riego por goteo");
    }

    #[test]
    fn test_save_keeps_insertion_order() {
        let mut notes = memory_notes();
        let first = saved_note(&mut notes, "uno");
        let second = saved_note(&mut notes, "dos");

        notes.edit_by_id(&first);
        notes.update_draft(|note| note.set_text("uno bis"));
        notes.save();

        let ids: Vec<&str> = notes.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    }

    #[test]
    fn test_dispatch_delete_requires_confirmation() {
        let mut notes = memory_notes();
        let id = saved_note(&mut notes, "borrar");

        let mut shown = String::new();
        let deleted = notes.dispatch(&NotePlugin, RowAction::Delete(id.clone()), |prompt| {
            shown = prompt.to_string();
            false
        });
        assert!(!deleted);
        assert_eq!(shown, "¿Estás seguro de que quieres eliminar esta nota?");
        assert_eq!(notes.items().len(), 1);

        assert!(notes.dispatch(&NotePlugin, RowAction::Delete(id), |_| true));
        assert!(notes.items().is_empty());
    }

    #[test]
    fn test_dispatch_edit_and_titles() {
        let mut notes = memory_notes();
        assert!(notes.edit_title(&NotePlugin).is_none());

        notes.create(&NotePlugin);
        assert_eq!(notes.edit_title(&NotePlugin).as_deref(), Some("Nueva Nota"));
        notes.update_draft(|note| note.set_text("x"));
        let id = notes.save().unwrap();

        assert!(notes.dispatch(&NotePlugin, RowAction::Edit(id), |_| unreachable!()));
        let form = notes.form(&NotePlugin).unwrap();
        assert_eq!(form.title, "Editar Nota");
        assert_eq!(form.fields[0].value, "x");
    }

    #[test]
    fn test_list_passes_row_actions() {
        let mut notes = memory_notes();
        let id = saved_note(&mut notes, "fila");

        let view = notes.list(&NotePlugin);
        let row = &view.rows()[0];
        assert_eq!(row.actions.edit, RowAction::Edit(id.clone()));
        assert_eq!(row.actions.delete, RowAction::Delete(id));
    }

    // ===============================
    // FEATURE AREAS
    // ===============================

    #[test]
    fn test_notes_scenario_empty_then_one() {
        let mut notebook = memory_notebook();

        match notebook.notes_list() {
            ListView::Empty { message, .. } => {
                assert_eq!(message, "No tienes notas todavía. ¡Añade una!")
            }
            other => panic!("expected empty state, got {other:?}"),
        }

        notebook.new_note();
        notebook.notes.update_draft(|note| note.set_text("Revisar riego"));
        notebook.save_note().unwrap();

        let view = notebook.notes_list();
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.rows()[0].heading, "Revisar riego");
        assert!(!view.rows()[0].details[0].is_empty());
        assert!(notebook.notes.items()[0].created_at.timestamp() > 0);
    }

    #[test]
    fn test_notes_listed_newest_first() {
        let mut notebook = memory_notebook();
        for (text, day) in [("vieja", 1), ("nueva", 20), ("media", 10)] {
            notebook.new_note();
            notebook.notes.update_draft(|note| {
                note.set_text(text);
                note.created_at = Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap();
            });
            notebook.save_note().unwrap();
        }

        let headings: Vec<String> = notebook
            .notes_list()
            .rows()
            .iter()
            .map(|r| r.heading.clone())
            .collect();
        assert_eq!(headings, vec!["nueva", "media", "vieja"]);

        let stored: Vec<&str> = notebook.notes.items().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(stored, vec!["vieja", "nueva", "media"]);
    }

    #[test]
    fn test_blank_note_is_rejected_and_draft_kept() {
        let mut notebook = memory_notebook();
        notebook.new_note();
        notebook.notes.update_draft(|note| note.set_text("   "));

        let err = notebook.save_note().unwrap_err();
        assert_eq!(
            err,
            AppResponse::ValidationError(
                "Por favor, escribe algo en la nota antes de guardar.".to_string()
            )
        );
        assert_eq!(notebook.notes.mode(), Mode::Edit);
        assert!(notebook.notes.items().is_empty());
    }

    #[test]
    fn test_required_fields_per_entity() {
        let mut notebook = memory_notebook();

        notebook.new_farm();
        notebook.farms.update_draft(|farm| farm.set_name("Sin ubicación"));
        assert!(matches!(notebook.save_farm(), Err(AppResponse::ValidationError(_))));

        add_farm(&mut notebook, "La Loma", FarmType::Grove, "Jaén");
        notebook.new_product(None).unwrap();
        notebook.products.update_draft(|p| {
            p.set_name("Cobre");
            p.set_application_date(None);
        });
        assert_eq!(
            notebook.save_product().unwrap_err().message(),
            "El nombre del producto y la fecha son obligatorios."
        );

        notebook.new_animal();
        assert_eq!(
            notebook.save_animal().unwrap_err().message(),
            "El número de crotal y la fecha de nacimiento son obligatorios."
        );
    }

    #[test]
    fn test_save_without_draft_is_bad_request() {
        let mut notebook = memory_notebook();
        assert!(matches!(notebook.save_farm(), Err(AppResponse::BadRequest(_))));
    }

    #[test]
    fn test_product_farm_name_and_orphaning() {
        let mut notebook = memory_notebook();
        let farm_id = add_farm(&mut notebook, "La Loma", FarmType::Grove, "Jaén");

        notebook.new_product(Some(farm_id.as_str())).unwrap();
        notebook.products.update_draft(|p| p.set_name("Oxicloruro de cobre"));
        let product_id = notebook.save_product().unwrap();

        assert_eq!(notebook.product_farm_name(&product_id).as_deref(), Some("La Loma"));
        assert_eq!(notebook.products_list().rows()[0].details[0], "Finca: La Loma");

        assert!(notebook.farms.delete(&farm_id));

        assert_eq!(notebook.product_farm_name(&product_id).as_deref(), Some(UNKNOWN));
        assert_eq!(notebook.products.items().len(), 1);
        assert_eq!(notebook.orphaned_products().len(), 1);
        assert_eq!(
            notebook.products_list().rows()[0].details[0],
            format!("Finca: {UNKNOWN}")
        );
    }

    #[test]
    fn test_products_filtered_by_farm() {
        let mut notebook = memory_notebook();
        let loma = add_farm(&mut notebook, "La Loma", FarmType::Grove, "Jaén");
        let pinar = add_farm(&mut notebook, "El Pinar", FarmType::PineForest, "Soria");

        for (farm, name) in [(&loma, "Cobre"), (&pinar, "Azufre"), (&loma, "Caolín")] {
            notebook.new_product(Some(farm.as_str())).unwrap();
            notebook.products.update_draft(|p| p.set_name(name));
            notebook.save_product().unwrap();
        }

        let names: Vec<String> = notebook
            .products_for_farm(&loma)
            .rows()
            .iter()
            .map(|r| r.heading.clone())
            .collect();
        assert_eq!(names, vec!["Cobre", "Caolín"]);
    }

    #[test]
    fn test_new_product_defaults_to_first_farm() {
        let mut notebook = memory_notebook();
        let first = add_farm(&mut notebook, "Uno", FarmType::Orchard, "Lleida");
        add_farm(&mut notebook, "Dos", FarmType::Other, "Huesca");

        let draft = notebook.new_product(None).unwrap();
        assert_eq!(draft.farm_id, first);
        assert!(draft.application_date.is_some());
    }

    #[test]
    fn test_care_requires_an_animal() {
        let mut notebook = memory_notebook();

        match notebook.care_list() {
            ListView::Empty { message, .. } => assert_eq!(message, NO_ANIMALS_MESSAGE),
            other => panic!("expected missing-animal hint, got {other:?}"),
        }
        assert!(notebook.new_care(None).is_err());

        let animal_id = add_animal(&mut notebook, "ES-001");
        let draft = notebook.new_care(None).unwrap();
        assert_eq!(draft.animal_id, animal_id);
        assert_eq!(draft.care_type, CareType::Treatment);
    }

    #[test]
    fn test_care_rows_join_animals() {
        let mut notebook = memory_notebook();
        let animal_id = add_animal(&mut notebook, "ES-001");

        notebook.new_care(Some(animal_id.as_str())).unwrap();
        notebook.care.update_draft(|c| {
            c.set_care_type(CareType::Vaccine);
            c.set_product("Enterotoxemia");
        });
        let care_id = notebook.save_care().unwrap();

        let view = notebook.care_for_animal(&animal_id);
        assert_eq!(view.rows()[0].heading, "Vacuna: Enterotoxemia");
        assert_eq!(notebook.care_animal_label(&care_id).as_deref(), Some("ES-001 (Oveja)"));

        notebook.animals.delete(&animal_id);
        assert_eq!(notebook.care_animal_label(&care_id).as_deref(), Some(UNKNOWN));
        assert_eq!(notebook.orphaned_care().len(), 1);
    }

    #[test]
    fn test_products_require_a_farm() {
        let mut notebook = memory_notebook();

        match notebook.products_list() {
            ListView::Empty { message, .. } => assert_eq!(message, NO_FARMS_MESSAGE),
            other => panic!("expected missing-farm hint, got {other:?}"),
        }
        assert_eq!(
            notebook.new_product(None).unwrap_err(),
            AppResponse::ValidationError(NO_FARMS_MESSAGE.to_string())
        );
        assert!(notebook.products.draft().is_none());

        add_farm(&mut notebook, "La Loma", FarmType::Grove, "Jaén");
        match notebook.products_list() {
            ListView::Empty { message, .. } => {
                assert_eq!(message, "No tienes productos todavía. ¡Añade uno!")
            }
            other => panic!("expected empty product list, got {other:?}"),
        }
    }

    #[test]
    fn test_per_parent_views_and_binding() {
        let mut notebook = memory_notebook();
        let first = add_farm(&mut notebook, "La Loma", FarmType::Grove, "Jaén");
        let second = add_farm(&mut notebook, "El Pinar", FarmType::PineForest, "Soria");

        match notebook.products_for_farm(&second) {
            ListView::Empty { message, .. } => {
                assert_eq!(message, "No tienes productos para esta finca. ¡Añade uno!")
            }
            other => panic!("expected empty farm view, got {other:?}"),
        }

        let draft = notebook.new_product(Some(second.as_str())).unwrap();
        assert_eq!(draft.farm_id, second);
        notebook.products.update_draft(|p| p.set_name("Azufre"));
        notebook.save_product().unwrap();

        assert_eq!(notebook.products_for_farm(&second).rows().len(), 1);
        assert!(notebook.products_for_farm(&first).is_empty());

        let animal_id = add_animal(&mut notebook, "ES-001");
        match notebook.care_for_animal(&animal_id) {
            ListView::Empty { message, .. } => {
                assert_eq!(message, "No tienes cuidados para este animal. ¡Añade uno!")
            }
            other => panic!("expected empty animal view, got {other:?}"),
        }
    }

    #[test]
    fn test_care_delete_prompt_names_the_record() {
        let mut notebook = memory_notebook();
        let animal_id = add_animal(&mut notebook, "ES-001");
        notebook.new_care(Some(animal_id.as_str())).unwrap();
        notebook.care.update_draft(|c| c.set_product("Ivermectina"));
        let care_id = notebook.save_care().unwrap();

        let plugin = LivestockCarePlugin::new(notebook.animals.items());
        assert_eq!(
            notebook.care.delete_prompt(&plugin, &care_id).as_deref(),
            Some("¿Estás seguro de que quieres eliminar este registro de cuidado?")
        );
    }

    #[test]
    fn test_notebook_reports_failed_writes() {
        let mut notebook = Notebook::open(Arc::new(CountingBackend::failing()));
        notebook.new_note();
        notebook.notes.update_draft(|note| note.set_text("sin disco"));

        assert!(notebook.save_note().is_ok());
        assert_eq!(notebook.notes.items().len(), 1);
        assert_eq!(notebook.failed_writes(), 1);
    }

    // ===============================
    // RECORD FORMAT
    // ===============================

    #[test]
    fn test_records_use_stored_field_names() {
        let farm = Farm {
            id: "1".to_string(),
            name: "La Loma".to_string(),
            farm_type: FarmType::Grove,
            location: "Jaén".to_string(),
            notes: String::new(),
        };
        let value = serde_json::to_value(&farm).unwrap();
        assert_eq!(value["type"], "olivar");

        let product = FarmProduct {
            id: "2".to_string(),
            name: "Cobre".to_string(),
            description: String::new(),
            application_date: Some(date(2024, 3, 1)),
            farm_id: "1".to_string(),
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["applicationDate"], "2024-03-01");
        assert_eq!(value["farmId"], "1");
    }

    #[test]
    fn test_reads_records_written_by_host() {
        let stored = r#"[{"id":"1717171717171","tag":"ES-9","type":"cabra",
            "birthDate":"2023-04-02","notes":""}]"#;
        let backend = MemorySlotBackend::new().with_slot("livestock", stored);
        let notebook = Notebook::open(Arc::new(backend));

        let animal: &Animal = &notebook.animals.items()[0];
        assert_eq!(animal.animal_type, AnimalType::Goat);
        assert_eq!(animal.birth_date, Some(date(2023, 4, 2)));
    }

    #[test]
    fn test_cleared_dates_keep_the_collection() {
        let animals = r#"[
            {"id":"1","tag":"ES-001","type":"oveja","birthDate":"2023-01-01","notes":""},
            {"id":"2","tag":"ES-002","type":"cabra","birthDate":"","notes":""},
            {"id":"3","tag":"ES-003","type":"oveja","birthDate":null,"notes":""}
        ]"#;
        let products = r#"[{"id":"4","name":"Cobre","description":"","applicationDate":"",
            "farmId":"9"}]"#;
        let backend = Arc::new(
            MemorySlotBackend::new()
                .with_slot(LIVESTOCK_SLOT, animals)
                .with_slot(FARM_PRODUCTS_SLOT, products),
        );
        let mut notebook = Notebook::open(backend.clone());

        let dates: Vec<Option<NaiveDate>> =
            notebook.animals.items().iter().map(|a| a.birth_date).collect();
        assert_eq!(dates, vec![Some(date(2023, 1, 1)), None, None]);
        assert_eq!(notebook.products.items()[0].application_date, None);

        add_animal(&mut notebook, "ES-004");

        let stored = backend.read(LIVESTOCK_SLOT).unwrap().unwrap();
        let stored: Vec<Animal> = serde_json::from_str(&stored).unwrap();
        let tags: Vec<&str> = stored.iter().map(|a| a.tag.as_str()).collect();
        assert_eq!(tags, vec!["ES-001", "ES-002", "ES-003", "ES-004"]);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let ids: Vec<u64> = (0..500).map(|_| new_record_id().parse().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_parse_date_input() {
        assert_eq!(parse_date(" 2024-10-12 "), Some(date(2024, 10, 12)));
        assert_eq!(parse_date("12/10/2024"), None);
        assert_eq!(FarmType::from_token("frutales"), Some(FarmType::Orchard));
    }

    // ===============================
    // SUGGESTIONS
    // ===============================

    fn suggestion_farm() -> Farm {
        Farm {
            id: "1".to_string(),
            name: "La Loma".to_string(),
            farm_type: FarmType::Grove,
            location: "Jaén".to_string(),
            notes: "riego por goteo".to_string(),
        }
    }

    #[test]
    fn test_failing_generator_yields_fallback() {
        let failing = |_: &SuggestionRequest| -> Result<String, AppResponse> {
            Err(AppResponse::BadRequest("network unreachable".to_string()))
        };
        let service = SuggestionService::new(failing, NotebookConfig::default().suggestions);

        let suggestion = service.for_farm(&suggestion_farm());
        assert!(suggestion.is_fallback);
        assert_eq!(suggestion.text, DEFAULT_FALLBACK);
        assert_eq!(suggestion.title, "Sugerencias para La Loma");
    }

    #[test]
    fn test_empty_response_yields_fallback() {
        let empty =
            |_: &SuggestionRequest| -> Result<String, AppResponse> { Ok("  \n".to_string()) };
        let service = SuggestionService::new(empty, NotebookConfig::default().suggestions);
        assert!(service.for_farm(&suggestion_farm()).is_fallback);
    }

    #[test]
    fn test_request_carries_persona_and_prompt() {
        let echo = |req: &SuggestionRequest| -> Result<String, AppResponse> {
            assert_eq!(req.system_instruction, DEFAULT_PERSONA);
            assert_eq!(req.model, "gemini-2.5-flash");
            Ok(format!("## Plan\n* {}", req.prompt))
        };
        let service = SuggestionService::new(echo, NotebookConfig::default().suggestions);

        let suggestion = service.for_farm(&suggestion_farm());
        assert!(!suggestion.is_fallback);
        assert_eq!(suggestion.blocks[0], SuggestionBlock::Heading("Plan".to_string()));
        assert_eq!(
            suggestion.blocks[1],
            SuggestionBlock::Bullet(farm_prompt(&suggestion_farm()))
        );
    }

    #[test]
    fn test_farm_prompt_interpolates_fields() {
        assert_eq!(
            farm_prompt(&suggestion_farm()),
            "Proporciona sugerencias de cuidado para una finca de tipo 'olivar' llamada 'La Loma', \
             ubicada en 'Jaén'. Notas adicionales: \"riego por goteo\"."
        );
    }

    #[test]
    fn test_format_blocks() {
        let blocks =
            format_blocks("# Poda\n\nPoda en invierno.\n- Desinfecta\n* Quema restos\n### Riego");
        assert_eq!(
            blocks,
            vec![
                SuggestionBlock::Heading("Poda".to_string()),
                SuggestionBlock::Paragraph("Poda en invierno.".to_string()),
                SuggestionBlock::Bullet("Desinfecta".to_string()),
                SuggestionBlock::Bullet("Quema restos".to_string()),
                SuggestionBlock::Heading("Riego".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_blocks_star_bullets_and_bold() {
        let blocks = format_blocks("*Poda temprana\n**Importante:** no regar de noche");
        assert_eq!(
            blocks,
            vec![
                SuggestionBlock::Bullet("Poda temprana".to_string()),
                SuggestionBlock::Paragraph("**Importante:** no regar de noche".to_string()),
            ]
        );
    }

    #[test]
    fn test_notebook_suggestion_for_missing_farm() {
        let notebook = memory_notebook();
        let never = |_: &SuggestionRequest| -> Result<String, AppResponse> { unreachable!() };
        let service = SuggestionService::new(never, NotebookConfig::default().suggestions);
        assert!(notebook.suggest_for_farm(&service, "nope").is_none());
    }

    // ===============================
    // CALENDAR
    // ===============================

    #[test]
    fn test_month_grid_is_monday_first() {
        // 2024-02-01 was a Thursday.
        let cursor = MonthCursor::new(2024, 2).unwrap();
        let grid = cursor.grid(date(2024, 6, 1), &HolidayTable::default());

        assert_eq!(grid.title, "Febrero 2024");
        assert_eq!(grid.leading_blanks, 3);
        assert_eq!(grid.days.len(), 29);
        assert!(grid.days.iter().all(|d| d.kind == DayKind::Regular));
    }

    #[test]
    fn test_month_grid_marks_holidays_and_today() {
        let holidays = HolidayTable::new(vec![
            Holiday { date: date(2024, 1, 1), name: "Año Nuevo".to_string() },
            Holiday { date: date(2024, 1, 6), name: "Epifanía del Señor".to_string() },
        ]);
        let grid = MonthCursor::new(2024, 1).unwrap().grid(date(2024, 1, 1), &holidays);

        assert_eq!(grid.leading_blanks, 0);
        assert_eq!(grid.days[0].kind, DayKind::Today);
        assert_eq!(grid.days[0].holiday.as_deref(), Some("Año Nuevo"));
        assert_eq!(grid.days[5].kind, DayKind::Holiday);
        assert_eq!(grid.days[5].holiday.as_deref(), Some("Epifanía del Señor"));
    }

    #[test]
    fn test_change_month_rolls_over_years() {
        let mut cursor = MonthCursor::containing(date(2024, 12, 25));
        cursor.change_month(1);
        assert_eq!((cursor.year(), cursor.month()), (2025, 1));
        assert_eq!(cursor.title(), "Enero 2025");

        cursor.change_month(-13);
        assert_eq!((cursor.year(), cursor.month()), (2023, 12));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 13), None);
    }

    // ===============================
    // ROUTER
    // ===============================

    #[test]
    fn test_router_push_and_back() {
        let mut router = Router::new();
        assert!(!router.back());

        router.navigate(Screen::Farms);
        router.navigate(Screen::FarmProducts {
            farm_id: "1".to_string(),
            farm_name: "La Loma".to_string(),
        });
        router.navigate(Screen::FarmProductEdit {
            farm_id: "1".to_string(),
            product_id: None,
        });
        assert_eq!(router.depth(), 3);
        assert_eq!(router.current_tab(), Tab::Farms);

        assert!(router.back());
        assert!(matches!(router.current(), Screen::FarmProducts { .. }));
        assert!(router.back());
        assert_eq!(router.current(), &Screen::Farms);
        assert!(!router.back());
    }

    #[test]
    fn test_router_tab_switch_resets_stack() {
        let mut router = Router::new();
        router.navigate(Screen::LivestockEdit { animal_id: None });
        assert_eq!(router.depth(), 2);

        router.select_tab(Tab::Notes);
        assert_eq!(router.current(), &Screen::Notes);
        assert_eq!(router.depth(), 1);
        assert_eq!(Tab::ALL.map(Tab::label), ["Inicio", "Notas", "Calendario", "Fincas", "Ganado"]);
    }

    #[test]
    fn test_home_cards_open_their_screens() {
        let screens: Vec<Screen> = HOME_CARDS.iter().map(|card| card.screen.clone()).collect();
        assert_eq!(
            screens,
            vec![
                Screen::Notes,
                Screen::Calendar,
                Screen::Farms,
                Screen::AllFarmProducts,
                Screen::Livestock,
                Screen::AllLivestockCare,
            ]
        );

        for card in HOME_CARDS.iter() {
            let mut router = Router::new();
            router.navigate(card.screen.clone());
            assert_eq!(router.current(), &card.screen, "card '{}'", card.title);
        }

        let mut router = Router::new();
        router.navigate(Screen::AllLivestockCare);
        assert_eq!(router.current_tab(), Tab::Livestock);
        assert!(router.back());
        assert_eq!(router.current(), &Screen::Livestock);
    }

    // ===============================
    // CONFIG
    // ===============================

    #[test]
    fn test_config_defaults_and_overrides() {
        let config = NotebookConfig::from_json_str(r#"{"dbPath":"/tmp/cuaderno.lmdb"}"#).unwrap();
        assert_eq!(config.db_path.to_str(), Some("/tmp/cuaderno.lmdb"));
        assert_eq!(config.suggestions.fallback_message, DEFAULT_FALLBACK);

        assert!(matches!(
            NotebookConfig::from_json_str(r#"{"mapSize":0}"#),
            Err(AppResponse::BadRequest(_))
        ));
        assert!(matches!(
            NotebookConfig::from_json_str("not json"),
            Err(AppResponse::SerializationError(_))
        ));
    }

    #[test]
    fn test_config_file_layers_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notebook.json");
        std::fs::write(&path, r#"{"suggestions":{"model":"gemini-2.5-pro"}}"#).unwrap();

        let config = NotebookConfig::from_json_file(&path).unwrap();
        assert_eq!(config.suggestions.model, "gemini-2.5-pro");
        assert_eq!(config.suggestions.persona, DEFAULT_PERSONA);
        assert_eq!(config.map_size, NotebookConfig::default().map_size);

        assert!(matches!(
            NotebookConfig::from_json_file(dir.path().join("missing.json")),
            Err(AppResponse::BadRequest(_))
        ));
    }

    // ===============================
    // LMDB STORAGE
    // ===============================

    #[test]
    fn test_lmdb_slot_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let db = LocalSlotDb::init(dir.path().join("slots.lmdb"), 1024 * 1024).unwrap();

        assert_eq!(db.read(FARMS_SLOT).unwrap(), None);
        db.write(FARMS_SLOT, "[]").unwrap();
        assert_eq!(db.read(FARMS_SLOT).unwrap().as_deref(), Some("[]"));

        assert!(db.remove(FARMS_SLOT).unwrap());
        assert!(!db.remove(FARMS_SLOT).unwrap());
    }

    #[test]
    fn test_lmdb_clear_reset_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = LocalSlotDb::init(dir.path().join("maint.lmdb"), 1024 * 1024).unwrap();
        db.write(NOTES_SLOT, "[]").unwrap();
        db.write(FARMS_SLOT, "[]").unwrap();

        db.clear_all_slots().unwrap();
        assert_eq!(db.read(NOTES_SLOT).unwrap(), None);

        db.write(NOTES_SLOT, "[]").unwrap();
        db.reset_database().unwrap();
        assert_eq!(db.read(NOTES_SLOT).unwrap(), None);

        db.close_database().unwrap();
        assert!(matches!(db.read(NOTES_SLOT), Err(AppResponse::DatabaseError(_))));
    }

    #[test]
    fn test_notebook_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotebookConfig::default().with_db_path(dir.path().join("notebook.lmdb"));

        {
            let mut notebook = Notebook::open_with_config(&config).unwrap();
            add_farm(&mut notebook, "La Loma", FarmType::Grove, "Jaén");
            notebook.new_note();
            notebook.notes.update_draft(|note| note.attach_photo("file:///fotos/olivo.jpg"));
            notebook.notes.update_draft(|note| note.set_text("Foto del olivo"));
            notebook.save_note().unwrap();
        }

        let notebook = Notebook::open_with_config(&config).unwrap();
        assert_eq!(notebook.farms.items()[0].name, "La Loma");
        assert_eq!(
            notebook.notes.items()[0].photo.as_deref(),
            Some("file:///fotos/olivo.jpg")
        );
    }

    // ===============================
    // FFI
    // ===============================

    fn take_response(ptr: *const c_char) -> AppResponse {
        assert!(!ptr.is_null());
        let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        free_response(ptr);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_ffi_write_and_read_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = CString::new(dir.path().join("ffi.lmdb").to_str().unwrap()).unwrap();
        let state = create_db(path.as_ptr());
        assert!(!state.is_null());

        let slot = CString::new("livestock").unwrap();
        let json = CString::new(
            r#"[{"id":"1","tag":"ES-1","type":"oveja","birthDate":"2022-01-01","notes":""}]"#,
        )
        .unwrap();

        let written = take_response(write_slot(state, slot.as_ptr(), json.as_ptr()));
        assert!(matches!(written, AppResponse::Ok(_)));

        match take_response(read_slot(state, slot.as_ptr())) {
            AppResponse::Ok(stored) => assert_eq!(stored, json.to_str().unwrap()),
            other => panic!("expected stored slot, got {other:?}"),
        }

        let missing = CString::new("farms").unwrap();
        assert!(matches!(
            take_response(read_slot(state, missing.as_ptr())),
            AppResponse::NotFound(_)
        ));

        assert!(matches!(take_response(close_database(state)), AppResponse::Ok(_)));
    }

    #[test]
    fn test_ffi_rejects_bad_input() {
        let slot = CString::new("notes").unwrap();
        assert!(matches!(
            take_response(read_slot(std::ptr::null_mut(), slot.as_ptr())),
            AppResponse::BadRequest(_)
        ));
        assert!(create_db(std::ptr::null()).is_null());

        let dir = tempfile::tempdir().unwrap();
        let path = CString::new(dir.path().join("bad.lmdb").to_str().unwrap()).unwrap();
        let state = create_db(path.as_ptr());
        let garbage = CString::new("{oops").unwrap();
        assert!(matches!(
            take_response(write_slot(state, slot.as_ptr(), garbage.as_ptr())),
            AppResponse::SerializationError(_)
        ));
        assert!(matches!(
            take_response(write_slot(state, slot.as_ptr(), std::ptr::null())),
            AppResponse::BadRequest(_)
        ));
        take_response(close_database(state));
    }
}
