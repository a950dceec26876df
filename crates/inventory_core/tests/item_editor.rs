use inventory_core::db::open_db_in_memory;
use inventory_core::{
    DeleteOutcome, EditorError, EditorMode, FormError, InventoryService, ItemEditor, ItemImage,
    ItemUri, ItemValues, SaveOutcome, SqliteItemRepository,
};

#[test]
fn blank_new_item_is_not_saved() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let mut editor = ItemEditor::new_item();
    editor.set_name("   ");
    assert_eq!(editor.save(&service).unwrap(), SaveOutcome::Skipped);
    assert!(service.list_items().unwrap().is_empty());
}

#[test]
fn saving_a_new_item_inserts_with_defaults_then_switches_to_update() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let mut editor = ItemEditor::new_item();
    assert_eq!(editor.mode(), EditorMode::New);
    editor.set_name("Toto");
    editor.set_description("Terrier");

    let SaveOutcome::Inserted(uri) = editor.save(&service).unwrap() else {
        panic!("expected insert");
    };
    assert_eq!(editor.mode(), EditorMode::Existing(uri));
    assert!(!editor.has_unsaved_changes());

    let item = service.get_item(uri.id().unwrap()).unwrap().unwrap();
    assert_eq!(item.quantity, 1);
    assert_eq!(item.price, 0);

    editor.set_price_text("7");
    assert_eq!(editor.save(&service).unwrap(), SaveOutcome::Updated);
    assert_eq!(service.list_items().unwrap().len(), 1);
    assert_eq!(service.get_item(uri.id().unwrap()).unwrap().unwrap().price, 7);
}

#[test]
fn open_loads_existing_row_into_form() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let uri = service
        .insert(
            ItemUri::Collection,
            &ItemValues::new()
                .with_name("Lamp")
                .with_quantity(4)
                .with_price(12)
                .with_image(Some(ItemImage::Uri("content://media/3".to_string()))),
        )
        .unwrap();

    let editor = ItemEditor::open(&service, Some(uri)).unwrap().unwrap();
    assert_eq!(editor.mode(), EditorMode::Existing(uri));
    assert_eq!(editor.form().name, "Lamp");
    assert_eq!(editor.form().description, "");
    assert_eq!(editor.form().quantity, "4");
    assert_eq!(editor.form().price, "12");
    assert_eq!(editor.form().order_total(), Some(48));
    assert!(!editor.has_unsaved_changes());

    assert!(ItemEditor::open(&service, Some(ItemUri::Row(9_999)))
        .unwrap()
        .is_none());
    assert!(ItemEditor::open(&service, Some(ItemUri::Collection)).is_err());
    assert_eq!(
        ItemEditor::open(&service, None).unwrap().unwrap().mode(),
        EditorMode::New
    );
}

#[test]
fn decrement_never_persists_negative_quantity() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let uri = service.insert_sample().unwrap();

    let mut editor = ItemEditor::open(&service, Some(uri)).unwrap().unwrap();
    editor.decrement_quantity();
    editor.decrement_quantity();
    editor.decrement_quantity();
    assert_eq!(editor.save(&service).unwrap(), SaveOutcome::Updated);

    assert_eq!(service.get_item(uri.id().unwrap()).unwrap().unwrap().quantity, 0);
}

#[test]
fn malformed_quantity_rejects_save_and_keeps_row() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let uri = service.insert_sample().unwrap();

    let mut editor = ItemEditor::open(&service, Some(uri)).unwrap().unwrap();
    editor.set_quantity_text("lots");

    let err = editor.save(&service).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Form(FormError::InvalidQuantity(ref text)) if text == "lots"
    ));
    assert!(editor.has_unsaved_changes());
    assert_eq!(service.get_item(uri.id().unwrap()).unwrap().unwrap().quantity, 1);
}

#[test]
fn saving_a_row_deleted_elsewhere_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let uri = service.insert_sample().unwrap();

    let mut editor = ItemEditor::open(&service, Some(uri)).unwrap().unwrap();
    service.delete(ItemUri::Collection).unwrap();

    editor.set_name("Too late");
    assert_eq!(editor.save(&service).unwrap(), SaveOutcome::NotFound);
    assert!(editor.has_unsaved_changes());
    assert_eq!(editor.delete(&service).unwrap(), DeleteOutcome::NotFound);
}

#[test]
fn delete_outcomes_follow_editor_mode() {
    let conn = open_db_in_memory().unwrap();
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn).unwrap());

    assert_eq!(
        ItemEditor::new_item().delete(&service).unwrap(),
        DeleteOutcome::NothingToDelete
    );

    let uri = service.insert_sample().unwrap();
    let editor = ItemEditor::open(&service, Some(uri)).unwrap().unwrap();
    assert_eq!(editor.delete(&service).unwrap(), DeleteOutcome::Deleted);
    assert!(service.list_items().unwrap().is_empty());
}
