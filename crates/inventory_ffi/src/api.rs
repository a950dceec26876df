//! FFI use-case API for the Flutter list and edit screens.
//!
//! # Responsibility
//! - Expose inventory list/detail/save/delete calls to Dart via FRB.
//! - Flatten core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Reads are async (run on the bridge worker pool); writes are sync.
//! - Each call opens its own connection; no state is shared between calls.

use inventory_core::db::open_db;
use inventory_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    InventoryService, Item, ItemEditor, ItemFilter, ItemImage, ItemQuery, ItemUri,
    SaveOutcome, SqliteItemRepository,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const INVENTORY_DB_FILE_NAME: &str = "inventory.sqlite3";
const INVENTORY_DB_PATH_ENV: &str = "INVENTORY_DB_PATH";
static INVENTORY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Health-check probe.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One item as shown by the list and edit screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItemView {
    pub item_id: i64,
    pub name: String,
    /// Empty when the item has no description.
    pub description: String,
    pub quantity: u32,
    pub price: u32,
    /// `price * quantity`.
    pub total_price: u64,
    pub in_stock: bool,
    pub image_uri: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryListResponse {
    pub ok: bool,
    /// Items in insertion order.
    pub items: Vec<InventoryItemView>,
    pub message: String,
}

/// Detail response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryDetailResponse {
    pub ok: bool,
    /// `None` when the row does not exist.
    pub item: Option<InventoryItemView>,
    pub message: String,
}

/// Write response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryActionResponse {
    /// Whether the write changed at least one row (or was a no-op skip).
    pub ok: bool,
    /// Row id for inserts and single-row writes.
    pub item_id: Option<i64>,
    /// Rows affected by the write.
    pub affected: u32,
    pub message: String,
}

impl InventoryActionResponse {
    fn success(message: impl Into<String>, item_id: Option<i64>, affected: usize) -> Self {
        Self {
            ok: true,
            item_id,
            affected: u32::try_from(affected).unwrap_or(u32::MAX),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>, item_id: Option<i64>) -> Self {
        Self {
            ok: false,
            item_id,
            affected: 0,
            message: message.into(),
        }
    }
}

/// Lists items, optionally filtered by a case-insensitive name fragment.
///
/// # FFI contract
/// - Async call; runs off the UI thread.
/// - Never panics.
pub fn inventory_list(name_filter: Option<String>) -> InventoryListResponse {
    let name_contains = name_filter
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    let query = ItemQuery {
        filter: ItemFilter {
            name_contains,
            ..ItemFilter::default()
        },
        ..ItemQuery::default()
    };

    let result = with_inventory_service(|service| {
        service
            .query(ItemUri::Collection, &query)
            .and_then(|rows| rows.into_items())
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No items.".to_string()
            } else {
                format!("Found {} item(s).", items.len())
            };
            InventoryListResponse {
                ok: true,
                items: items.iter().map(to_item_view).collect(),
                message,
            }
        }
        Err(err) => InventoryListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("inventory_list failed: {err}"),
        },
    }
}

/// Loads one item for the edit screen.
///
/// # FFI contract
/// - Async call; runs off the UI thread.
/// - Never panics; a missing row is `ok=true, item=None`.
pub fn inventory_get(item_id: i64) -> InventoryDetailResponse {
    match with_inventory_service(|service| service.get_item(item_id).map_err(|e| e.to_string())) {
        Ok(Some(item)) => InventoryDetailResponse {
            ok: true,
            item: Some(to_item_view(&item)),
            message: "Item loaded.".to_string(),
        },
        Ok(None) => InventoryDetailResponse {
            ok: true,
            item: None,
            message: format!("Item {item_id} not found."),
        },
        Err(err) => InventoryDetailResponse {
            ok: false,
            item: None,
            message: format!("inventory_get failed: {err}"),
        },
    }
}

/// Saves the edit form.
///
/// `item_id = None` inserts a new item; `Some(id)` updates that row.
/// Blank quantity saves as 1 and blank price as 0; other non-numeric input
/// is rejected. A new, entirely blank form is skipped with `ok=true`.
/// A blank `image_uri` keeps the stored picture; `clear_image` removes it.
///
/// # FFI contract
/// - Sync call, single SQL statement.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_save(
    item_id: Option<i64>,
    name: String,
    description: String,
    quantity: String,
    price: String,
    image_uri: Option<String>,
    clear_image: bool,
) -> InventoryActionResponse {
    let uri = item_id.map(ItemUri::with_appended_id);
    let result = with_inventory_service(|service| {
        let Some(mut editor) = ItemEditor::open(service, uri).map_err(|err| err.to_string())?
        else {
            return Ok(SaveOutcome::NotFound);
        };
        editor.set_name(name);
        editor.set_description(description);
        editor.set_quantity_text(quantity);
        editor.set_price_text(price);
        if clear_image {
            editor.set_image(None);
        } else if let Some(image_uri) = image_uri.filter(|value| !value.trim().is_empty()) {
            editor.set_image(Some(ItemImage::Uri(image_uri)));
        }
        editor.save(service).map_err(|err| err.to_string())
    });

    match result {
        Ok(SaveOutcome::Skipped) => {
            InventoryActionResponse::success("Nothing to save.", None, 0)
        }
        Ok(SaveOutcome::Inserted(uri)) => {
            InventoryActionResponse::success("Item saved.", uri.id(), 1)
        }
        Ok(SaveOutcome::Updated) => InventoryActionResponse::success("Item updated.", item_id, 1),
        Ok(SaveOutcome::NotFound) => {
            InventoryActionResponse::failure("Error with updating item: not found.", item_id)
        }
        Err(err) => {
            warn!("event=ffi_save module=ffi status=error error={err}");
            InventoryActionResponse::failure(format!("inventory_save failed: {err}"), item_id)
        }
    }
}

/// Deletes one item.
///
/// # FFI contract
/// - Sync call, single SQL statement.
/// - `ok=false` with `affected=0` when the row does not exist.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_delete(item_id: i64) -> InventoryActionResponse {
    let uri = ItemUri::with_appended_id(item_id);
    match with_inventory_service(|service| service.delete(uri).map_err(|err| err.to_string())) {
        Ok(0) => {
            InventoryActionResponse::failure("Error with deleting item: not found.", Some(item_id))
        }
        Ok(removed) => InventoryActionResponse::success("Item deleted.", Some(item_id), removed),
        Err(err) => InventoryActionResponse::failure(
            format!("inventory_delete failed: {err}"),
            Some(item_id),
        ),
    }
}

/// Deletes every item.
///
/// # FFI contract
/// - Sync call, single SQL statement.
/// - `ok=true` even when the table was already empty.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_delete_all() -> InventoryActionResponse {
    match with_inventory_service(|service| {
        service
            .delete(ItemUri::Collection)
            .map_err(|err| err.to_string())
    }) {
        Ok(removed) => InventoryActionResponse::success(
            format!("{removed} item(s) deleted."),
            None,
            removed,
        ),
        Err(err) => {
            InventoryActionResponse::failure(format!("inventory_delete_all failed: {err}"), None)
        }
    }
}

/// Inserts the fixed debug item.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_insert_sample() -> InventoryActionResponse {
    match with_inventory_service(|service| service.insert_sample().map_err(|err| err.to_string())) {
        Ok(uri) => InventoryActionResponse::success("Sample item inserted.", uri.id(), 1),
        Err(err) => InventoryActionResponse::failure(
            format!("inventory_insert_sample failed: {err}"),
            None,
        ),
    }
}

/// Applies one +/- step to the quantity text shown on the edit screen.
///
/// Unparseable text steps from zero; decrement never goes below zero.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_step_quantity(quantity: String, increment: bool) -> u32 {
    let mut editor = ItemEditor::new_item();
    editor.set_quantity_text(quantity);
    if increment {
        editor.increment_quantity()
    } else {
        editor.decrement_quantity()
    }
}

fn resolve_db_path() -> PathBuf {
    INVENTORY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(INVENTORY_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(INVENTORY_DB_FILE_NAME)
        })
        .clone()
}

fn with_inventory_service<T>(
    f: impl FnOnce(&InventoryService<SqliteItemRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("inventory DB open failed: {err}"))?;
    let repo = SqliteItemRepository::try_new(&conn)
        .map_err(|err| format!("inventory repo init failed: {err}"))?;
    f(&InventoryService::new(repo))
}

fn to_item_view(item: &Item) -> InventoryItemView {
    let (image_uri, image_bytes) = match &item.image {
        Some(ItemImage::Uri(uri)) => (Some(uri.clone()), None),
        Some(ItemImage::Bytes(bytes)) => (None, Some(bytes.clone())),
        None => (None, None),
    };
    InventoryItemView {
        item_id: item.id,
        name: item.name.clone(),
        description: item.description.clone().unwrap_or_default(),
        quantity: item.quantity,
        price: item.price,
        total_price: item.total_price(),
        in_stock: item.in_stock(),
        image_uri,
        image_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, editor_step_quantity, init_logging, inventory_delete, inventory_get,
        inventory_insert_sample, inventory_list, inventory_save, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn save_inserts_with_defaults_and_get_returns_view() {
        let name = unique_token("widget");
        let response = inventory_save(
            None,
            name.clone(),
            "  blue  ".to_string(),
            String::new(),
            "5".to_string(),
            Some("content://media/9".to_string()),
            false,
        );
        assert!(response.ok, "{}", response.message);
        let item_id = response.item_id.expect("insert should return item_id");

        let detail = inventory_get(item_id);
        let item = detail.item.expect("saved item should load");
        assert_eq!(item.name, name);
        assert_eq!(item.description, "blue");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, 5);
        assert_eq!(item.total_price, 5);
        assert_eq!(item.image_uri.as_deref(), Some("content://media/9"));
    }

    #[test]
    fn save_updates_existing_row_and_list_filters_by_name() {
        let name = unique_token("lamp");
        let created = inventory_save(
            None,
            name.clone(),
            String::new(),
            "2".to_string(),
            "3".to_string(),
            None,
            false,
        );
        let item_id = created.item_id.expect("insert should return item_id");

        let updated = inventory_save(
            Some(item_id),
            name.clone(),
            String::new(),
            "6".to_string(),
            "3".to_string(),
            None,
            false,
        );
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.affected, 1);

        let list = inventory_list(Some(name.to_uppercase()));
        assert!(list.ok, "{}", list.message);
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].item_id, item_id);
        assert_eq!(list.items[0].quantity, 6);
        assert_eq!(list.items[0].total_price, 18);
    }

    #[test]
    fn save_keeps_image_unless_cleared() {
        let name = unique_token("poster");
        let created = inventory_save(
            None,
            name.clone(),
            String::new(),
            "0".to_string(),
            "4".to_string(),
            Some("content://media/11".to_string()),
            false,
        );
        let item_id = created.item_id.expect("insert should return item_id");
        assert!(!inventory_get(item_id).item.expect("row exists").in_stock);

        let kept = inventory_save(
            Some(item_id),
            name.clone(),
            String::new(),
            "2".to_string(),
            "4".to_string(),
            None,
            false,
        );
        assert!(kept.ok, "{}", kept.message);
        let item = inventory_get(item_id).item.expect("row exists");
        assert_eq!(item.image_uri.as_deref(), Some("content://media/11"));
        assert!(item.in_stock);

        let cleared = inventory_save(
            Some(item_id),
            name,
            String::new(),
            "2".to_string(),
            "4".to_string(),
            Some("content://media/12".to_string()),
            true,
        );
        assert!(cleared.ok, "{}", cleared.message);
        let item = inventory_get(item_id).item.expect("row exists");
        assert_eq!(item.image_uri, None);
        assert_eq!(item.image_bytes, None);
    }

    #[test]
    fn blank_new_form_is_skipped() {
        let response = inventory_save(
            None,
            " ".to_string(),
            String::new(),
            String::new(),
            String::new(),
            None,
            false,
        );
        assert!(response.ok);
        assert_eq!(response.item_id, None);
        assert_eq!(response.affected, 0);
    }

    #[test]
    fn malformed_price_is_rejected() {
        let response = inventory_save(
            None,
            unique_token("bad-price"),
            String::new(),
            "1".to_string(),
            "cheap".to_string(),
            None,
            false,
        );
        assert!(!response.ok);
        assert!(response.message.contains("price"));
    }

    #[test]
    fn saving_missing_row_reports_not_found() {
        let response = inventory_save(
            Some(i64::MAX),
            "ghost".to_string(),
            String::new(),
            "1".to_string(),
            "1".to_string(),
            None,
            false,
        );
        assert!(!response.ok);
        assert!(response.message.contains("not found"));
    }

    #[test]
    fn delete_removes_row_once() {
        let inserted = inventory_insert_sample();
        assert!(inserted.ok, "{}", inserted.message);
        let item_id = inserted.item_id.expect("sample insert should return item_id");

        let first = inventory_delete(item_id);
        assert!(first.ok, "{}", first.message);
        assert_eq!(first.affected, 1);
        assert!(inventory_get(item_id).item.is_none());

        let second = inventory_delete(item_id);
        assert!(!second.ok);
        assert_eq!(second.affected, 0);
    }

    #[test]
    fn step_quantity_clamps_at_zero() {
        assert_eq!(editor_step_quantity("0".to_string(), false), 0);
        assert_eq!(editor_step_quantity("3".to_string(), false), 2);
        assert_eq!(editor_step_quantity("3".to_string(), true), 4);
        assert_eq!(editor_step_quantity(String::new(), true), 1);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
