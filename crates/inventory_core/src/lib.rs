//! Core logic for the inventory app.
//! Owns the item schema, storage access and edit-screen rules.

pub mod contract;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use contract::{Column, ItemUri, UriError, CONTENT_URI};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{
    FieldValue, Item, ItemId, ItemImage, ItemValidationError, ItemValues, DEFAULT_PRICE,
    DEFAULT_QUANTITY,
};
pub use notify::{ChangeEvent, ChangeKind, ChangeNotifier};
pub use repo::item_repo::{
    ItemFilter, ItemQuery, ItemRepository, RepoError, RepoResult, ResultRow, ResultSet,
    SortOrder, SqliteItemRepository,
};
pub use service::editor::{
    DeleteOutcome, EditorError, EditorMode, FormError, ItemEditor, ItemForm, SaveOutcome,
};
pub use service::inventory_service::InventoryService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
