//! Inventory use-case service.
//!
//! # Responsibility
//! - Expose the URI-addressed item contract (query/insert/update/delete).
//! - Publish a `ChangeEvent` after every write that changed rows.
//!
//! # Invariants
//! - Inserts target the collection URI; updates target a row URI.
//! - Deleting the collection URI removes every row.
//! - Log lines carry ids and counts only, never item text.

use crate::contract::ItemUri;
use crate::model::item::{Item, ItemId, ItemValues};
use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier};
use crate::repo::item_repo::{ItemQuery, ItemRepository, RepoError, RepoResult, ResultSet};
use log::{info, warn};
use std::sync::mpsc::Receiver;

const SAMPLE_NAME: &str = "Raspberry Pipi";
const SAMPLE_DESCRIPTION: &str = "Un computeretto perfetto";
const SAMPLE_QUANTITY: u32 = 1;
const SAMPLE_PRICE: u32 = 7;

/// URI-addressed facade over an item repository.
pub struct InventoryService<R: ItemRepository> {
    repo: R,
    notifier: ChangeNotifier,
}

impl<R: ItemRepository> InventoryService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Subscribes to write notifications.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    /// Reads rows addressed by `uri`. A row URI narrows `query` to that id.
    pub fn query(&self, uri: ItemUri, query: &ItemQuery) -> RepoResult<ResultSet> {
        match uri {
            ItemUri::Collection => self.repo.query(query),
            ItemUri::Row(id) => {
                let mut narrowed = query.clone();
                narrowed.filter.id = Some(id);
                self.repo.query(&narrowed)
            }
        }
    }

    /// Inserts a new item and returns its row URI.
    ///
    /// # Errors
    /// - `UnsupportedUri` for row URIs.
    /// - Validation or storage failures from the repository.
    pub fn insert(&self, uri: ItemUri, values: &ItemValues) -> RepoResult<ItemUri> {
        if uri != ItemUri::Collection {
            return Err(unsupported("insert", uri));
        }

        let id = self.repo.insert(values).map_err(|err| {
            warn!("event=item_insert module=service status=error error={err}");
            err
        })?;
        let row_uri = ItemUri::with_appended_id(id);
        info!("event=item_insert module=service status=ok item_id={id}");
        self.publish(row_uri, ChangeKind::Inserted, 1);
        Ok(row_uri)
    }

    /// Updates one row; returns affected rows (0 when missing or no-op).
    pub fn update(&self, uri: ItemUri, values: &ItemValues) -> RepoResult<usize> {
        let ItemUri::Row(id) = uri else {
            return Err(unsupported("update", uri));
        };

        let changed = self.repo.update(id, values)?;
        info!(
            "event=item_update module=service status={} item_id={id} fields={} rows={changed}",
            if changed == 0 { "not_found" } else { "ok" },
            values.len()
        );
        self.publish(uri, ChangeKind::Updated, changed);
        Ok(changed)
    }

    /// Deletes one row, or all rows for the collection URI.
    pub fn delete(&self, uri: ItemUri) -> RepoResult<usize> {
        let removed = self.repo.delete(uri.id())?;
        info!(
            "event=item_delete module=service status=ok target={} rows={removed}",
            uri.id().map_or_else(|| "all".to_string(), |id| id.to_string())
        );
        self.publish(uri, ChangeKind::Deleted, removed);
        Ok(removed)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.get_item(id)
    }

    pub fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.repo.list_items()
    }

    /// Inserts the fixed debug row used by the "insert dummy data" action.
    pub fn insert_sample(&self) -> RepoResult<ItemUri> {
        let values = ItemValues::new()
            .with_name(SAMPLE_NAME)
            .with_description(Some(SAMPLE_DESCRIPTION.to_string()))
            .with_quantity(SAMPLE_QUANTITY)
            .with_price(SAMPLE_PRICE);
        self.insert(ItemUri::Collection, &values)
    }

    fn publish(&self, uri: ItemUri, kind: ChangeKind, rows: usize) {
        if rows == 0 {
            return;
        }
        self.notifier.publish(ChangeEvent { uri, kind, rows });
    }
}

fn unsupported(operation: &'static str, uri: ItemUri) -> RepoError {
    RepoError::UnsupportedUri {
        operation,
        uri: uri.to_string(),
    }
}
