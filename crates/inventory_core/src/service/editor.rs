//! Detail/edit screen state, independent of any UI toolkit.
//!
//! # Responsibility
//! - Hold the raw text a user typed for one item and track unsaved edits.
//! - Turn form text into `ItemValues` with explicit defaults.
//! - Decide between insert and update on save.
//!
//! # Invariants
//! - A new item is an editor without a row URI; there is no sentinel id.
//! - Blank quantity saves as `DEFAULT_QUANTITY`, blank price as `DEFAULT_PRICE`.
//! - Non-numeric or negative quantity/price text rejects the save.
//! - Quantity stepping never goes below zero.

use crate::contract::ItemUri;
use crate::model::item::{Item, ItemImage, ItemValues, DEFAULT_PRICE, DEFAULT_QUANTITY};
use crate::repo::item_repo::{ItemRepository, RepoError};
use crate::service::inventory_service::InventoryService;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    InvalidQuantity(String),
    InvalidPrice(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuantity(value) => {
                write!(f, "quantity must be a non-negative whole number, got `{value}`")
            }
            Self::InvalidPrice(value) => {
                write!(f, "price must be a non-negative whole number, got `{value}`")
            }
        }
    }
}

impl Error for FormError {}

/// Editor failure.
#[derive(Debug)]
pub enum EditorError {
    Form(FormError),
    Repo(RepoError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<FormError> for EditorError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Raw field text as shown on the edit screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub quantity: String,
    pub price: String,
    pub image: Option<ItemImage>,
}

impl ItemForm {
    /// Fills the form from a stored item.
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone().unwrap_or_default(),
            quantity: item.quantity.to_string(),
            price: item.price.to_string(),
            image: item.image.clone(),
        }
    }

    /// True when every text field is empty after trimming.
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.description, &self.quantity, &self.price]
            .iter()
            .all(|field| field.trim().is_empty())
    }

    /// Parses the form into a full write field set.
    pub fn validate(&self) -> Result<ItemValues, FormError> {
        let quantity = parse_amount(&self.quantity, DEFAULT_QUANTITY)
            .ok_or_else(|| FormError::InvalidQuantity(self.quantity.trim().to_string()))?;
        let price = parse_amount(&self.price, DEFAULT_PRICE)
            .ok_or_else(|| FormError::InvalidPrice(self.price.trim().to_string()))?;
        let description = Some(self.description.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Ok(ItemValues::new()
            .with_name(self.name.trim())
            .with_description(description)
            .with_quantity(quantity)
            .with_price(price)
            .with_image(self.image.clone()))
    }

    /// `price * quantity` for the order summary, when both fields parse.
    pub fn order_total(&self) -> Option<u64> {
        let quantity = parse_amount(&self.quantity, DEFAULT_QUANTITY)?;
        let price = parse_amount(&self.price, DEFAULT_PRICE)?;
        Some(u64::from(price).saturating_mul(u64::from(quantity)))
    }
}

/// Whether the editor targets a new or an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    New,
    Existing(ItemUri),
}

/// Result of `ItemEditor::save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// New editor with a blank form; nothing was written.
    Skipped,
    Inserted(ItemUri),
    Updated,
    /// The row was removed elsewhere before the update.
    NotFound,
}

/// Result of `ItemEditor::delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// New editor; there is no row yet.
    NothingToDelete,
}

/// Edit session for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEditor {
    uri: Option<ItemUri>,
    form: ItemForm,
    has_unsaved_changes: bool,
}

impl ItemEditor {
    /// Editor for an item that does not exist yet.
    pub fn new_item() -> Self {
        Self {
            uri: None,
            form: ItemForm::default(),
            has_unsaved_changes: false,
        }
    }

    /// Editor pre-filled from a stored item.
    pub fn for_item(item: &Item) -> Self {
        Self {
            uri: Some(ItemUri::with_appended_id(item.id)),
            form: ItemForm::from_item(item),
            has_unsaved_changes: false,
        }
    }

    /// Opens the editor for `uri`, or for a new item when `uri` is `None`.
    ///
    /// Returns `Ok(None)` when the row no longer exists.
    ///
    /// # Errors
    /// - `UnsupportedUri` for the collection URI.
    pub fn open<R: ItemRepository>(
        service: &InventoryService<R>,
        uri: Option<ItemUri>,
    ) -> Result<Option<Self>, EditorError> {
        match uri {
            None => Ok(Some(Self::new_item())),
            Some(ItemUri::Row(id)) => Ok(service.get_item(id)?.as_ref().map(Self::for_item)),
            Some(uri @ ItemUri::Collection) => Err(EditorError::Repo(RepoError::UnsupportedUri {
                operation: "edit",
                uri: uri.to_string(),
            })),
        }
    }

    pub fn mode(&self) -> EditorMode {
        match self.uri {
            None => EditorMode::New,
            Some(uri) => EditorMode::Existing(uri),
        }
    }

    pub fn form(&self) -> &ItemForm {
        &self.form
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.form.name = value.into();
        self.has_unsaved_changes = true;
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.form.description = value.into();
        self.has_unsaved_changes = true;
    }

    pub fn set_quantity_text(&mut self, value: impl Into<String>) {
        self.form.quantity = value.into();
        self.has_unsaved_changes = true;
    }

    pub fn set_price_text(&mut self, value: impl Into<String>) {
        self.form.price = value.into();
        self.has_unsaved_changes = true;
    }

    pub fn set_image(&mut self, image: Option<ItemImage>) {
        self.form.image = image;
        self.has_unsaved_changes = true;
    }

    /// Adds one unit and returns the new quantity.
    pub fn increment_quantity(&mut self) -> u32 {
        let next = self.displayed_quantity().saturating_add(1);
        self.set_quantity_text(next.to_string());
        next
    }

    /// Removes one unit, clamping at zero, and returns the new quantity.
    pub fn decrement_quantity(&mut self) -> u32 {
        let next = self.displayed_quantity().saturating_sub(1);
        self.set_quantity_text(next.to_string());
        next
    }

    /// Persists the form: insert for new items, update for existing ones.
    ///
    /// A successful insert switches the editor to `EditorMode::Existing`.
    pub fn save<R: ItemRepository>(
        &mut self,
        service: &InventoryService<R>,
    ) -> Result<SaveOutcome, EditorError> {
        if self.uri.is_none() && self.form.is_blank() {
            return Ok(SaveOutcome::Skipped);
        }
        let values = self.form.validate()?;

        let outcome = match self.uri {
            None => {
                let uri = service.insert(ItemUri::Collection, &values)?;
                self.uri = Some(uri);
                SaveOutcome::Inserted(uri)
            }
            Some(uri) => match service.update(uri, &values)? {
                0 => SaveOutcome::NotFound,
                _ => SaveOutcome::Updated,
            },
        };

        if outcome != SaveOutcome::NotFound {
            self.has_unsaved_changes = false;
        }
        Ok(outcome)
    }

    /// Deletes the edited row, if there is one.
    pub fn delete<R: ItemRepository>(
        &self,
        service: &InventoryService<R>,
    ) -> Result<DeleteOutcome, EditorError> {
        let Some(uri) = self.uri else {
            return Ok(DeleteOutcome::NothingToDelete);
        };
        match service.delete(uri)? {
            0 => Ok(DeleteOutcome::NotFound),
            _ => Ok(DeleteOutcome::Deleted),
        }
    }

    // Unparseable text steps from zero.
    fn displayed_quantity(&self) -> u32 {
        self.form.quantity.trim().parse().unwrap_or(0)
    }
}

fn parse_amount(text: &str, default: u32) -> Option<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(default);
    }
    trimmed.parse().ok()
}
