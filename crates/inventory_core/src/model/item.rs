//! Item domain model and write field sets.
//!
//! # Responsibility
//! - Define the persisted `Item` record and its image reference.
//! - Define `ItemValues`, the column -> value mapping accepted by writes.
//!
//! # Invariants
//! - `quantity` and `price` are never negative.
//! - `_id` is assigned by storage and is never part of a write field set.

use crate::contract::Column;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row identifier assigned by SQLite on insert.
pub type ItemId = i64;

/// Quantity stored when a save does not specify one.
pub const DEFAULT_QUANTITY: u32 = 1;
/// Price stored when a save does not specify one.
pub const DEFAULT_PRICE: u32 = 0;

/// Picture attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ItemImage {
    /// Reference to a picture owned by the platform (document/content URI).
    Uri(String),
    /// Encoded picture bytes stored inline.
    Bytes(Vec<u8>),
}

/// Persisted inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub quantity: u32,
    /// Whole currency units.
    pub price: u32,
    pub image: Option<ItemImage>,
}

impl Item {
    /// Order total for the current stock level.
    pub fn total_price(&self) -> u64 {
        u64::from(self.price).saturating_mul(u64::from(self.quantity))
    }

    /// Returns whether at least one unit is available.
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Dynamically typed column value, as exchanged with the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

impl From<ItemImage> for FieldValue {
    fn from(value: ItemImage) -> Self {
        match value {
            ItemImage::Uri(uri) => Self::Text(uri),
            ItemImage::Bytes(bytes) => Self::Blob(bytes),
        }
    }
}

/// Validation failure for a write field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Insert without a `name` value.
    MissingName,
    NegativeQuantity(i64),
    NegativePrice(i64),
    /// Integer does not fit the column's range.
    OutOfRange { column: Column, value: i64 },
    /// `_id` cannot be written.
    ReadOnlyColumn(Column),
    TypeMismatch {
        column: Column,
        found: &'static str,
    },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "item requires a name"),
            Self::NegativeQuantity(value) => {
                write!(f, "item requires a non-negative quantity, got {value}")
            }
            Self::NegativePrice(value) => {
                write!(f, "item requires a non-negative price, got {value}")
            }
            Self::OutOfRange { column, value } => {
                write!(f, "value {value} is out of range for column `{column}`")
            }
            Self::ReadOnlyColumn(column) => write!(f, "column `{column}` is read-only"),
            Self::TypeMismatch { column, found } => {
                write!(f, "column `{column}` does not accept {found} values")
            }
        }
    }
}

impl Error for ItemValidationError {}

/// Partial field set for insert/update.
///
/// Keys are contract columns; absent keys are left untouched on update and
/// take their column default on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemValues {
    fields: BTreeMap<Column, FieldValue>,
}

impl ItemValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(Column::Name, FieldValue::Text(name.into()));
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        let value = description.map_or(FieldValue::Null, FieldValue::Text);
        self.fields.insert(Column::Description, value);
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.fields
            .insert(Column::Quantity, FieldValue::Integer(i64::from(quantity)));
        self
    }

    pub fn with_price(mut self, price: u32) -> Self {
        self.fields
            .insert(Column::Price, FieldValue::Integer(i64::from(price)));
        self
    }

    pub fn with_image(mut self, image: Option<ItemImage>) -> Self {
        let value = image.map_or(FieldValue::Null, FieldValue::from);
        self.fields.insert(Column::Image, value);
        self
    }

    /// Generic column -> value write.
    ///
    /// # Errors
    /// - `ReadOnlyColumn` for `_id`.
    /// - `TypeMismatch` when the value kind is not stored by that column.
    /// - Sign/range errors for quantity and price.
    pub fn put(&mut self, column: Column, value: FieldValue) -> Result<(), ItemValidationError> {
        check_field(column, &value)?;
        self.fields.insert(column, value);
        Ok(())
    }

    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.fields.get(&column)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.fields.contains_key(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Column, &FieldValue)> {
        self.fields.iter().map(|(column, value)| (*column, value))
    }

    /// Validates every present field.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        for (column, value) in self.iter() {
            check_field(column, value)?;
        }
        Ok(())
    }

    /// Validates present fields and requires a name.
    pub fn validate_for_insert(&self) -> Result<(), ItemValidationError> {
        if !self.contains(Column::Name) {
            return Err(ItemValidationError::MissingName);
        }
        self.validate()
    }
}

fn check_field(column: Column, value: &FieldValue) -> Result<(), ItemValidationError> {
    let mismatch = || ItemValidationError::TypeMismatch {
        column,
        found: value.type_name(),
    };

    match column {
        Column::Id => Err(ItemValidationError::ReadOnlyColumn(column)),
        Column::Name => match value {
            FieldValue::Text(_) => Ok(()),
            FieldValue::Null => Err(ItemValidationError::MissingName),
            _ => Err(mismatch()),
        },
        Column::Description => match value {
            FieldValue::Text(_) | FieldValue::Null => Ok(()),
            _ => Err(mismatch()),
        },
        Column::Quantity => match value {
            FieldValue::Integer(v) if *v < 0 => Err(ItemValidationError::NegativeQuantity(*v)),
            FieldValue::Integer(v) => check_u32_range(column, *v),
            _ => Err(mismatch()),
        },
        Column::Price => match value {
            FieldValue::Integer(v) if *v < 0 => Err(ItemValidationError::NegativePrice(*v)),
            FieldValue::Integer(v) => check_u32_range(column, *v),
            _ => Err(mismatch()),
        },
        Column::Image => match value {
            FieldValue::Text(_) | FieldValue::Blob(_) | FieldValue::Null => Ok(()),
            FieldValue::Integer(_) => Err(mismatch()),
        },
    }
}

fn check_u32_range(column: Column, value: i64) -> Result<(), ItemValidationError> {
    if u32::try_from(value).is_err() {
        return Err(ItemValidationError::OutOfRange { column, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Item, ItemImage, ItemValidationError, ItemValues};
    use crate::contract::Column;

    fn sample(quantity: u32, price: u32) -> Item {
        Item {
            id: 1,
            name: "Toto".to_string(),
            description: Some("Terrier".to_string()),
            quantity,
            price,
            image: None,
        }
    }

    #[test]
    fn total_price_multiplies_and_saturates() {
        assert_eq!(sample(3, 7).total_price(), 21);
        assert_eq!(sample(0, 7).total_price(), 0);
        assert_eq!(
            sample(u32::MAX, u32::MAX).total_price(),
            u64::from(u32::MAX) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn put_rejects_id_and_type_mismatches() {
        let mut values = ItemValues::new();
        assert_eq!(
            values.put(Column::Id, FieldValue::Integer(3)),
            Err(ItemValidationError::ReadOnlyColumn(Column::Id))
        );
        assert!(matches!(
            values.put(Column::Quantity, FieldValue::Text("3".to_string())),
            Err(ItemValidationError::TypeMismatch {
                column: Column::Quantity,
                found: "text"
            })
        ));
        assert_eq!(
            values.put(Column::Price, FieldValue::Integer(-1)),
            Err(ItemValidationError::NegativePrice(-1))
        );
        assert!(values.is_empty());
    }

    #[test]
    fn put_rejects_values_beyond_u32() {
        let mut values = ItemValues::new();
        let too_big = i64::from(u32::MAX) + 1;
        assert_eq!(
            values.put(Column::Quantity, FieldValue::Integer(too_big)),
            Err(ItemValidationError::OutOfRange {
                column: Column::Quantity,
                value: too_big
            })
        );
    }

    #[test]
    fn insert_validation_requires_name() {
        let values = ItemValues::new().with_quantity(2);
        assert_eq!(
            values.validate_for_insert(),
            Err(ItemValidationError::MissingName)
        );
        assert!(values.clone().with_name("").validate_for_insert().is_ok());
    }

    #[test]
    fn image_maps_to_text_or_blob() {
        let values = ItemValues::new()
            .with_image(Some(ItemImage::Uri("content://media/1".to_string())));
        assert_eq!(
            values.get(Column::Image),
            Some(&FieldValue::Text("content://media/1".to_string()))
        );

        let values = ItemValues::new().with_image(Some(ItemImage::Bytes(vec![1, 2])));
        assert_eq!(values.get(Column::Image), Some(&FieldValue::Blob(vec![1, 2])));
    }

    #[test]
    fn item_serializes_with_tagged_image() {
        let mut item = sample(1, 7);
        item.image = Some(ItemImage::Uri("content://media/1".to_string()));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["image"]["kind"], "uri");
        assert_eq!(json["name"], "Toto");

        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
