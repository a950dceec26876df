//! Inventory data contract.
//!
//! # Responsibility
//! - Name the single `inventory` table and its columns.
//! - Define the resource addressing scheme used by service and bridge callers.
//!
//! # Invariants
//! - Column names here are the only names SQL code may reference.
//! - A row URI always carries a non-negative numeric id suffix.
//!
//! # See also
//! - `db/migrations/0001_init.sql`

use crate::model::item::ItemId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CONTENT_AUTHORITY: &str = "com.example.android.inventory";
pub const PATH_INVENTORY: &str = "inventory";
pub const CONTENT_URI: &str = "content://com.example.android.inventory/inventory";

pub const TABLE_NAME: &str = "inventory";
pub const COLUMN_ID: &str = "_id";
pub const COLUMN_ITEM_NAME: &str = "name";
pub const COLUMN_ITEM_DESCRIPTION: &str = "description";
pub const COLUMN_ITEM_QUANTITY: &str = "quantity";
pub const COLUMN_ITEM_PRICE: &str = "price";
pub const COLUMN_ITEM_IMAGE: &str = "image";

static ITEM_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^content://([A-Za-z0-9_.\-]+)/([A-Za-z0-9_]+)(?:/(\d+))?/?$")
        .expect("valid item uri regex")
});

/// Column of the `inventory` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Id,
    Name,
    Description,
    Quantity,
    Price,
    Image,
}

impl Column {
    /// All columns in table order.
    pub const ALL: [Column; 6] = [
        Column::Id,
        Column::Name,
        Column::Description,
        Column::Quantity,
        Column::Price,
        Column::Image,
    ];

    /// Columns accepted by write operations.
    pub const MUTABLE: [Column; 5] = [
        Column::Name,
        Column::Description,
        Column::Quantity,
        Column::Price,
        Column::Image,
    ];

    /// Returns the SQL column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => COLUMN_ID,
            Self::Name => COLUMN_ITEM_NAME,
            Self::Description => COLUMN_ITEM_DESCRIPTION,
            Self::Quantity => COLUMN_ITEM_QUANTITY,
            Self::Price => COLUMN_ITEM_PRICE,
            Self::Image => COLUMN_ITEM_IMAGE,
        }
    }

    /// Resolves a SQL column name back to its contract column.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Addressable handle for the item collection or one item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemUri {
    /// `content://<authority>/inventory`
    Collection,
    /// `content://<authority>/inventory/<id>`
    Row(ItemId),
}

impl ItemUri {
    /// Builds the row URI for `id`, mirroring `ContentUris.withAppendedId`.
    pub fn with_appended_id(id: ItemId) -> Self {
        Self::Row(id)
    }

    /// Returns the row id, or `None` for the collection URI.
    pub fn id(self) -> Option<ItemId> {
        match self {
            Self::Collection => None,
            Self::Row(id) => Some(id),
        }
    }

    /// Parses the canonical string form.
    ///
    /// # Errors
    /// - Unknown scheme, authority or path.
    /// - Id suffix that is not a non-negative 64-bit integer.
    pub fn parse(value: &str) -> Result<Self, UriError> {
        let trimmed = value.trim();
        let captures = ITEM_URI_RE
            .captures(trimmed)
            .ok_or_else(|| UriError::Malformed(trimmed.to_string()))?;

        if &captures[1] != CONTENT_AUTHORITY {
            return Err(UriError::UnknownAuthority(captures[1].to_string()));
        }
        if &captures[2] != PATH_INVENTORY {
            return Err(UriError::UnknownPath(captures[2].to_string()));
        }

        match captures.get(3) {
            None => Ok(Self::Collection),
            Some(id) => id
                .as_str()
                .parse::<ItemId>()
                .map(Self::Row)
                .map_err(|_| UriError::InvalidId(id.as_str().to_string())),
        }
    }
}

impl Display for ItemUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => f.write_str(CONTENT_URI),
            Self::Row(id) => write!(f, "{CONTENT_URI}/{id}"),
        }
    }
}

/// Failure to parse an item resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    Malformed(String),
    UnknownAuthority(String),
    UnknownPath(String),
    InvalidId(String),
}

impl Display for UriError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "malformed item uri `{value}`"),
            Self::UnknownAuthority(value) => write!(f, "unknown content authority `{value}`"),
            Self::UnknownPath(value) => write!(f, "unknown content path `{value}`"),
            Self::InvalidId(value) => write!(f, "invalid item id `{value}` in uri"),
        }
    }
}

impl Error for UriError {}
