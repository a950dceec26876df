//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide query/insert/update/delete over the `inventory` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every call is a single SQL statement; there is no cross-call transaction.
//! - Writes validate `ItemValues` before touching SQL.
//! - Update/delete report "not found" as an affected-row count of 0.
//! - Reads reject persisted values that break model invariants.

use crate::contract::{Column, TABLE_NAME};
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{
    FieldValue, Item, ItemId, ItemImage, ItemValidationError, ItemValues, DEFAULT_PRICE,
    DEFAULT_QUANTITY,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    InvalidData(String),
    /// Connection has not been migrated to the schema this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Operation is not defined for the given resource URI.
    UnsupportedUri {
        operation: &'static str,
        uri: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::UnsupportedUri { operation, uri } => {
                write!(f, "{operation} is not supported for `{uri}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row filter for item queries. The default matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Exact row id.
    pub id: Option<ItemId>,
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    /// Only rows with `quantity > 0`.
    pub in_stock_only: bool,
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// `_id ASC`, which is insertion order.
    #[default]
    Insertion,
    NameAsc,
    PriceAsc,
    QuantityDesc,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::Insertion => "_id ASC",
            Self::NameAsc => "name COLLATE NOCASE ASC, _id ASC",
            Self::PriceAsc => "price ASC, _id ASC",
            Self::QuantityDesc => "quantity DESC, _id ASC",
        }
    }
}

/// Query options. An empty projection selects every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub projection: Vec<Column>,
    pub filter: ItemFilter,
    pub order: SortOrder,
}

impl ItemQuery {
    /// Every column of every row in insertion order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn projected(columns: &[Column]) -> Self {
        Self {
            projection: columns.to_vec(),
            ..Self::default()
        }
    }

    /// Every column of one row.
    pub fn by_id(id: ItemId) -> Self {
        Self {
            filter: ItemFilter {
                id: Some(id),
                ..ItemFilter::default()
            },
            ..Self::default()
        }
    }

    fn columns(&self) -> Vec<Column> {
        if self.projection.is_empty() {
            return Column::ALL.to_vec();
        }
        let mut seen = HashSet::new();
        self.projection
            .iter()
            .copied()
            .filter(|column| seen.insert(*column))
            .collect()
    }
}

/// Ordered rows returned by a query, addressable by column name or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    columns: Vec<Column>,
    rows: Vec<Vec<FieldValue>>,
}

impl ResultSet {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<ResultRow<'_>> {
        self.rows.get(index).map(|values| ResultRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.rows.iter().map(|values| ResultRow {
            columns: &self.columns,
            values,
        })
    }

    /// Converts every row into an `Item`.
    ///
    /// # Errors
    /// - `InvalidData` when the projection lacks a column or a value is invalid.
    pub fn into_items(self) -> RepoResult<Vec<Item>> {
        self.rows().map(|row| row.to_item()).collect()
    }
}

/// Borrowed view over one result row.
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    columns: &'a [Column],
    values: &'a [FieldValue],
}

impl<'a> ResultRow<'a> {
    /// Position of `name` in this row, if it was projected.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        self.column_index(name).map(|index| &self.values[index])
    }

    pub fn get_index(&self, index: usize) -> Option<&'a FieldValue> {
        self.values.get(index)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn get_text(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn to_item(&self) -> RepoResult<Item> {
        let value = |column: Column| {
            self.get(column.name()).ok_or_else(|| {
                RepoError::InvalidData(format!("column `{column}` was not projected"))
            })
        };

        let id = match value(Column::Id)? {
            FieldValue::Integer(id) => *id,
            other => return Err(invalid_value(Column::Id, other)),
        };
        let name = match value(Column::Name)? {
            FieldValue::Text(name) => name.clone(),
            other => return Err(invalid_value(Column::Name, other)),
        };
        let description = match value(Column::Description)? {
            FieldValue::Null => None,
            FieldValue::Text(text) => Some(text.clone()),
            other => return Err(invalid_value(Column::Description, other)),
        };
        let image = match value(Column::Image)? {
            FieldValue::Null => None,
            FieldValue::Text(uri) => Some(ItemImage::Uri(uri.clone())),
            FieldValue::Blob(bytes) => Some(ItemImage::Bytes(bytes.clone())),
            other => return Err(invalid_value(Column::Image, other)),
        };

        Ok(Item {
            id,
            name,
            description,
            quantity: non_negative(Column::Quantity, value(Column::Quantity)?)?,
            price: non_negative(Column::Price, value(Column::Price)?)?,
            image,
        })
    }
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    /// Runs a read over the item table.
    fn query(&self, query: &ItemQuery) -> RepoResult<ResultSet>;
    /// Inserts a row and returns its new id.
    fn insert(&self, values: &ItemValues) -> RepoResult<ItemId>;
    /// Overwrites the given columns of one row; returns affected rows.
    fn update(&self, id: ItemId, values: &ItemValues) -> RepoResult<usize>;
    /// Deletes one row, or every row when `id` is `None`; returns removed rows.
    fn delete(&self, id: Option<ItemId>) -> RepoResult<usize>;

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let result = self.query(&ItemQuery::by_id(id))?;
        result.row(0).map(|row| row.to_item()).transpose()
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.query(&ItemQuery::all())?.into_items()
    }
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn query(&self, query: &ItemQuery) -> RepoResult<ResultSet> {
        let columns = query.columns();
        // SQLite `lower()` only folds ASCII, so the name match runs in Rust
        // over a trailing `name` column that is not part of the result.
        let name_needle = query
            .filter
            .name_contains
            .as_deref()
            .map(str::to_lowercase);
        let mut select_names = columns.iter().map(|column| column.name()).collect::<Vec<_>>();
        if name_needle.is_some() {
            select_names.push(Column::Name.name());
        }
        let select_list = select_names.join(", ");

        let mut sql = format!("SELECT {select_list} FROM {TABLE_NAME} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(id) = query.filter.id {
            sql.push_str(" AND _id = ?");
            bind_values.push(Value::Integer(id));
        }
        if query.filter.in_stock_only {
            sql.push_str(" AND quantity > 0");
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(query.order.sql());

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut collected = Vec::new();

        while let Some(row) = rows.next()? {
            if let Some(needle) = &name_needle {
                let name: String = row.get(columns.len())?;
                if !name.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }
            let mut values = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                values.push(from_sql_value(*column, row.get::<_, Value>(index)?)?);
            }
            collected.push(values);
        }

        Ok(ResultSet {
            columns,
            rows: collected,
        })
    }

    fn insert(&self, values: &ItemValues) -> RepoResult<ItemId> {
        values.validate_for_insert()?;

        let mut columns: Vec<&'static str> = Vec::with_capacity(Column::MUTABLE.len());
        let mut bind_values: Vec<Value> = Vec::with_capacity(Column::MUTABLE.len());
        for (column, value) in values.iter() {
            columns.push(column.name());
            bind_values.push(to_sql_value(value));
        }
        if !values.contains(Column::Quantity) {
            columns.push(Column::Quantity.name());
            bind_values.push(Value::Integer(i64::from(DEFAULT_QUANTITY)));
        }
        if !values.contains(Column::Price) {
            columns.push(Column::Price.name());
            bind_values.push(Value::Integer(i64::from(DEFAULT_PRICE)));
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {TABLE_NAME} ({}) VALUES ({placeholders});",
            columns.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(bind_values))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: ItemId, values: &ItemValues) -> RepoResult<usize> {
        if values.is_empty() {
            return Ok(0);
        }
        values.validate()?;

        let mut assignments = Vec::with_capacity(values.len());
        let mut bind_values: Vec<Value> = Vec::with_capacity(values.len() + 1);
        for (column, value) in values.iter() {
            assignments.push(format!("{} = ?", column.name()));
            bind_values.push(to_sql_value(value));
        }
        bind_values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE {TABLE_NAME} SET {} WHERE _id = ?;",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn delete(&self, id: Option<ItemId>) -> RepoResult<usize> {
        let removed = match id {
            Some(id) => self
                .conn
                .execute(&format!("DELETE FROM {TABLE_NAME} WHERE _id = ?1;"), [id])?,
            None => self
                .conn
                .execute(&format!("DELETE FROM {TABLE_NAME};"), [])?,
        };
        Ok(removed)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [TABLE_NAME],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable(TABLE_NAME));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({TABLE_NAME});"))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<HashSet<_>, _>>()?;
    if let Some(missing) = Column::ALL
        .into_iter()
        .find(|column| !present.contains(column.name()))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: TABLE_NAME,
            column: missing.name(),
        });
    }

    Ok(())
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(v) => Value::Integer(*v),
        FieldValue::Text(v) => Value::Text(v.clone()),
        FieldValue::Blob(v) => Value::Blob(v.clone()),
    }
}

fn from_sql_value(column: Column, value: Value) -> RepoResult<FieldValue> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::Integer(v) => Ok(FieldValue::Integer(v)),
        Value::Text(v) => Ok(FieldValue::Text(v)),
        Value::Blob(v) => Ok(FieldValue::Blob(v)),
        Value::Real(v) => Err(RepoError::InvalidData(format!(
            "unexpected real value `{v}` in {TABLE_NAME}.{column}"
        ))),
    }
}

fn non_negative(column: Column, value: &FieldValue) -> RepoResult<u32> {
    match value {
        FieldValue::Integer(v) => u32::try_from(*v).map_err(|_| {
            RepoError::InvalidData(format!("invalid {column} value `{v}` in {TABLE_NAME}.{column}"))
        }),
        other => Err(invalid_value(column, other)),
    }
}

fn invalid_value(column: Column, value: &FieldValue) -> RepoError {
    RepoError::InvalidData(format!(
        "unexpected value `{value:?}` in {TABLE_NAME}.{column}"
    ))
}
