// src/domain/store.rs

use crate::domain::operational::{Cell, ColumnKind};
use crate::domain::reservation::{FieldValue, ReservationRecord, VendorField};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Ordered column names of the reservations table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// The vendor columns in export order, as a freshly created table has them.
    #[cfg(test)]
    pub fn vendor() -> Self {
        Self::new(
            VendorField::ALL
                .iter()
                .map(|f| f.column().to_string())
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Appends the columns not yet present and returns them. Order of existing
    /// columns never changes.
    pub fn ensure<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut added = Vec::new();
        for name in names {
            if !self.contains(name) {
                self.columns.push(name.to_string());
                added.push(name.to_string());
            }
        }
        added
    }
}

/// A column to add during schema evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// One row of the store: the vendor record plus every other column by name.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub record: ReservationRecord,
    pub operational: BTreeMap<String, Cell>,
}

/// The store as loaded, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    rows: Vec<StoredRow>,
    index: HashMap<String, usize>,
}

impl Store {
    pub fn new(rows: Vec<StoredRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.record.confirmation_code.clone(), i))
            .collect();
        Self { rows, index }
    }

    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }

    pub fn get(&self, code: &str) -> Option<&StoredRow> {
        self.index.get(code).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Asc),
            "desc" | "descending" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn ascending(self) -> bool {
        self == SortOrder::Asc
    }
}

/// Narrow read/write contract over the persistent reservations table.
/// Implementations hold no business rules.
pub trait StoreAccessor {
    fn load(&mut self) -> Result<(Store, Schema), StoreError>;

    /// Appends rows with only vendor columns populated.
    fn append_rows(&mut self, records: &[ReservationRecord]) -> Result<(), StoreError>;

    /// Overwrites the given vendor columns on the row with `code`, in place.
    fn update_row(
        &mut self,
        code: &str,
        fields: &[(VendorField, FieldValue)],
    ) -> Result<(), StoreError>;

    /// Adds the missing columns; returns the names actually added.
    fn ensure_columns(&mut self, columns: &[ColumnSpec]) -> Result<Vec<String>, StoreError>;

    /// Sets `value` on every row where `column` is empty.
    fn fill_missing(&mut self, column: &str, value: &Cell) -> Result<usize, StoreError>;

    /// Sets `value` on every row.
    fn set_column(&mut self, column: &str, value: &Cell) -> Result<usize, StoreError>;

    /// Stable re-sort of all rows on `column`.
    fn sort_by(&mut self, column: &str, ascending: bool) -> Result<(), StoreError>;

    fn set_number_format(&mut self, column: &str, format: &str) -> Result<(), StoreError>;
}
