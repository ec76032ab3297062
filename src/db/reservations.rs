use crate::domain::operational::Cell;
use crate::domain::reservation::{
    FieldValue, ReservationRecord, ReservationStatus, VendorField,
};
use crate::domain::store::{ColumnSpec, Schema, Store, StoreAccessor, StoreError, StoredRow};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::{BTreeMap, HashMap};

const TABLE: &str = "reservations";
const POSITION: &str = "row_position";

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// The reservations table behind the [`StoreAccessor`] contract.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn schema(&self) -> Result<Schema, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT name FROM pragma_table_info('{TABLE}') ORDER BY cid"
        ))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema::new(
            names.into_iter().filter(|n| n != POSITION).collect(),
        ))
    }

    /// Every row as raw cells in schema order, in display order.
    pub fn raw_rows(&self) -> Result<(Schema, Vec<Vec<Cell>>), StoreError> {
        let schema = self.schema()?;
        let select = schema
            .columns()
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {select} FROM {TABLE} ORDER BY {POSITION}");

        let mut stmt = self.conn.prepare(&sql)?;
        let width = schema.columns().len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i).map(value_to_cell))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((schema, rows))
    }

    pub fn number_formats(&self) -> Result<HashMap<String, String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT column_name, num_format FROM column_formats")?;
        let formats = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(formats)
    }

    fn require_column(&self, column: &str) -> Result<(), StoreError> {
        if self.schema()?.contains(column) {
            Ok(())
        } else {
            Err(StoreError(format!("no column named '{column}'")))
        }
    }
}

impl StoreAccessor for SqliteStore<'_> {
    fn load(&mut self) -> Result<(Store, Schema), StoreError> {
        let (schema, rows) = self.raw_rows()?;
        let stored = rows
            .into_iter()
            .map(|cells| stored_row(&schema, cells))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((Store::new(stored), schema))
    }

    fn append_rows(&mut self, records: &[ReservationRecord]) -> Result<(), StoreError> {
        let columns = VendorField::ALL
            .iter()
            .map(|f| quote(f.column()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=VendorField::ALL.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {TABLE} ({POSITION}, {columns}) \
             VALUES ((SELECT COALESCE(MAX({POSITION}), 0) + 1 FROM {TABLE}), {placeholders})"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        for record in records {
            let values = VendorField::ALL
                .iter()
                .map(|f| field_to_value(&record.field(*f)));
            stmt.execute(params_from_iter(values))?;
        }
        Ok(())
    }

    fn update_row(
        &mut self,
        code: &str,
        fields: &[(VendorField, FieldValue)],
    ) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }

        let assignments = fields
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ?{}", quote(field.column()), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {TABLE} SET {assignments} WHERE confirmation_code = ?{}",
            fields.len() + 1
        );

        let mut values: Vec<Value> = fields.iter().map(|(_, v)| field_to_value(v)).collect();
        values.push(Value::Text(code.to_string()));

        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(StoreError(format!(
                "no reservation with confirmation code {code}"
            )));
        }
        Ok(())
    }

    fn ensure_columns(&mut self, columns: &[ColumnSpec]) -> Result<Vec<String>, StoreError> {
        let mut schema = self.schema()?;
        let mut added = Vec::new();

        for spec in columns {
            if schema.contains(spec.name) {
                continue;
            }
            if !is_identifier(spec.name) {
                return Err(StoreError(format!("invalid column name '{}'", spec.name)));
            }
            self.conn.execute(
                &format!(
                    "ALTER TABLE {TABLE} ADD COLUMN {} {}",
                    quote(spec.name),
                    spec.kind.sql_type()
                ),
                [],
            )?;
            added.extend(schema.ensure([spec.name]));
        }

        Ok(added)
    }

    fn fill_missing(&mut self, column: &str, value: &Cell) -> Result<usize, StoreError> {
        self.require_column(column)?;
        let col = quote(column);
        let filled = self.conn.execute(
            &format!("UPDATE {TABLE} SET {col} = ?1 WHERE {col} IS NULL"),
            params![cell_to_value(value)],
        )?;
        Ok(filled)
    }

    fn set_column(&mut self, column: &str, value: &Cell) -> Result<usize, StoreError> {
        self.require_column(column)?;
        let changed = self.conn.execute(
            &format!("UPDATE {TABLE} SET {} = ?1", quote(column)),
            params![cell_to_value(value)],
        )?;
        Ok(changed)
    }

    fn sort_by(&mut self, column: &str, ascending: bool) -> Result<(), StoreError> {
        self.require_column(column)?;
        let direction = if ascending { "ASC" } else { "DESC" };

        let codes = {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT confirmation_code FROM {TABLE} ORDER BY {} {direction}, {POSITION} ASC",
                quote(column)
            ))?;
            let codes = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            codes
        };

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut update = tx.prepare(&format!(
                "UPDATE {TABLE} SET {POSITION} = ?1 WHERE confirmation_code = ?2"
            ))?;
            for (i, code) in codes.iter().enumerate() {
                update.execute(params![i as i64 + 1, code])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn set_number_format(&mut self, column: &str, format: &str) -> Result<(), StoreError> {
        self.require_column(column)?;
        self.conn.execute(
            r#"
            INSERT INTO column_formats (column_name, num_format) VALUES (?1, ?2)
            ON CONFLICT(column_name) DO UPDATE SET num_format = excluded.num_format
            "#,
            params![column, format],
        )?;
        Ok(())
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn value_to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Integer(i) => Cell::Integer(i),
        Value::Real(r) => Cell::Real(r),
        Value::Text(t) => Cell::Text(t),
        Value::Blob(b) => Cell::Text(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn cell_to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Empty => Value::Null,
        Cell::Integer(i) => Value::Integer(*i),
        Cell::Real(r) => Value::Real(*r),
        Cell::Text(t) => Value::Text(t.clone()),
    }
}

fn field_to_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Count(n) => Value::Integer(i64::from(*n)),
        FieldValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
    }
}

/// Splits a raw row into the vendor record and the remaining columns.
fn stored_row(schema: &Schema, cells: Vec<Cell>) -> Result<StoredRow, StoreError> {
    let mut vendor: HashMap<VendorField, Cell> = HashMap::new();
    let mut operational = BTreeMap::new();
    for (name, cell) in schema.columns().iter().zip(cells) {
        match VendorField::from_column(name) {
            Some(field) => {
                vendor.insert(field, cell);
            }
            None => {
                operational.insert(name.clone(), cell);
            }
        }
    }

    let code = match vendor.get(&VendorField::ConfirmationCode) {
        Some(Cell::Text(code)) => code.clone(),
        other => return Err(StoreError(format!("row without confirmation code: {other:?}"))),
    };

    let text = |field: VendorField| -> String {
        match vendor.get(&field) {
            Some(Cell::Text(s)) => s.clone(),
            Some(Cell::Integer(i)) => i.to_string(),
            Some(Cell::Real(r)) => r.to_string(),
            Some(Cell::Empty) | None => String::new(),
        }
    };
    let count = |field: VendorField| -> Result<u32, StoreError> {
        let parsed = match vendor.get(&field) {
            Some(Cell::Integer(i)) => u32::try_from(*i).ok(),
            Some(Cell::Text(s)) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| StoreError(format!("{code}: '{}' is not a count", field.column())))
    };
    let date = |field: VendorField| -> Result<NaiveDate, StoreError> {
        NaiveDate::parse_from_str(&text(field), "%Y-%m-%d")
            .map_err(|e| StoreError(format!("{code}: '{}' is not a date: {e}", field.column())))
    };

    let record = ReservationRecord {
        confirmation_code: code.clone(),
        status: ReservationStatus::from_vendor(&text(VendorField::Status)),
        guest_name: text(VendorField::GuestName),
        contact: text(VendorField::Contact),
        adults: count(VendorField::Adults)?,
        children: count(VendorField::Children)?,
        infants: count(VendorField::Infants)?,
        start_date: date(VendorField::StartDate)?,
        end_date: date(VendorField::EndDate)?,
        nights: count(VendorField::Nights)?,
        booked: text(VendorField::Booked),
        listing: text(VendorField::Listing),
        earnings: text(VendorField::Earnings),
    };

    Ok(StoredRow {
        record,
        operational,
    })
}
