// src/tests/utils.rs
use crate::db::connection::{init_db, Database};
use crate::domain::operational::Cell;
use crate::domain::reservation::{
    FieldValue, ReservationRecord, ReservationStatus, VendorField,
};
use crate::domain::store::{ColumnSpec, Schema, Store, StoreAccessor, StoreError, StoredRow};
use crate::source::{FetchError, ReservationSource, SnapshotWindow};
use chrono::NaiveDate;
use std::cell::Cell as Counter;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A booking starting on `start` for `nights` nights, two adults.
pub fn booking(code: &str, status: ReservationStatus, start: NaiveDate, nights: u32) -> ReservationRecord {
    ReservationRecord {
        confirmation_code: code.to_string(),
        status,
        guest_name: format!("Guest {code}"),
        contact: "+39 333 000 0000".to_string(),
        adults: 2,
        children: 0,
        infants: 0,
        start_date: start,
        end_date: start + chrono::Days::new(u64::from(nights)),
        nights,
        booked: "2024-01-11".to_string(),
        listing: "Casa Valle".to_string(),
        earnings: "€412.50".to_string(),
    }
}

/// Renders records the way the Airbnb export lays them out.
pub fn snapshot_csv(records: &[ReservationRecord]) -> String {
    let header = VendorField::ALL
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(",");
    let mut out = header + "\n";
    for r in records {
        let fields: Vec<String> = VendorField::ALL
            .iter()
            .map(|f| match r.field(*f) {
                FieldValue::Date(d) => d.format("%-m/%-d/%Y").to_string(),
                other => format!("\"{other}\""),
            })
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// Fresh database file with the schema applied, unique per call.
pub fn init_test_db() -> Database {
    let path = std::env::temp_dir().join(format!(
        "reservation_sync_test_{}_{}.sqlite3",
        std::process::id(),
        NEXT_DB.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_file(&path);

    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

pub fn set_config(db: &Database, entries: &[(&str, &str)]) {
    db.with_conn(|conn| {
        for (key, value) in entries {
            crate::db::config_table::set_config_value(conn, key, value)?;
        }
        Ok(())
    })
    .unwrap_or_else(|e| panic!("config update failed: {e}"));
}

/// Database with every required setting filled in.
pub fn configured_db() -> Database {
    let db = init_test_db();
    set_config(
        &db,
        &[
            ("city_tax_rate", "2.5"),
            ("cookie", "test-cookie"),
            ("key", "test-key"),
        ],
    );
    db
}

/// Serves a fixed CSV body and counts fetches.
pub struct StaticSource {
    body: String,
    windowed: bool,
    fetches: Counter<usize>,
}

impl StaticSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            windowed: true,
            fetches: Counter::new(0),
        }
    }

    pub fn complete_export(body: impl Into<String>) -> Self {
        Self {
            windowed: false,
            ..Self::new(body)
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl ReservationSource for StaticSource {
    fn fetch_snapshot(&self, _window: &SnapshotWindow) -> Result<String, FetchError> {
        self.fetches.set(self.fetches.get() + 1);
        Ok(self.body.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }

    fn is_windowed(&self) -> bool {
        self.windowed
    }
}

pub struct FailingSource;

impl ReservationSource for FailingSource {
    fn fetch_snapshot(&self, _window: &SnapshotWindow) -> Result<String, FetchError> {
        Err(FetchError::Status {
            status: 403,
            body: "Forbidden".to_string(),
        })
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// In-memory [`StoreAccessor`]. Can be told to fail on the n-th row write.
#[derive(Default)]
pub struct MemoryStore {
    pub schema: Schema,
    pub rows: Vec<StoredRow>,
    pub formats: HashMap<String, String>,
    pub fail_on_write: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            schema: Schema::vendor(),
            ..Self::default()
        }
    }

    pub fn with_records(records: &[ReservationRecord]) -> Self {
        let mut store = Self::new();
        store.append_rows(records).unwrap();
        store.writes = 0;
        store
    }

    pub fn codes(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.record.confirmation_code.as_str())
            .collect()
    }

    pub fn row(&self, code: &str) -> &StoredRow {
        self.rows
            .iter()
            .find(|r| r.record.confirmation_code == code)
            .unwrap_or_else(|| panic!("no row for {code}"))
    }

    pub fn set_cell(&mut self, code: &str, column: &str, cell: Cell) {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.record.confirmation_code == code)
            .unwrap_or_else(|| panic!("no row for {code}"));
        row.operational.insert(column.to_string(), cell);
    }

    fn count_write(&mut self) -> Result<(), StoreError> {
        self.writes += 1;
        if self.fail_on_write == Some(self.writes) {
            return Err(StoreError("disk I/O error".to_string()));
        }
        Ok(())
    }

    fn extra_columns(&self) -> Vec<String> {
        self.schema
            .columns()
            .iter()
            .filter(|c| VendorField::from_column(c).is_none())
            .cloned()
            .collect()
    }
}

fn set_field(record: &mut ReservationRecord, field: VendorField, value: &FieldValue) {
    match (field, value) {
        (VendorField::Status, FieldValue::Text(s)) => {
            record.status = ReservationStatus::from_vendor(s)
        }
        (VendorField::GuestName, FieldValue::Text(s)) => record.guest_name = s.clone(),
        (VendorField::Contact, FieldValue::Text(s)) => record.contact = s.clone(),
        (VendorField::Booked, FieldValue::Text(s)) => record.booked = s.clone(),
        (VendorField::Listing, FieldValue::Text(s)) => record.listing = s.clone(),
        (VendorField::Earnings, FieldValue::Text(s)) => record.earnings = s.clone(),
        (VendorField::Adults, FieldValue::Count(n)) => record.adults = *n,
        (VendorField::Children, FieldValue::Count(n)) => record.children = *n,
        (VendorField::Infants, FieldValue::Count(n)) => record.infants = *n,
        (VendorField::Nights, FieldValue::Count(n)) => record.nights = *n,
        (VendorField::StartDate, FieldValue::Date(d)) => record.start_date = *d,
        (VendorField::EndDate, FieldValue::Date(d)) => record.end_date = *d,
        (field, value) => panic!("cannot write {value:?} to {}", field.column()),
    }
}

impl StoreAccessor for MemoryStore {
    fn load(&mut self) -> Result<(Store, Schema), StoreError> {
        Ok((Store::new(self.rows.clone()), self.schema.clone()))
    }

    fn append_rows(&mut self, records: &[ReservationRecord]) -> Result<(), StoreError> {
        for record in records {
            self.count_write()?;
            let operational: BTreeMap<String, Cell> = self
                .extra_columns()
                .into_iter()
                .map(|c| (c, Cell::Empty))
                .collect();
            self.rows.push(StoredRow {
                record: record.clone(),
                operational,
            });
        }
        Ok(())
    }

    fn update_row(
        &mut self,
        code: &str,
        fields: &[(VendorField, FieldValue)],
    ) -> Result<(), StoreError> {
        self.count_write()?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.record.confirmation_code == code)
            .ok_or_else(|| StoreError(format!("no reservation with confirmation code {code}")))?;
        for (field, value) in fields {
            set_field(&mut row.record, *field, value);
        }
        Ok(())
    }

    fn ensure_columns(&mut self, columns: &[ColumnSpec]) -> Result<Vec<String>, StoreError> {
        let added = self.schema.ensure(columns.iter().map(|c| c.name));
        for row in &mut self.rows {
            for name in &added {
                row.operational.insert(name.clone(), Cell::Empty);
            }
        }
        Ok(added)
    }

    fn fill_missing(&mut self, column: &str, value: &Cell) -> Result<usize, StoreError> {
        let mut filled = 0;
        for row in &mut self.rows {
            let cell = row
                .operational
                .entry(column.to_string())
                .or_insert(Cell::Empty);
            if *cell == Cell::Empty {
                *cell = value.clone();
                filled += 1;
            }
        }
        Ok(filled)
    }

    fn set_column(&mut self, column: &str, value: &Cell) -> Result<usize, StoreError> {
        for row in &mut self.rows {
            row.operational.insert(column.to_string(), value.clone());
        }
        Ok(self.rows.len())
    }

    fn sort_by(&mut self, column: &str, ascending: bool) -> Result<(), StoreError> {
        let field = VendorField::from_column(column)
            .ok_or_else(|| StoreError(format!("cannot sort on '{column}'")))?;
        self.rows.sort_by(|a, b| {
            let order = a
                .record
                .field(field)
                .to_string()
                .cmp(&b.record.field(field).to_string());
            if ascending {
                order
            } else {
                order.reverse()
            }
        });
        Ok(())
    }

    fn set_number_format(&mut self, column: &str, format: &str) -> Result<(), StoreError> {
        self.formats.insert(column.to_string(), format.to_string());
        Ok(())
    }
}
