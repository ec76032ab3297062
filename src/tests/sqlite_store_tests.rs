// src/tests/sqlite_store_tests.rs
use super::utils::{booking, date, init_test_db};
use crate::db::SqliteStore;
use crate::domain::layout::{self, LayoutPolicy};
use crate::domain::operational::{Cell, CityTaxPolicy, ColumnKind, OperationalSet};
use crate::domain::reconcile::reconcile;
use crate::domain::reservation::{FieldValue, ReservationStatus, VendorField};
use crate::domain::store::{ColumnSpec, SortOrder, StoreAccessor};
use crate::errors::SyncError;

#[test]
fn appended_rows_load_back_in_order() {
    let db = init_test_db();
    let a = booking("HMA", ReservationStatus::Accepted, date(2024, 9, 19), 7);
    let b = booking("HMB", ReservationStatus::Request, date(2024, 9, 1), 2);

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        store.append_rows(&[a.clone(), b.clone()])?;

        let (loaded, schema) = store.load()?;
        assert_eq!(schema.columns().len(), VendorField::ALL.len());
        let records: Vec<_> = loaded.rows().iter().map(|r| r.record.clone()).collect();
        assert_eq!(records, vec![a.clone(), b.clone()]);
        Ok(())
    })
    .unwrap();
}

#[test]
fn update_touches_only_named_columns() {
    let db = init_test_db();
    let a = booking("HMA", ReservationStatus::Accepted, date(2024, 9, 19), 7);

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        store.append_rows(&[a.clone()])?;
        store.update_row(
            "HMA",
            &[
                (VendorField::Status, FieldValue::Text("Canceled".into())),
                (VendorField::Adults, FieldValue::Count(4)),
            ],
        )?;

        let (loaded, _) = store.load()?;
        let row = loaded.get("HMA").unwrap();
        assert_eq!(row.record.status, ReservationStatus::Canceled);
        assert_eq!(row.record.adults, 4);
        assert_eq!(row.record.guest_name, a.guest_name);
        assert_eq!(row.record.start_date, a.start_date);
        Ok(())
    })
    .unwrap();
}

#[test]
fn updating_an_unknown_code_fails() {
    let db = init_test_db();
    let result = db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        store.update_row("NOPE", &[(VendorField::Nights, FieldValue::Count(1))])?;
        Ok(())
    });
    assert!(matches!(result, Err(SyncError::Db(msg)) if msg.contains("NOPE")));
}

#[test]
fn ensure_columns_alters_table_once() {
    let db = init_test_db();
    let specs = [
        ColumnSpec {
            name: "cleaned",
            kind: ColumnKind::Flag,
        },
        ColumnSpec {
            name: "note",
            kind: ColumnKind::Text,
        },
    ];

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        assert_eq!(store.ensure_columns(&specs)?, vec!["cleaned", "note"]);
        assert!(store.ensure_columns(&specs)?.is_empty());

        let schema = store.schema()?;
        assert_eq!(schema.columns().last().map(String::as_str), Some("note"));
        assert!(!schema.contains("row_position"));
        Ok(())
    })
    .unwrap();
}

#[test]
fn bad_column_names_are_refused() {
    let db = init_test_db();
    let result = db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        store.ensure_columns(&[ColumnSpec {
            name: "x; DROP TABLE config",
            kind: ColumnKind::Text,
        }])?;
        Ok(())
    });
    assert!(result.is_err());
}

#[test]
fn fill_missing_keeps_existing_values() {
    let db = init_test_db();
    let rows = [
        booking("A", ReservationStatus::Accepted, date(2024, 9, 1), 2),
        booking("B", ReservationStatus::Accepted, date(2024, 9, 5), 2),
    ];

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        store.append_rows(&rows)?;
        store.ensure_columns(&[ColumnSpec {
            name: "cleaned",
            kind: ColumnKind::Flag,
        }])?;
        conn.execute("UPDATE reservations SET cleaned = 1 WHERE confirmation_code = 'A'", [])?;

        let mut store = SqliteStore::new(conn);
        assert_eq!(store.fill_missing("cleaned", &Cell::Integer(0))?, 1);

        let (loaded, _) = store.load()?;
        assert_eq!(loaded.get("A").unwrap().operational["cleaned"], Cell::Integer(1));
        assert_eq!(loaded.get("B").unwrap().operational["cleaned"], Cell::Integer(0));
        Ok(())
    })
    .unwrap();
}

#[test]
fn sort_is_stable_for_equal_dates() {
    let db = init_test_db();
    let same_day = date(2024, 9, 10);
    let rows = [
        booking("LATE", ReservationStatus::Accepted, date(2024, 10, 1), 2),
        booking("FIRST", ReservationStatus::Accepted, same_day, 2),
        booking("SECOND", ReservationStatus::Accepted, same_day, 4),
    ];

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        store.append_rows(&rows)?;
        store.sort_by("start_date", true)?;

        let (loaded, _) = store.load()?;
        let codes: Vec<_> = loaded
            .rows()
            .iter()
            .map(|r| r.record.confirmation_code.as_str())
            .collect();
        assert_eq!(codes, vec!["FIRST", "SECOND", "LATE"]);
        Ok(())
    })
    .unwrap();
}

#[test]
fn host_edits_survive_a_full_sync() {
    let db = init_test_db();
    let policy = LayoutPolicy {
        sort: SortOrder::Asc,
        operational: OperationalSet::Extended,
        city_tax: CityTaxPolicy {
            rate: 1.5,
            max_nights: 5,
        },
        clear_notes: false,
    };
    let original = booking("HMA", ReservationStatus::Accepted, date(2024, 9, 19), 7);

    db.with_conn(|conn| {
        let mut store = SqliteStore::new(conn);
        let (current, _) = store.load()?;
        let plan = reconcile(&current, &[original.clone()])?;
        layout::apply(&mut store, &plan, &policy)?;
        Ok(())
    })
    .unwrap();

    db.with_conn(|conn| {
        conn.execute(
            "UPDATE reservations SET checked_in = 1, note = 'keys under mat', city_tax = '10' WHERE confirmation_code = 'HMA'",
            [],
        )?;
        Ok(())
    })
    .unwrap();

    let mut changed = original.clone();
    changed.nights = 8;
    changed.end_date = date(2024, 9, 27);

    let summary = db
        .with_conn(|conn| {
            let mut store = SqliteStore::new(conn);
            let (current, _) = store.load()?;
            let plan = reconcile(&current, &[changed.clone()])?;
            Ok(layout::apply(&mut store, &plan, &policy)?)
        })
        .unwrap();
    assert_eq!(summary.updated, 1);

    db.with_conn(|conn| {
        let (loaded, _) = SqliteStore::new(conn).load()?;
        let row = loaded.get("HMA").unwrap();
        assert_eq!(row.record, changed);
        assert_eq!(row.operational["checked_in"], Cell::Integer(1));
        assert_eq!(row.operational["note"], Cell::Text("keys under mat".into()));
        assert_eq!(row.operational["city_tax"], Cell::Text("10".into()));
        assert_eq!(row.operational["tax_paid"], Cell::Integer(0));
        Ok(())
    })
    .unwrap();
}
