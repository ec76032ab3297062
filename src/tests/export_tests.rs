// src/tests/export_tests.rs
use super::utils::{booking, configured_db, date, set_config, snapshot_csv, StaticSource};
use crate::domain::reservation::ReservationStatus;
use crate::spreadsheets::export_reservations_xlsx;
use crate::sync::execute;

#[test]
fn synced_store_exports_to_xlsx() {
    let db = configured_db();
    set_config(&db, &[("operational_columns", "extended")]);
    let csv = snapshot_csv(&[
        booking("HMA", ReservationStatus::Accepted, date(2024, 9, 19), 7),
        booking("HMB", ReservationStatus::Request, date(2024, 9, 2), 2),
    ]);
    let report = execute(&db, date(2024, 9, 1), |_| Ok(StaticSource::new(csv)));
    assert!(report.success, "{}", report.message);

    let path = std::env::temp_dir().join(format!(
        "reservation_sync_export_{}.xlsx",
        std::process::id()
    ));
    let rows = export_reservations_xlsx(&db, &path).unwrap();

    assert_eq!(rows, 2);
    let written = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    std::fs::remove_file(&path).ok();
    assert!(written > 0);
}

#[test]
fn empty_store_exports_header_only() {
    let db = configured_db();
    let path = std::env::temp_dir().join(format!(
        "reservation_sync_empty_{}.xlsx",
        std::process::id()
    ));

    let rows = export_reservations_xlsx(&db, &path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(rows, 0);
}
