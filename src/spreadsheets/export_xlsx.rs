use crate::db::{Database, SqliteStore};
use crate::domain::operational::{Cell, ColumnKind, OperationalField};
use crate::domain::reservation::VendorField;
use crate::errors::SyncError;
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Color, ExcelDateTime, Format, Workbook, Worksheet, XlsxError};
use std::collections::HashMap;
use std::path::Path;

const SHEET_NAME: &str = "Reservations";

fn xlsx_err(what: &str) -> impl Fn(XlsxError) -> SyncError + '_ {
    move |e| SyncError::Export(format!("Failed to write {what}: {e}"))
}

/// Header text for a store column.
pub fn column_label(name: &str) -> String {
    if let Some(field) = VendorField::from_column(name) {
        return field.label().to_string();
    }
    if let Some(field) = OperationalField::from_column(name) {
        return field.label().to_string();
    }
    name.to_string()
}

/// Spreadsheet column letters for a 0-based index: 0 → A, 26 → AA.
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Replaces `[column]` references with cell references on `sheet_row`
/// (1-based, as the spreadsheet counts). Unknown names are left as written.
pub fn resolve_formula(formula: &str, columns: &[String], sheet_row: u32) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut rest = formula;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|c| open + c) else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = &rest[open + 1..close];
        match columns.iter().position(|c| c == name) {
            Some(idx) => out.push_str(&format!("${}{}", column_letters(idx), sheet_row)),
            None => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Writes the reservations table to an `.xlsx` file and returns the row count.
pub fn export_reservations_xlsx(db: &Database, path: &Path) -> Result<usize, SyncError> {
    let (schema, rows, formats) = db.with_conn(|conn| {
        let store = SqliteStore::new(conn);
        let (schema, rows) = store.raw_rows()?;
        let formats = store.number_formats()?;
        Ok((schema, rows, formats))
    })?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(xlsx_err("sheet name"))?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF3F3F3));
    let columns = schema.columns();

    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, column_label(name), &header_format)
            .map_err(xlsx_err("header"))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(xlsx_err("frozen header"))?;

    let number_formats: HashMap<&str, Format> = formats
        .iter()
        .map(|(col, fmt)| (col.as_str(), Format::new().set_num_format(fmt)))
        .collect();

    for (i, cells) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, (name, cell)) in columns.iter().zip(cells).enumerate() {
            write_cell(
                worksheet,
                r,
                col as u16,
                name,
                cell,
                columns,
                number_formats.get(name.as_str()),
            )?;
        }
    }

    worksheet.autofit();

    workbook
        .save(path)
        .map_err(|e| SyncError::Export(format!("Failed to save workbook: {e}")))?;

    tracing::info!(rows = rows.len(), path = %path.display(), "exported reservations");
    Ok(rows.len())
}

fn write_cell(
    worksheet: &mut Worksheet,
    r: u32,
    c: u16,
    name: &str,
    cell: &Cell,
    columns: &[String],
    number_format: Option<&Format>,
) -> Result<(), SyncError> {
    let kind = OperationalField::from_column(name).map(OperationalField::kind);

    match (cell, kind) {
        (Cell::Empty, _) => {}
        (Cell::Integer(i), Some(ColumnKind::Flag)) => {
            worksheet
                .write_boolean(r, c, *i != 0)
                .map_err(xlsx_err(name))?;
        }
        (Cell::Text(formula), Some(ColumnKind::Formula)) if formula.starts_with('=') => {
            worksheet
                .write_formula(r, c, resolve_formula(formula, columns, r + 1).as_str())
                .map_err(xlsx_err(name))?;
        }
        (Cell::Text(text), _) => match (number_format, NaiveDate::parse_from_str(text, "%Y-%m-%d")) {
            (Some(format), Ok(date)) => {
                let dt = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)
                    .map_err(xlsx_err(name))?;
                worksheet
                    .write_datetime_with_format(r, c, &dt, format)
                    .map_err(xlsx_err(name))?;
            }
            _ => {
                worksheet.write_string(r, c, text).map_err(xlsx_err(name))?;
            }
        },
        (Cell::Integer(i), _) => {
            worksheet
                .write_number(r, c, *i as f64)
                .map_err(xlsx_err(name))?;
        }
        (Cell::Real(x), _) => {
            worksheet.write_number(r, c, *x).map_err(xlsx_err(name))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(9), "J");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn formula_references_resolve_to_the_row() {
        let columns: Vec<String> = ["confirmation_code", "adults", "nights", "city_tax"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let resolved = resolve_formula(
            "=IF(ISBLANK([nights]),\"\",MIN([nights],7)*[adults]*2.5)",
            &columns,
            5,
        );

        assert_eq!(resolved, "=IF(ISBLANK($C5),\"\",MIN($C5,7)*$B5*2.5)");
    }

    #[test]
    fn unknown_references_are_kept() {
        let columns = vec!["adults".to_string()];
        assert_eq!(resolve_formula("=[guests]*[adults", &columns, 2), "=[guests]*[adults");
    }

    #[test]
    fn labels_fall_back_to_column_name() {
        assert_eq!(column_label("adults"), "# of adults");
        assert_eq!(column_label("checked_in"), "Checked In");
        assert_eq!(column_label("parking_spot"), "parking_spot");
    }
}
