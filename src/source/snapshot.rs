// src/source/snapshot.rs

use crate::domain::reservation::{ReservationRecord, ReservationStatus, VendorField};
use crate::source::ParseError;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};

/// Parses the Airbnb reservations CSV.
///
/// The header row is skipped; columns are read by position in export order.
/// Any bad row rejects the whole snapshot, since applying half of it would
/// cancel the reservations on the rejected rows.
pub fn parse_snapshot(raw: &str) -> Result<Vec<ReservationRecord>, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| ParseError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        records.push(parse_row(&row)?);
    }

    Ok(records)
}

fn parse_row(row: &StringRecord) -> Result<ReservationRecord, ParseError> {
    let line = row.position().map(|p| p.line()).unwrap_or(0);

    if let Some(first_missing) = VendorField::ALL.get(row.len()) {
        return Err(ParseError::MissingField {
            line,
            field: first_missing.label(),
        });
    }

    let text = |field: VendorField| -> Result<&str, ParseError> {
        let idx = field_index(field);
        row.get(idx).ok_or(ParseError::MissingField {
            line,
            field: field.label(),
        })
    };

    let code = text(VendorField::ConfirmationCode)?;
    if code.is_empty() {
        return Err(ParseError::MissingField {
            line,
            field: VendorField::ConfirmationCode.label(),
        });
    }

    let count = |field: VendorField| -> Result<u32, ParseError> {
        let value = text(field)?;
        value.parse::<u32>().map_err(|_| ParseError::InvalidNumber {
            code: code.to_string(),
            field: field.label(),
            value: value.to_string(),
        })
    };

    let date = |field: VendorField| -> Result<NaiveDate, ParseError> {
        let value = text(field)?;
        parse_us_date(value).ok_or_else(|| ParseError::InvalidDate {
            code: code.to_string(),
            field: field.label(),
            value: value.to_string(),
        })
    };

    let start_date = date(VendorField::StartDate)?;
    let end_date = date(VendorField::EndDate)?;
    if end_date < start_date {
        return Err(ParseError::DateOrder {
            code: code.to_string(),
        });
    }

    Ok(ReservationRecord {
        confirmation_code: code.to_string(),
        status: ReservationStatus::from_vendor(text(VendorField::Status)?),
        guest_name: text(VendorField::GuestName)?.to_string(),
        contact: text(VendorField::Contact)?.to_string(),
        adults: count(VendorField::Adults)?,
        children: count(VendorField::Children)?,
        infants: count(VendorField::Infants)?,
        start_date,
        end_date,
        nights: count(VendorField::Nights)?,
        booked: text(VendorField::Booked)?.to_string(),
        listing: text(VendorField::Listing)?.to_string(),
        earnings: text(VendorField::Earnings)?.to_string(),
    })
}

fn field_index(field: VendorField) -> usize {
    VendorField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or_default()
}

/// `M/D/YYYY`, with or without zero padding.
fn parse_us_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split('/');
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    let year_part = parts.next()?;
    if parts.next().is_some() || year_part.len() != 4 {
        return None;
    }
    let year = year_part.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
