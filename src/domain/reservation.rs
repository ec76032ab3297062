// src/domain/reservation.rs

use chrono::NaiveDate;
use std::fmt;

/// Reservation status as reported by Airbnb. Only `Canceled` is ever set locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationStatus {
    Accepted,
    Request,
    Confirmed,
    Canceled,
    /// Any other vendor value, kept verbatim.
    Other(String),
}

impl ReservationStatus {
    pub fn from_vendor(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "accepted" => ReservationStatus::Accepted,
            "request" => ReservationStatus::Request,
            "confirmed" => ReservationStatus::Confirmed,
            s if s.starts_with("cancel") => ReservationStatus::Canceled,
            _ => ReservationStatus::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReservationStatus::Accepted => "Accepted",
            ReservationStatus::Request => "Request",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Canceled => "Canceled",
            ReservationStatus::Other(raw) => raw,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, ReservationStatus::Canceled)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reservation as it appears in the Airbnb export.
/// Every field here is vendor-owned; operational columns live on the stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRecord {
    pub confirmation_code: String,
    pub status: ReservationStatus,
    pub guest_name: String,
    pub contact: String,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Stored as given; may disagree with `end_date - start_date`.
    pub nights: u32,
    pub booked: String,
    pub listing: String,
    /// Amount with currency symbol, e.g. "€412.50".
    pub earnings: String,
}

/// Vendor-owned columns in export order. The column name doubles as the
/// store column identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorField {
    ConfirmationCode,
    Status,
    GuestName,
    Contact,
    Adults,
    Children,
    Infants,
    StartDate,
    EndDate,
    Nights,
    Booked,
    Listing,
    Earnings,
}

impl VendorField {
    pub const ALL: [VendorField; 13] = [
        VendorField::ConfirmationCode,
        VendorField::Status,
        VendorField::GuestName,
        VendorField::Contact,
        VendorField::Adults,
        VendorField::Children,
        VendorField::Infants,
        VendorField::StartDate,
        VendorField::EndDate,
        VendorField::Nights,
        VendorField::Booked,
        VendorField::Listing,
        VendorField::Earnings,
    ];

    pub fn column(self) -> &'static str {
        match self {
            VendorField::ConfirmationCode => "confirmation_code",
            VendorField::Status => "status",
            VendorField::GuestName => "guest_name",
            VendorField::Contact => "contact",
            VendorField::Adults => "adults",
            VendorField::Children => "children",
            VendorField::Infants => "infants",
            VendorField::StartDate => "start_date",
            VendorField::EndDate => "end_date",
            VendorField::Nights => "nights",
            VendorField::Booked => "booked",
            VendorField::Listing => "listing",
            VendorField::Earnings => "earnings",
        }
    }

    /// Header label used by the Airbnb export and the spreadsheet.
    pub fn label(self) -> &'static str {
        match self {
            VendorField::ConfirmationCode => "Confirmation code",
            VendorField::Status => "Status",
            VendorField::GuestName => "Guest name",
            VendorField::Contact => "Contact",
            VendorField::Adults => "# of adults",
            VendorField::Children => "# of children",
            VendorField::Infants => "# of infants",
            VendorField::StartDate => "Start date",
            VendorField::EndDate => "End date",
            VendorField::Nights => "# of nights",
            VendorField::Booked => "Booked",
            VendorField::Listing => "Listing",
            VendorField::Earnings => "Earnings",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        VendorField::ALL.into_iter().find(|f| f.column() == name)
    }

    pub fn is_date(self) -> bool {
        matches!(self, VendorField::StartDate | VendorField::EndDate)
    }
}

/// A typed vendor value, used for diffing and for writing single columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Count(u32),
    Date(NaiveDate),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Count(n) => write!(f, "{n}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// A single differing vendor field between the stored and incoming record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: VendorField,
    pub previous: FieldValue,
    pub current: FieldValue,
}

impl ReservationRecord {
    pub fn field(&self, field: VendorField) -> FieldValue {
        match field {
            VendorField::ConfirmationCode => FieldValue::Text(self.confirmation_code.clone()),
            VendorField::Status => FieldValue::Text(self.status.as_str().to_string()),
            VendorField::GuestName => FieldValue::Text(self.guest_name.clone()),
            VendorField::Contact => FieldValue::Text(self.contact.clone()),
            VendorField::Adults => FieldValue::Count(self.adults),
            VendorField::Children => FieldValue::Count(self.children),
            VendorField::Infants => FieldValue::Count(self.infants),
            VendorField::StartDate => FieldValue::Date(self.start_date),
            VendorField::EndDate => FieldValue::Date(self.end_date),
            VendorField::Nights => FieldValue::Count(self.nights),
            VendorField::Booked => FieldValue::Text(self.booked.clone()),
            VendorField::Listing => FieldValue::Text(self.listing.clone()),
            VendorField::Earnings => FieldValue::Text(self.earnings.clone()),
        }
    }

    /// Compares the stored record with a freshly fetched one and lists every
    /// vendor field that differs. The confirmation code is the identity and is
    /// never part of the diff.
    pub fn diff(&self, incoming: &ReservationRecord) -> Vec<FieldChange> {
        VendorField::ALL
            .into_iter()
            .filter(|f| *f != VendorField::ConfirmationCode)
            .filter_map(|field| {
                let previous = self.field(field);
                let current = incoming.field(field);
                (previous != current).then_some(FieldChange {
                    field,
                    previous,
                    current,
                })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_record(code: &str, status: ReservationStatus) -> ReservationRecord {
    ReservationRecord {
        confirmation_code: code.to_string(),
        status,
        guest_name: "John Doe".to_string(),
        contact: "0 500-558-555".to_string(),
        adults: 2,
        children: 0,
        infants: 0,
        start_date: NaiveDate::from_ymd_opt(2024, 9, 19).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 9, 26).unwrap(),
        nights: 7,
        booked: "2024-01-11".to_string(),
        listing: "del 1800 in Valle".to_string(),
        earnings: "€100".to_string(),
    }
}
