// src/domain/operational.rs

/// A raw store cell. Mirrors what the backing table can hold, so human edits of
/// any shape survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// How an operational column is stored and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// A formula over vendor columns, written as text with `[column]` references.
    Formula,
    /// A checkbox, stored as 0/1.
    Flag,
    Text,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Formula | ColumnKind::Text => "TEXT",
            ColumnKind::Flag => "INTEGER",
        }
    }
}

/// Locally managed columns. Never written from the Airbnb export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationalField {
    CityTax,
    CheckedIn,
    CheckedOut,
    Cleaned,
    CheckInTime,
    TaxRequested,
    TaxPaid,
    DocumentCollected,
    Note,
}

const BASIC: &[OperationalField] = &[
    OperationalField::CityTax,
    OperationalField::CheckedIn,
    OperationalField::CheckedOut,
    OperationalField::Cleaned,
];

const EXTENDED: &[OperationalField] = &[
    OperationalField::CityTax,
    OperationalField::CheckedIn,
    OperationalField::CheckedOut,
    OperationalField::Cleaned,
    OperationalField::CheckInTime,
    OperationalField::TaxRequested,
    OperationalField::TaxPaid,
    OperationalField::DocumentCollected,
    OperationalField::Note,
];

impl OperationalField {
    pub const ALL: &'static [OperationalField] = EXTENDED;

    pub fn column(self) -> &'static str {
        match self {
            OperationalField::CityTax => "city_tax",
            OperationalField::CheckedIn => "checked_in",
            OperationalField::CheckedOut => "checked_out",
            OperationalField::Cleaned => "cleaned",
            OperationalField::CheckInTime => "check_in_time",
            OperationalField::TaxRequested => "tax_requested",
            OperationalField::TaxPaid => "tax_paid",
            OperationalField::DocumentCollected => "document_collected",
            OperationalField::Note => "note",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationalField::CityTax => "City Tax",
            OperationalField::CheckedIn => "Checked In",
            OperationalField::CheckedOut => "Checked Out",
            OperationalField::Cleaned => "Cleaned",
            OperationalField::CheckInTime => "Check-in Time",
            OperationalField::TaxRequested => "Tax Requested",
            OperationalField::TaxPaid => "Tax Paid",
            OperationalField::DocumentCollected => "Document Collected",
            OperationalField::Note => "Note",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            OperationalField::CityTax => ColumnKind::Formula,
            OperationalField::CheckInTime | OperationalField::Note => ColumnKind::Text,
            _ => ColumnKind::Flag,
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.column() == name)
    }
}

/// Which operational columns the store carries. The basic set is a prefix of
/// the extended one, so switching to extended only appends columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationalSet {
    #[default]
    Basic,
    Extended,
}

impl OperationalSet {
    pub fn fields(self) -> &'static [OperationalField] {
        match self {
            OperationalSet::Basic => BASIC,
            OperationalSet::Extended => EXTENDED,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(OperationalSet::Basic),
            "extended" => Some(OperationalSet::Extended),
            _ => None,
        }
    }
}

/// City tax: a per-person nightly rate, charged for at most `max_nights`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityTaxPolicy {
    pub rate: f64,
    pub max_nights: u32,
}

impl CityTaxPolicy {
    /// Formula text with `[column]` references, resolved per row on export.
    pub fn formula(&self) -> String {
        format!(
            "=IF(ISBLANK([nights]),\"\",MIN([nights],{})*[adults]*{})",
            self.max_nights, self.rate
        )
    }

    pub fn default_cell(&self, field: OperationalField) -> Cell {
        match field.kind() {
            ColumnKind::Formula => Cell::Text(self.formula()),
            ColumnKind::Flag => Cell::Integer(0),
            ColumnKind::Text => Cell::Text(String::new()),
        }
    }
}
