mod airbnb;
mod file;
mod snapshot;
mod source_error;

pub use airbnb::AirbnbSource;
pub use file::FileSource;
pub use snapshot::parse_snapshot;
pub use source_error::{FetchError, ParseError};

use chrono::NaiveDate;

/// The slice of reservations a fetch asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotWindow {
    pub date_min: NaiveDate,
    /// Only the first page of this size is fetched.
    pub page_size: u32,
}

/// Where a run gets its raw CSV snapshot from.
pub trait ReservationSource {
    fn fetch_snapshot(&self, window: &SnapshotWindow) -> Result<String, FetchError>;

    /// Short label recorded with each run.
    fn describe(&self) -> String;

    /// False when the snapshot is a complete export rather than one page of
    /// upcoming reservations. Absence then cancels regardless of dates.
    fn is_windowed(&self) -> bool {
        true
    }
}
