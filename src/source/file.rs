// src/source/file.rs
use crate::source::{FetchError, ReservationSource, SnapshotWindow};
use std::path::PathBuf;

/// A reservations CSV downloaded by hand from the Airbnb host dashboard.
/// The window is ignored; the file is taken as the complete export.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReservationSource for FileSource {
    fn fetch_snapshot(&self, _window: &SnapshotWindow) -> Result<String, FetchError> {
        std::fs::read_to_string(&self.path).map_err(|e| FetchError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn is_windowed(&self) -> bool {
        false
    }
}
