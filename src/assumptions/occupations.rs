//! Occupation list mapping job titles to accident risk groups

use std::path::Path;

use super::loader::{load_occupations, RateFileSource};
use crate::error::DataError;

#[derive(Debug, Clone, Default)]
pub struct OccupationTable {
    entries: Vec<(String, u8)>,
}

impl OccupationTable {
    pub fn new(entries: Vec<(String, u8)>) -> Self {
        Self { entries }
    }

    pub fn bundled() -> Result<Self, DataError> {
        Self::load(&RateFileSource::Bundled)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        Self::load(&RateFileSource::Dir(path.to_path_buf()))
    }

    fn load(source: &RateFileSource) -> Result<Self, DataError> {
        let entries = load_occupations(source)?
            .into_iter()
            .map(|row| (row.name, row.group))
            .collect();
        Ok(Self { entries })
    }

    /// Risk group for an occupation, matched case-insensitively
    ///
    /// Group 0 occupations are not insurable and resolve to `None`.
    pub fn group_of(&self, name: &str) -> Option<u8> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| n.to_lowercase() == wanted)
            .map(|(_, g)| *g)
            .filter(|g| *g > 0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
