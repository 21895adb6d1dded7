//! Car name to identifier table
//!
//! The reference CSV lists one car model per row. A row's 0-based position
//! (header excluded) is the identifier the model was trained with; no id
//! column is read.

use crate::error::ResourceLoadError;
use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Immutable mapping from display name to row-position identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarNameTable {
    ids: IndexMap<String, u32>,
    rows: usize,
}

impl CarNameTable {
    /// Build a table from names in row order
    ///
    /// A repeated name keeps the position of its first occurrence but takes
    /// the identifier of its last row.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = IndexMap::new();
        let mut rows = 0;
        for (idx, name) in names.into_iter().enumerate() {
            ids.insert(name.into(), idx as u32);
            rows += 1;
        }
        Self { ids, rows }
    }

    /// Parse a CSV with a header row
    ///
    /// Names come from `column` when given (matched against the header),
    /// otherwise from the first column.
    pub fn from_reader<R: Read>(reader: R, column: Option<&str>) -> Result<Self, String> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(|e| e.to_string())?.clone();
        if headers.is_empty() {
            return Err("missing header row".to_string());
        }

        let name_idx = match column {
            Some(wanted) => headers
                .iter()
                .position(|h| h.trim() == wanted)
                .ok_or_else(|| format!("column '{}' not found in header", wanted))?,
            None => 0,
        };

        let mut names = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| e.to_string())?;
            let name = record
                .get(name_idx)
                .ok_or_else(|| format!("row {} has no column {}", row, name_idx))?;
            names.push(name.to_string());
        }

        if u32::try_from(names.len()).is_err() {
            return Err(format!("{} rows exceed the identifier range", names.len()));
        }

        Ok(Self::from_names(names))
    }

    /// Read the table from a CSV file on disk
    pub fn load(path: &Path, column: Option<&str>) -> Result<Self, ResourceLoadError> {
        let file =
            std::fs::File::open(path).map_err(|e| ResourceLoadError::car_table(path, e))?;
        let table =
            Self::from_reader(file, column).map_err(|e| ResourceLoadError::car_table(path, e))?;

        if table.duplicate_count() > 0 {
            warn!(
                path = %path.display(),
                duplicates = table.duplicate_count(),
                "Duplicate car names in reference table, last row wins"
            );
        }
        Ok(table)
    }

    /// Identifier for an exact display name
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Display names in the order they should be offered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    pub fn first(&self) -> Option<(&str, u32)> {
        self.ids.first().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of data rows read, duplicates included
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Rows whose name was already seen
    pub fn duplicate_count(&self) -> usize {
        self.rows - self.ids.len()
    }

    /// Largest identifier handed out
    pub fn max_id(&self) -> Option<u32> {
        self.ids.values().copied().max()
    }
}
