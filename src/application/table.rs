//! In-memory tabular data as read from an export file.

use super::columns::ColumnSynonyms;
use crate::error::SchemaError;

/// Header row plus data rows, every cell as trimmed text.
///
/// Rows may be shorter than the header; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at `(row, column)`, empty when the row is short.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", |c| c.trim())
    }

    /// Locate a required column.
    ///
    /// # Errors
    /// [`SchemaError::MissingColumn`] listing the headers that were found.
    pub fn require(&self, column: &ColumnSynonyms) -> Result<usize, SchemaError> {
        column
            .locate(&self.headers)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: column.canonical,
                available: self.headers.clone(),
            })
    }

    /// Whether every cell of a row is blank.
    #[must_use]
    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |r| r.iter().all(|c| c.trim().is_empty()))
    }

    /// 1-based line number of a data row in the source file (header is line 1).
    #[must_use]
    pub fn line_of(row: usize) -> usize {
        row + 2
    }
}
