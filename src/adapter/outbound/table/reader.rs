//! CSV reader for spreadsheet exports.
//!
//! Exports come out of spreadsheet tools in either comma- or
//! semicolon-separated form, sometimes with a UTF-8 byte-order mark. The
//! delimiter is picked from the header line.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::application::table::Table;
use crate::error::{Result, SchemaError};

const BOM: char = '\u{feff}';

/// Pick `;` when the header line has more semicolons than commas.
#[must_use]
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Parse CSV text into a [`Table`].
///
/// # Errors
/// [`SchemaError::EmptyHeader`] for empty input, or a CSV error.
pub fn parse_table(content: &str) -> Result<Table> {
    let content = content.trim_start_matches(BOM);
    if content.trim().is_empty() {
        return Err(SchemaError::EmptyHeader.into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(detect_delimiter(content))
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}

/// Read any byte source as a CSV table.
pub fn read_table<R: Read>(mut source: R) -> Result<Table> {
    let mut content = String::new();
    source.read_to_string(&mut content)?;
    parse_table(&content)
}

/// Read a CSV export from disk.
pub fn read_table_file(path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path)?;
    let table = parse_table(&content)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table read"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolons_and_strips_bom() {
        let content = "\u{feff}fecha;N-4;ST2\n2025-08-01; 5 ;1\n";
        let table = parse_table(content).unwrap();
        assert_eq!(table.headers, vec!["fecha", "N-4", "ST2"]);
        assert_eq!(table.rows[0], vec!["2025-08-01", "5", "1"]);
    }

    #[test]
    fn comma_is_the_default() {
        assert_eq!(detect_delimiter("fecha,N-4\n"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn ragged_rows_are_kept() {
        let table = read_table("fecha,N-4,ST2\n2025-08-01,5\n".as_bytes()).unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.cell(0, 2), "");
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = parse_table("\u{feff}  \n").unwrap_err();
        assert!(matches!(err, crate::error::Error::Schema(SchemaError::EmptyHeader)));
    }
}
