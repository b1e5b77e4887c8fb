//! Upload normalization: wide reservation tables to snapshot records.
//!
//! An upload has one row per stay date and one column per room type. The
//! normalizer melts it into one record per non-empty `(stay_date, room_type)`
//! cell, all stamped with the snapshot date resolved for the upload.
//!
//! Bad rows and cells are never fatal on their own. They are dropped, logged
//! and reported back in [`NormalizedUpload`] so the user sees what was left out.
//! Only a table that cannot be used at all (no date column, or no row with a
//! readable date) fails with a [`SchemaError`].

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::columns::{ColumnSynonyms, STAY_DATE};
use super::table::Table;
use crate::domain::capacity::CapacityModel;
use crate::domain::room_type::RoomType;
use crate::domain::snapshot::{Snapshot, MAX_QUANTITY};
use crate::error::SchemaError;

/// Raw upload table: a date column plus one column per room type.
pub type WideSnapshotTable = Table;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A single value that could not be interpreted. Recovered locally by dropping it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    #[error("unrecognized date '{value}'")]
    UnrecognizedDate { value: String },

    #[error("invalid quantity '{value}': {reason}")]
    InvalidQuantity { value: String, reason: &'static str },
}

/// A data row left out because its stay date could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    /// Line in the source file.
    pub line: usize,
    pub error: ParseError,
}

/// A room-type cell left out because its quantity could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCell {
    pub line: usize,
    pub stay_date: NaiveDate,
    pub room_type: RoomType,
    pub error: ParseError,
}

/// Result of normalizing one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUpload {
    pub snapshot: Snapshot,
    /// Header used as the stay-date column.
    pub date_column: String,
    /// Room types with a column in the table, in column order.
    pub room_types: Vec<RoomType>,
    /// Headers that are neither the date column nor a configured room type.
    pub ignored_columns: Vec<String>,
    pub dropped_rows: Vec<DroppedRow>,
    pub skipped_cells: Vec<SkippedCell>,
    /// Rows whose stay date already appeared earlier in the table.
    pub duplicate_rows: usize,
}

impl NormalizedUpload {
    /// Whether anything was left out of the snapshot.
    #[must_use]
    pub fn is_lossy(&self) -> bool {
        !self.dropped_rows.is_empty() || !self.skipped_cells.is_empty()
    }
}

/// Parse a stay-date cell.
///
/// Accepts ISO dates (optionally with a time part), `YYYY/MM/DD`, and the
/// day-first `DD/MM/YYYY`, `DD-MM-YYYY`, `DD.MM.YYYY`. Two-digit years are
/// rejected.
///
/// # Errors
/// [`ParseError::UnrecognizedDate`] when no format matches.
pub fn parse_stay_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let value = raw.trim();
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        });

    match parsed {
        Some(date) if date.year() >= 1000 => Ok(date),
        _ => Err(ParseError::UnrecognizedDate {
            value: value.to_string(),
        }),
    }
}

/// Parse a quantity cell. Empty means "no record".
///
/// Integers are accepted, as are whole floats (`10.0`, `10,0`) written by
/// spreadsheet exports.
///
/// # Errors
/// [`ParseError::InvalidQuantity`] for negative, fractional, non-numeric text,
/// or a count above [`MAX_QUANTITY`].
pub fn parse_quantity(raw: &str) -> Result<Option<u32>, ParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let invalid = |reason| ParseError::InvalidQuantity {
        value: value.to_string(),
        reason,
    };
    if let Ok(n) = value.parse::<u32>() {
        return if n > MAX_QUANTITY {
            Err(invalid("too large"))
        } else {
            Ok(Some(n))
        };
    }

    let float: f64 = value
        .replace(',', ".")
        .parse()
        .map_err(|_| invalid("not a number"))?;
    if !float.is_finite() {
        return Err(invalid("not a number"));
    }
    if float < 0.0 {
        return Err(invalid("negative"));
    }
    if float.fract() != 0.0 {
        return Err(invalid("not a whole number"));
    }
    if float > f64::from(MAX_QUANTITY) {
        return Err(invalid("too large"));
    }
    Ok(Some(float as u32))
}

/// Convert a wide table into a snapshot for `snapshot_date`.
///
/// Only headers matching a configured room type (trimmed, case-insensitive)
/// are read; others are reported in `ignored_columns`.
///
/// # Errors
/// - [`SchemaError::EmptyHeader`] when the table has no header.
/// - [`SchemaError::MissingColumn`] when no stay-date column is found.
/// - [`SchemaError::UnparseableDateColumn`] when the table has data rows but
///   none carries a readable date.
pub fn normalize(
    table: &WideSnapshotTable,
    snapshot_date: NaiveDate,
    capacity: &CapacityModel,
) -> Result<NormalizedUpload, SchemaError> {
    normalize_with(table, snapshot_date, capacity, &STAY_DATE)
}

/// [`normalize`] with an explicit date-column synonym table.
pub fn normalize_with(
    table: &WideSnapshotTable,
    snapshot_date: NaiveDate,
    capacity: &CapacityModel,
    date_synonyms: &ColumnSynonyms,
) -> Result<NormalizedUpload, SchemaError> {
    melt(table, snapshot_date, date_synonyms, |header| {
        capacity.match_header(header).cloned()
    })
}

/// Read back a table this tool wrote itself.
///
/// Every non-blank header other than the date column is a room type, whether
/// or not the current capacity model knows it. Only blank headers end up in
/// `ignored_columns`.
///
/// # Errors
/// Same as [`normalize`].
pub fn normalize_stored(
    table: &WideSnapshotTable,
    snapshot_date: NaiveDate,
) -> Result<NormalizedUpload, SchemaError> {
    melt(table, snapshot_date, &STAY_DATE, |header| {
        RoomType::try_new(header).ok()
    })
}

fn melt<F>(
    table: &WideSnapshotTable,
    snapshot_date: NaiveDate,
    date_synonyms: &ColumnSynonyms,
    room_type_of: F,
) -> Result<NormalizedUpload, SchemaError>
where
    F: Fn(&str) -> Option<RoomType>,
{
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SchemaError::EmptyHeader);
    }
    let date_idx = table.require(date_synonyms)?;

    let mut columns: Vec<(usize, RoomType)> = Vec::new();
    let mut ignored_columns = Vec::new();
    for (idx, header) in table.headers.iter().enumerate() {
        if idx == date_idx {
            continue;
        }
        match room_type_of(header) {
            Some(rt) if !columns.iter().any(|(_, seen)| seen.matches(rt.as_str())) => {
                columns.push((idx, rt));
            }
            _ => ignored_columns.push(header.trim().to_string()),
        }
    }

    let mut snapshot = Snapshot::new(snapshot_date);
    let mut dropped_rows = Vec::new();
    let mut skipped_cells = Vec::new();
    let mut seen_dates = std::collections::BTreeSet::new();
    let mut duplicate_rows = 0;
    let mut data_rows = 0;

    for row in 0..table.rows.len() {
        if table.is_blank_row(row) {
            continue;
        }
        data_rows += 1;
        let line = Table::line_of(row);

        let stay_date = match parse_stay_date(table.cell(row, date_idx)) {
            Ok(date) => date,
            Err(error) => {
                warn!(line, %error, "row dropped");
                dropped_rows.push(DroppedRow { line, error });
                continue;
            }
        };
        if !seen_dates.insert(stay_date) {
            duplicate_rows += 1;
            debug!(line, %stay_date, "stay date repeated, later row wins");
        }

        for (idx, room_type) in &columns {
            match parse_quantity(table.cell(row, *idx)) {
                Ok(Some(quantity)) => {
                    snapshot.insert(stay_date, room_type.clone(), quantity);
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(line, room_type = %room_type, %error, "cell skipped");
                    skipped_cells.push(SkippedCell {
                        line,
                        stay_date,
                        room_type: room_type.clone(),
                        error,
                    });
                }
            }
        }
    }

    if data_rows > 0 && dropped_rows.len() == data_rows {
        return Err(SchemaError::UnparseableDateColumn {
            column: table.headers[date_idx].trim().to_string(),
            rows: data_rows,
        });
    }

    debug!(
        snapshot_date = %snapshot_date,
        records = snapshot.len(),
        dropped = dropped_rows.len(),
        skipped = skipped_cells.len(),
        "upload normalized"
    );

    Ok(NormalizedUpload {
        snapshot,
        date_column: table.headers[date_idx].trim().to_string(),
        room_types: columns.into_iter().map(|(_, rt)| rt).collect(),
        ignored_columns,
        dropped_rows,
        skipped_cells,
        duplicate_rows,
    })
}

/// Where a snapshot date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotDateSource {
    /// Given by the user.
    Explicit,
    /// `YYYY-MM-DD` embedded in the file name.
    FileName,
    /// File creation (or modification) time.
    FileTime,
    /// Nothing else was available.
    Today,
}

/// Raised when the snapshot date had to be guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotDateWarning {
    FellBackToFileTime,
    FellBackToToday,
}

impl std::fmt::Display for SnapshotDateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotDateWarning::FellBackToFileTime => {
                write!(f, "no date in the file name, using the file's timestamp")
            }
            SnapshotDateWarning::FellBackToToday => {
                write!(f, "no date in the file name or file metadata, using today")
            }
        }
    }
}

/// A snapshot date plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedSnapshotDate {
    pub date: NaiveDate,
    pub source: SnapshotDateSource,
    pub warning: Option<SnapshotDateWarning>,
}

/// First valid `YYYY-MM-DD` in a file name.
#[must_use]
pub fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    (0..bytes.len().saturating_sub(9)).find_map(|start| {
        let window = &bytes[start..start + 10];
        let shaped = window.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
        if !shaped {
            return None;
        }
        let text = std::str::from_utf8(window).ok()?;
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    })
}

fn file_time(path: &Path) -> Option<NaiveDate> {
    let meta = std::fs::metadata(path).ok()?;
    let time: SystemTime = meta.created().or_else(|_| meta.modified()).ok()?;
    Some(DateTime::<Local>::from(time).date_naive())
}

/// Decide the snapshot date of an upload.
///
/// Precedence: explicit date, then a date in the file name, then the file's
/// creation time (modification time where creation is unsupported), then
/// `today`. The last two come with a warning for the caller to surface.
#[must_use]
pub fn resolve_snapshot_date(
    explicit: Option<NaiveDate>,
    path: &Path,
    today: NaiveDate,
) -> ResolvedSnapshotDate {
    if let Some(date) = explicit {
        return ResolvedSnapshotDate {
            date,
            source: SnapshotDateSource::Explicit,
            warning: None,
        };
    }

    let from_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(date_from_file_name);
    if let Some(date) = from_name {
        return ResolvedSnapshotDate {
            date,
            source: SnapshotDateSource::FileName,
            warning: None,
        };
    }

    match file_time(path) {
        Some(date) => ResolvedSnapshotDate {
            date,
            source: SnapshotDateSource::FileTime,
            warning: Some(SnapshotDateWarning::FellBackToFileTime),
        },
        None => ResolvedSnapshotDate {
            date: today,
            source: SnapshotDateSource::Today,
            warning: Some(SnapshotDateWarning::FellBackToToday),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> WideSnapshotTable {
        Table::new(
            headers.iter().map(|s| (*s).to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| (*s).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn parses_supported_date_formats() {
        for raw in [
            "2025-08-01",
            "2025/08/01",
            "01/08/2025",
            "01-08-2025",
            "01.08.2025",
            "2025-08-01 00:00:00",
            "2025-08-01T12:30:00",
        ] {
            assert_eq!(parse_stay_date(raw), Ok(date(2025, 8, 1)), "{raw}");
        }
        assert!(parse_stay_date("01/08/25").is_err());
        assert!(parse_stay_date("tomorrow").is_err());
    }

    #[test]
    fn quantities_accept_whole_floats_only() {
        assert_eq!(parse_quantity(""), Ok(None));
        assert_eq!(parse_quantity("7"), Ok(Some(7)));
        assert_eq!(parse_quantity("10.0"), Ok(Some(10)));
        assert_eq!(parse_quantity("3,0"), Ok(Some(3)));
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("n/a").is_err());
        assert_eq!(parse_quantity("2147483647"), Ok(Some(MAX_QUANTITY)));
        assert!(parse_quantity("2147483648").is_err());
        assert!(parse_quantity("3000000000.0").is_err());
    }

    #[test]
    fn melts_wide_table_into_records() {
        let t = table(
            &["Fecha", "N-4", "st2", "Notes"],
            &[&["2025-08-01", "5", "1", "x"], &["2025-08-02", "", "2", ""]],
        );
        let upload = normalize(&t, date(2025, 1, 10), &CapacityModel::default()).unwrap();

        assert_eq!(upload.snapshot.len(), 3);
        assert_eq!(upload.snapshot.date(), date(2025, 1, 10));
        assert_eq!(upload.ignored_columns, vec!["Notes".to_string()]);
        assert_eq!(upload.date_column, "Fecha");
        assert_eq!(
            upload.room_types,
            vec![RoomType::try_new("N-4").unwrap(), RoomType::try_new("ST2").unwrap()]
        );
        assert!(!upload.is_lossy());
    }

    #[test]
    fn bad_rows_and_cells_are_dropped_not_fatal() {
        let t = table(
            &["fecha", "N-4"],
            &[&["2025-08-01", "5"], &["garbage", "4"], &["2025-08-02", "-3"], &["", ""]],
        );
        let upload = normalize(&t, date(2025, 1, 10), &CapacityModel::default()).unwrap();

        assert_eq!(upload.snapshot.len(), 1);
        assert_eq!(upload.dropped_rows.len(), 1);
        assert_eq!(upload.dropped_rows[0].line, 3);
        assert_eq!(upload.skipped_cells.len(), 1);
        assert_eq!(upload.skipped_cells[0].stay_date, date(2025, 8, 2));
    }

    #[test]
    fn duplicate_stay_dates_keep_the_later_row() {
        let t = table(&["fecha", "N-4"], &[&["2025-08-01", "5"], &["01/08/2025", "9"]]);
        let upload = normalize(&t, date(2025, 1, 10), &CapacityModel::default()).unwrap();
        assert_eq!(upload.duplicate_rows, 1);
        assert_eq!(upload.snapshot.records().next().unwrap().quantity, 9);
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let t = table(&["N-4", "ST2"], &[&["5", "1"]]);
        let err = normalize(&t, date(2025, 1, 10), &CapacityModel::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { column: "fecha", .. }));
    }

    #[test]
    fn unreadable_date_column_is_a_schema_error() {
        let t = table(&["fecha", "N-4"], &[&["foo", "5"], &["bar", "1"]]);
        let err = normalize(&t, date(2025, 1, 10), &CapacityModel::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnparseableDateColumn {
                column: "fecha".into(),
                rows: 2
            }
        );
    }

    #[test]
    fn stored_tables_keep_every_room_type_column() {
        let t = table(
            &["fecha", "N-4", "BUNG", ""],
            &[&["2025-08-01", "5", "2", ""]],
        );
        let upload = normalize_stored(&t, date(2025, 1, 10)).unwrap();
        assert_eq!(upload.snapshot.len(), 2);
        assert_eq!(
            upload.room_types,
            vec![RoomType::try_new("N-4").unwrap(), RoomType::try_new("BUNG").unwrap()]
        );
        assert_eq!(upload.ignored_columns, vec![String::new()]);
    }

    #[test]
    fn file_name_date_is_found_anywhere() {
        assert_eq!(
            date_from_file_name("reservas_2025-03-07_v2.csv"),
            Some(date(2025, 3, 7))
        );
        assert_eq!(date_from_file_name("2025-13-40 then 2025-02-01.csv"), Some(date(2025, 2, 1)));
        assert_eq!(date_from_file_name("reservas.csv"), None);
        assert_eq!(date_from_file_name("é2025-03-07"), Some(date(2025, 3, 7)));
    }

    #[test]
    fn snapshot_date_precedence() {
        let dir = TempDir::new().unwrap();
        let named = dir.path().join("export_2025-02-01.csv");
        let unnamed = dir.path().join("export.csv");
        std::fs::write(&named, "fecha\n").unwrap();
        std::fs::write(&unnamed, "fecha\n").unwrap();
        let today = date(2030, 1, 1);

        let explicit = resolve_snapshot_date(Some(date(2025, 5, 5)), &named, today);
        assert_eq!(explicit.date, date(2025, 5, 5));
        assert_eq!(explicit.source, SnapshotDateSource::Explicit);

        let by_name = resolve_snapshot_date(None, &named, today);
        assert_eq!(by_name.date, date(2025, 2, 1));
        assert_eq!(by_name.warning, None);

        let by_time = resolve_snapshot_date(None, &unnamed, today);
        assert_eq!(by_time.source, SnapshotDateSource::FileTime);
        assert_eq!(by_time.warning, Some(SnapshotDateWarning::FellBackToFileTime));

        let missing = resolve_snapshot_date(None, &dir.path().join("gone.csv"), today);
        assert_eq!(missing.date, today);
        assert_eq!(missing.warning, Some(SnapshotDateWarning::FellBackToToday));
    }
}
