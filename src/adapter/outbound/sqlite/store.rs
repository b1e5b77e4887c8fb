//! SQLite snapshot store implementation.
//!
//! One row per `(stay_date, room_type, snapshot_date)` in the `reservations`
//! table. A snapshot write is a single immediate transaction that deletes the
//! snapshot date's rows and inserts the new set.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::{open_pool, DbPool};
use crate::adapter::outbound::sqlite::database::model::ReservationRow;
use crate::adapter::outbound::sqlite::database::schema::reservations;
use crate::domain::error::DomainError;
use crate::domain::room_type::RoomType;
use crate::domain::snapshot::{Snapshot, SnapshotRecord, MAX_QUANTITY};
use crate::error::{Error, Result, StoreError};
use crate::port::outbound::store::SnapshotStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rows per INSERT statement, well below SQLite's bound-parameter limit.
const INSERT_CHUNK: usize = 500;

/// SQLite-backed snapshot store.
pub struct SqliteSnapshotStore {
    pool: DbPool,
    path: PathBuf,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `path` and apply migrations.
    ///
    /// # Errors
    /// Returns a store error if the file cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
        let pool = open_pool(&path)?;
        debug!(path = %path.display(), "sqlite store opened");
        Ok(Self { pool, path })
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| StoreError::Unavailable(e.to_string()).into())
    }

    fn to_row(record: &SnapshotRecord) -> Result<ReservationRow> {
        let quantity = i32::try_from(record.quantity).map_err(|_| DomainError::QuantityTooLarge {
            quantity: record.quantity,
            max: MAX_QUANTITY,
        })?;
        Ok(ReservationRow {
            stay_date: record.stay_date.format(DATE_FORMAT).to_string(),
            room_type: record.room_type.to_string(),
            quantity,
            snapshot_date: record.snapshot_date.format(DATE_FORMAT).to_string(),
        })
    }

    fn from_row(row: ReservationRow) -> Result<SnapshotRecord> {
        let malformed = |reason: String| StoreError::Malformed {
            location: format!(
                "reservations({}, {}, {})",
                row.stay_date, row.room_type, row.snapshot_date
            ),
            reason,
        };
        let stay_date = parse_date(&row.stay_date).map_err(|e| malformed(e.to_string()))?;
        let snapshot_date = parse_date(&row.snapshot_date).map_err(|e| malformed(e.to_string()))?;
        let room_type = RoomType::try_new(&row.room_type).map_err(|e| malformed(e.to_string()))?;
        let quantity = u32::try_from(row.quantity)
            .map_err(|_| malformed(format!("negative quantity {}", row.quantity)))?;

        Ok(SnapshotRecord {
            stay_date,
            room_type,
            quantity,
            snapshot_date,
        })
    }
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

fn query_error(e: diesel::result::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

impl SnapshotStore for SqliteSnapshotStore {
    fn write(&self, snapshot: &Snapshot) -> Result<usize> {
        let rows = snapshot
            .records()
            .map(|r| Self::to_row(&r))
            .collect::<Result<Vec<_>>>()?;
        let date = snapshot.date().format(DATE_FORMAT).to_string();
        let mut conn = self.conn()?;

        let (replaced, inserted) = conn
            .immediate_transaction::<_, diesel::result::Error, _>(|conn| {
                let replaced = diesel::delete(
                    reservations::table.filter(reservations::snapshot_date.eq(&date)),
                )
                .execute(conn)?;
                let mut inserted = 0;
                for chunk in rows.chunks(INSERT_CHUNK) {
                    inserted += diesel::insert_into(reservations::table)
                        .values(chunk)
                        .execute(conn)?;
                }
                Ok((replaced, inserted))
            })
            .map_err(query_error)?;

        debug!(snapshot_date = %date, replaced, inserted, "sqlite snapshot written");
        Ok(inserted)
    }

    fn read_all(&self) -> Result<Vec<SnapshotRecord>> {
        let mut conn = self.conn()?;
        let rows: Vec<ReservationRow> = reservations::table
            .select(ReservationRow::as_select())
            .order((
                reservations::snapshot_date.asc(),
                reservations::stay_date.asc(),
                reservations::room_type.asc(),
            ))
            .load(&mut conn)
            .map_err(query_error)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut conn = self.conn()?;
        let dates: Vec<String> = reservations::table
            .select(reservations::snapshot_date)
            .distinct()
            .order(reservations::snapshot_date.asc())
            .load(&mut conn)
            .map_err(query_error)?;

        dates
            .iter()
            .map(|d| {
                parse_date(d).map_err(|e| {
                    Error::from(StoreError::Malformed {
                        location: "reservations.snapshot_date".to_string(),
                        reason: format!("'{d}': {e}"),
                    })
                })
            })
            .collect()
    }

    fn read_snapshot(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        let mut conn = self.conn()?;
        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::snapshot_date.eq(date.format(DATE_FORMAT).to_string()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .map_err(query_error)?;

        if rows.is_empty() {
            return Ok(None);
        }
        let records = rows
            .into_iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Snapshot::from_records(date, &records)))
    }

    fn read_latest_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.snapshot_dates()?.last() {
            Some(date) => self.read_snapshot(*date),
            None => Ok(None),
        }
    }

    fn read_latest_before(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        let previous = self
            .snapshot_dates()?
            .into_iter()
            .filter(|d| *d < date)
            .max();
        match previous {
            Some(d) => self.read_snapshot(d),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rt(code: &str) -> RoomType {
        RoomType::try_new(code).unwrap()
    }

    fn setup() -> (TempDir, SqliteSnapshotStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteSnapshotStore::open(dir.path().join("nested").join("revpace.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_store_has_no_snapshots() {
        let (_dir, store) = setup();
        assert!(store.read_all().unwrap().is_empty());
        assert!(store.read_latest_snapshot().unwrap().is_none());
        assert!(store.snapshot_dates().unwrap().is_empty());
    }

    #[test]
    fn write_replaces_same_snapshot_date() {
        let (_dir, store) = setup();
        let mut first = Snapshot::new(date(2025, 1, 10));
        first.insert(date(2025, 8, 1), rt("N-4"), 5);
        first.insert(date(2025, 8, 2), rt("N-4"), 6);
        store.write(&first).unwrap();

        let mut second = Snapshot::new(date(2025, 1, 10));
        second.insert(date(2025, 8, 1), rt("ST2"), 1);
        assert_eq!(store.write(&second).unwrap(), 1);

        let all = store.read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].room_type, rt("ST2"));
    }

    #[test]
    fn oversized_quantity_is_not_retryable() {
        let (_dir, store) = setup();
        let mut s = Snapshot::new(date(2025, 1, 10));
        s.insert(date(2025, 8, 1), rt("N-4"), MAX_QUANTITY + 1);

        let err = store.write(&s).unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::QuantityTooLarge { .. })
        ));
        assert!(!err.is_recoverable());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn latest_before_skips_same_and_newer_dates() {
        let (_dir, store) = setup();
        for (day, qty) in [(1, 3), (10, 5), (20, 9)] {
            let mut s = Snapshot::new(date(2025, 1, day));
            s.insert(date(2025, 8, 1), rt("N-4"), qty);
            store.write(&s).unwrap();
        }

        let before = store.read_latest_before(date(2025, 1, 20)).unwrap().unwrap();
        assert_eq!(before.date(), date(2025, 1, 10));
        assert!(store.read_latest_before(date(2025, 1, 1)).unwrap().is_none());
        assert_eq!(
            store.read_latest_snapshot().unwrap().unwrap().date(),
            date(2025, 1, 20)
        );
        assert_eq!(store.describe(), format!("sqlite:{}", store.path.display()));
    }
}
