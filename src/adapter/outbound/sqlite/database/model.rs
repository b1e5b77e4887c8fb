//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::reservations;

/// Database row for one snapshot record. Dates are stored as `YYYY-MM-DD` text.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReservationRow {
    pub stay_date: String,
    pub room_type: String,
    pub quantity: i32,
    pub snapshot_date: String,
}
