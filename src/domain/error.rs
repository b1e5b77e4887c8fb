//! Domain validation errors.
//!
//! Returned by `try_new` constructors and lookups that enforce domain rules.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use revpace::domain::error::DomainError;
//! use revpace::domain::range::StayRange;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
//!
//! assert!(matches!(
//!     StayRange::try_new(start, end),
//!     Err(DomainError::InvertedRange { .. })
//! ));
//! ```

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Stay ranges are inclusive and must not run backwards.
    #[error("range start {start} is after range end {end}")]
    InvertedRange {
        /// Requested first stay date.
        start: NaiveDate,
        /// Requested last stay date.
        end: NaiveDate,
    },

    /// Room-type codes cannot be blank.
    #[error("room type code cannot be empty")]
    EmptyRoomType,

    /// The room type is not part of the configured inventory.
    #[error("unknown room type '{code}' (configured: {})", .known.join(", "))]
    UnknownRoomType {
        /// Code that was asked for.
        code: String,
        /// Codes the capacity model knows about.
        known: Vec<String>,
    },

    /// Every configured room type must have sellable units.
    #[error("capacity for room type '{code}' must be greater than 0")]
    ZeroCapacity {
        /// Offending room type.
        code: String,
    },

    /// Quantities must fit every store backend.
    #[error("quantity {quantity} exceeds the maximum of {max}")]
    QuantityTooLarge {
        /// Offending quantity.
        quantity: u32,
        /// Largest storable quantity.
        max: u32,
    },

    /// The capacity model needs at least one room type.
    #[error("capacity model has no room types")]
    EmptyCapacity,

    /// A comparison asked for a snapshot date that is not stored.
    #[error("no snapshot stored for {date}")]
    SnapshotNotFound {
        /// Requested snapshot date.
        date: NaiveDate,
    },

    /// Pricing thresholds must satisfy `0 < low < high <= 100`.
    #[error("invalid occupancy thresholds: low {low}% / high {high}%")]
    InvalidThresholds {
        /// Low-occupancy threshold in percent.
        low: u8,
        /// High-occupancy threshold in percent.
        high: u8,
    },
}
