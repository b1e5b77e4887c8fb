//! Static room-type inventory.

use std::collections::BTreeMap;

use super::error::DomainError;
use super::room_type::RoomType;

/// Default campsite inventory, units per room type.
pub const DEFAULT_INVENTORY: &[(&str, u32)] = &[
    ("N-4", 30),
    ("N-6", 10),
    ("ST2", 2),
    ("ST4", 5),
    ("ST5", 5),
];

/// Total sellable units per room type.
///
/// Read-only once built. Also defines the closed set of room-type codes the
/// normalizer accepts as columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityModel {
    units: BTreeMap<RoomType, u32>,
}

impl CapacityModel {
    /// Build a model from `(code, units)` pairs.
    ///
    /// # Errors
    /// Fails on an empty list, a blank code or a zero capacity.
    pub fn try_new<I, S>(entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut units = BTreeMap::new();
        for (code, count) in entries {
            let room_type = RoomType::try_new(code)?;
            if count == 0 {
                return Err(DomainError::ZeroCapacity {
                    code: room_type.to_string(),
                });
            }
            units.insert(room_type, count);
        }
        if units.is_empty() {
            return Err(DomainError::EmptyCapacity);
        }
        Ok(Self { units })
    }

    /// Units available for a room type.
    #[must_use]
    pub fn capacity(&self, room_type: &RoomType) -> Option<u32> {
        self.units.get(room_type).copied()
    }

    /// Configured room types in code order.
    pub fn room_types(&self) -> impl Iterator<Item = &RoomType> {
        self.units.keys()
    }

    #[must_use]
    pub fn contains(&self, room_type: &RoomType) -> bool {
        self.units.contains_key(room_type)
    }

    /// Resolve a table header or user-typed code to a configured room type.
    #[must_use]
    pub fn match_header(&self, header: &str) -> Option<&RoomType> {
        self.units.keys().find(|rt| rt.matches(header))
    }

    /// Like [`match_header`](Self::match_header) but with an error naming the known codes.
    pub fn resolve(&self, code: &str) -> Result<RoomType, DomainError> {
        self.match_header(code)
            .cloned()
            .ok_or_else(|| DomainError::UnknownRoomType {
                code: code.trim().to_string(),
                known: self.units.keys().map(ToString::to_string).collect(),
            })
    }

    /// Sum of all units.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.units.values().sum()
    }

    /// Iterate `(room_type, units)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&RoomType, u32)> {
        self.units.iter().map(|(rt, units)| (rt, *units))
    }
}

impl Default for CapacityModel {
    fn default() -> Self {
        let units = DEFAULT_INVENTORY
            .iter()
            .filter_map(|(code, units)| RoomType::try_new(code).ok().map(|rt| (rt, *units)))
            .collect();
        Self { units }
    }
}
