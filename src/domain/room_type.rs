//! Room-type identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Accommodation type code (`N-4`, `ST2`, ...) - newtype for type safety.
///
/// Codes are stored trimmed. The inner String is private so every value goes
/// through [`RoomType::try_new`] or the `From` conversions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomType(String);

impl RoomType {
    /// Create a room type, rejecting blank codes.
    pub fn try_new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(DomainError::EmptyRoomType);
        }
        Ok(Self(code.to_string()))
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw header or user input.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.0.eq_ignore_ascii_case(raw.trim())
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RoomType {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl TryFrom<&str> for RoomType {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl From<RoomType> for String {
    fn from(room_type: RoomType) -> Self {
        room_type.0
    }
}
