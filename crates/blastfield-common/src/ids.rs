//! ID types for explosion sessions.

use serde::{Deserialize, Serialize};

/// Identifier of an explosion session within one field.
///
/// IDs are handed out by the owning field from its own counter, so two
/// fields may reuse the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Null/invalid session ID.
    pub const NULL: Self = Self(0);

    /// Creates a session ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid (non-null) session ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Returns the ID following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_invalid() {
        assert!(!SessionId::NULL.is_valid());
        assert!(SessionId::NULL.next().is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionId::from_raw(7).to_string(), "session#7");
    }
}
