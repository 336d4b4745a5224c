// ── Device-native shade position ──
//
// The controller reports and accepts positions as a percentage where
// 0 is fully open (shade up) and 100 is fully closed (shade down).
// Host-facing conversions live in `somfly-core`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A 0–100 shade position in the controller's own convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Position(u8);

impl Position {
    /// Fully open.
    pub const OPEN: Self = Self(0);
    /// Fully closed.
    pub const CLOSED: Self = Self(100);

    /// Build a position, rejecting anything outside 0–100.
    pub fn new(percent: i64) -> Result<Self, Error> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(Self)
            .ok_or(Error::InvalidPosition(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// The same physical position expressed in the opposite convention.
    pub fn inverted(self) -> Self {
        Self(100 - self.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i64> for Position {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Position> for u8 {
    fn from(p: Position) -> Self {
        p.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        assert_eq!(Position::new(0).unwrap(), Position::OPEN);
        assert_eq!(Position::new(100).unwrap(), Position::CLOSED);
        assert_eq!(Position::new(42).unwrap().percent(), 42);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(Position::new(101), Err(Error::InvalidPosition(101))));
        assert!(matches!(Position::new(-1), Err(Error::InvalidPosition(-1))));
    }

    #[test]
    fn inversion_is_an_involution() {
        let p = Position::new(30).unwrap();
        assert_eq!(p.inverted().percent(), 70);
        assert_eq!(p.inverted().inverted(), p);
    }
}
