// ── Shade domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use somfly_api::NodeId;

use crate::error::CoreError;

/// Shade position in the host convention: 0 is closed, 100 is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct HostPosition(u8);

impl HostPosition {
    pub const CLOSED: Self = Self(0);
    pub const OPEN: Self = Self(100);

    pub fn new(percent: i64) -> Result<Self, CoreError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(Self)
            .ok_or_else(|| CoreError::ValidationFailed {
                message: format!("position {percent} is outside 0-100"),
            })
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Anything above fully closed counts as open.
    pub fn is_closed(self) -> bool {
        self.0 == 0
    }

    /// Only used by `convert` where the range is already checked.
    pub(crate) fn from_percent_unchecked(percent: u8) -> Self {
        Self(percent.min(100))
    }
}

impl fmt::Display for HostPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i64> for HostPosition {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HostPosition> for u8 {
    fn from(p: HostPosition) -> Self {
        p.0
    }
}

/// One shade as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shade {
    /// Compact wire id (`132A01`).
    pub node_id: NodeId,
    /// Dotted display id (`13.2A.01`).
    pub dotted_id: String,
    pub name: String,
    /// Motor model reported by the controller.
    pub kind: String,
    pub position: HostPosition,
}

impl Shade {
    pub fn is_closed(&self) -> bool {
        self.position.is_closed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn host_position_bounds() {
        assert_eq!(HostPosition::new(100).unwrap(), HostPosition::OPEN);
        assert!(HostPosition::new(101).is_err());
        assert!(HostPosition::new(-5).is_err());
        assert!(HostPosition::CLOSED.is_closed());
        assert!(!HostPosition::new(1).unwrap().is_closed());
    }

    #[test]
    fn host_position_serializes_as_number() {
        let json = serde_json::to_string(&HostPosition::new(35).unwrap()).unwrap();
        assert_eq!(json, "35");
        assert!(serde_json::from_str::<HostPosition>("150").is_err());
    }
}
