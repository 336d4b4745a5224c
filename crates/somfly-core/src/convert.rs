// ── Device-to-host conversions ──
//
// The controller reports 0 = open and 100 = closed; hosts expect the
// opposite. The inversion is fixed, not configurable.

use somfly_api::{Position, ShadeStatus};

use crate::error::CoreError;
use crate::model::{HostPosition, Shade};

pub fn host_from_device(position: Position) -> HostPosition {
    HostPosition::from_percent_unchecked(position.inverted().percent())
}

pub fn device_from_host(position: HostPosition) -> Position {
    // Host positions are always 0-100, so the fallback is unreachable.
    Position::new(i64::from(position.percent()))
        .map(Position::inverted)
        .unwrap_or(Position::CLOSED)
}

/// Map a raw motor position onto a device percentage using the motor's
/// limit positions. `raw` is clamped into the limits first; the result
/// truncates toward zero.
pub fn percent_from_raw(raw: i64, limits_up: i64, limits_down: i64) -> Result<Position, CoreError> {
    if limits_down <= limits_up {
        return Err(CoreError::ValidationFailed {
            message: format!("invalid limits: up={limits_up} must be below down={limits_down}"),
        });
    }
    let clamped = raw.clamp(limits_up, limits_down);
    let span = i128::from(limits_down) - i128::from(limits_up);
    let offset = i128::from(clamped) - i128::from(limits_up);
    let percent = i64::try_from(offset * 100 / span).map_err(|_| CoreError::ValidationFailed {
        message: format!("raw position {raw} out of range"),
    })?;
    Ok(Position::new(percent)?)
}

impl From<ShadeStatus> for Shade {
    fn from(status: ShadeStatus) -> Self {
        let info = status.info;
        Self {
            dotted_id: info.node_id.dotted(),
            node_id: info.node_id,
            name: info.name,
            kind: info.kind,
            position: host_from_device(status.position),
        }
    }
}
