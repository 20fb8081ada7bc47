use crate::common::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orientation2D {
    pub angle: f64, // Angle in radians
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position2D,
    pub orientation: Orientation2D,
}

impl Pose {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            position: Position2D { x, y },
            orientation: Orientation2D { angle },
        }
    }
}

/// One stop on a commanded path: a pose in the shared map frame plus the
/// absolute target arrival time used for traffic deconfliction. A robot must
/// wait at each waypoint until the fleet clock reaches `time` before moving
/// on, even when it could arrive early.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub pose: Pose,
    pub time: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(pose: Pose, time: DateTime<Utc>) -> Self {
        Self { pose, time }
    }
}

/// Check that a commanded path is non-empty and its target times never
/// decrease. The planner produces paths in this form; anything else would
/// break the timing guarantees downstream robots rely on.
pub fn validate_path(waypoints: &[Waypoint]) -> DomainResult<()> {
    if waypoints.is_empty() {
        return Err(DomainError::InvalidCommand {
            reason: "Commanded path must contain at least one waypoint".to_string(),
        });
    }

    for pair in waypoints.windows(2) {
        if pair[1].time < pair[0].time {
            return Err(DomainError::InvalidCommand {
                reason: format!(
                    "Waypoint times must be non-decreasing ({} followed by {})",
                    pair[0].time, pair[1].time
                ),
            });
        }
    }

    Ok(())
}
