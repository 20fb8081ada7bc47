// Task lifecycle projections - simplified implementation
use serde::{Deserialize, Serialize};

use super::events::TaskPhaseEvent;

/// Per-robot view of phase activity, folded from the phase event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotPhaseProjection {
    pub robot_id: String,
    pub assigned_count: usize,
    pub finished_count: usize,
    pub cancelled_count: usize,
    pub failed_count: usize,
    pub last_status: Option<String>,
}

impl RobotPhaseProjection {
    pub fn new(robot_id: String) -> Self {
        Self {
            robot_id,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: &TaskPhaseEvent) {
        match event {
            TaskPhaseEvent::PhaseAssigned { .. } => self.assigned_count += 1,
            TaskPhaseEvent::PhaseActivated { status_text, .. } => {
                self.last_status = Some(status_text.clone());
            }
            TaskPhaseEvent::PhaseCompleted { .. } => self.finished_count += 1,
            TaskPhaseEvent::PhaseCancelled { .. } => self.cancelled_count += 1,
            TaskPhaseEvent::PhaseFailed { .. } => self.failed_count += 1,
        }
    }
}
