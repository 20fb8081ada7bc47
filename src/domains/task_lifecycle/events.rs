use super::aggregate::PhaseKind;
use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskPhaseEvent {
    PhaseAssigned {
        phase_id: String,
        robot_id: String,
        kind: PhaseKind,
        timestamp: DateTime<Utc>,
    },
    PhaseActivated {
        phase_id: String,
        robot_id: String,
        status_text: String,
        timestamp: DateTime<Utc>,
    },
    PhaseCompleted {
        phase_id: String,
        robot_id: String,
        timestamp: DateTime<Utc>,
    },
    PhaseCancelled {
        phase_id: String,
        robot_id: String,
        timestamp: DateTime<Utc>,
    },
    PhaseFailed {
        phase_id: String,
        robot_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for TaskPhaseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TaskPhaseEvent::PhaseAssigned { .. } => "PhaseAssigned",
            TaskPhaseEvent::PhaseActivated { .. } => "PhaseActivated",
            TaskPhaseEvent::PhaseCompleted { .. } => "PhaseCompleted",
            TaskPhaseEvent::PhaseCancelled { .. } => "PhaseCancelled",
            TaskPhaseEvent::PhaseFailed { .. } => "PhaseFailed",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            TaskPhaseEvent::PhaseAssigned { phase_id, .. } => phase_id,
            TaskPhaseEvent::PhaseActivated { phase_id, .. } => phase_id,
            TaskPhaseEvent::PhaseCompleted { phase_id, .. } => phase_id,
            TaskPhaseEvent::PhaseCancelled { phase_id, .. } => phase_id,
            TaskPhaseEvent::PhaseFailed { phase_id, .. } => phase_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TaskPhaseEvent::PhaseAssigned { timestamp, .. } => *timestamp,
            TaskPhaseEvent::PhaseActivated { timestamp, .. } => *timestamp,
            TaskPhaseEvent::PhaseCompleted { timestamp, .. } => *timestamp,
            TaskPhaseEvent::PhaseCancelled { timestamp, .. } => *timestamp,
            TaskPhaseEvent::PhaseFailed { timestamp, .. } => *timestamp,
        }
    }
}
