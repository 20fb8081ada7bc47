use crate::common::{AggregateRoot, DomainError, DomainResult};
use crate::domains::robot_command::Waypoint;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::TaskPhaseEvent;

/// The directive a phase carries to its robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PhaseKind {
    FollowPath { waypoints: Vec<Waypoint> },
    Dock { dock_name: String },
    Stop,
}

impl PhaseKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            PhaseKind::FollowPath { .. } => "follow_path",
            PhaseKind::Dock { .. } => "dock",
            PhaseKind::Stop => "stop",
        }
    }
}

/// Lifecycle state of a phase. Only `Active` carries progress text, so a
/// terminal phase cannot hold stale status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PhaseState {
    Pending,
    Active { status_text: String },
    Finished,
    Cancelled,
    Failed { reason: String },
}

/// One unit of commanded robot work. Created `Pending` when the dispatcher
/// assigns work, `Active` once the command has been issued to the driver,
/// and terminal when the driver reports completion or the phase is
/// superseded. The first terminal transition wins; any later completion or
/// cancellation signal is silently ignored, which is what makes the
/// cross-context completion race safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPhase {
    pub id: String,
    pub robot_id: String,
    pub kind: PhaseKind,
    pub state: PhaseState,
    pub version: u64,
    #[serde(skip)]
    uncommitted_events: Vec<TaskPhaseEvent>,
}

impl TaskPhase {
    pub fn new(robot_id: String, kind: PhaseKind) -> Self {
        let id = Uuid::new_v4().to_string();
        let mut phase = Self {
            id: id.clone(),
            robot_id: robot_id.clone(),
            kind: kind.clone(),
            state: PhaseState::Pending,
            version: 0,
            uncommitted_events: Vec::new(),
        };

        let event = TaskPhaseEvent::PhaseAssigned {
            phase_id: id,
            robot_id,
            kind,
            timestamp: Utc::now(),
        };

        phase.add_event(event);
        phase
    }

    /// The dispatcher has issued the underlying command to the driver.
    pub fn activate(&mut self, status_text: String) -> DomainResult<()> {
        if self.state != PhaseState::Pending {
            return Err(DomainError::PhaseTransition {
                from: self.state_name().to_string(),
                to: "active".to_string(),
            });
        }

        self.state = PhaseState::Active {
            status_text: status_text.clone(),
        };

        let event = TaskPhaseEvent::PhaseActivated {
            phase_id: self.id.clone(),
            robot_id: self.robot_id.clone(),
            status_text,
            timestamp: Utc::now(),
        };

        self.add_event(event);
        Ok(())
    }

    /// Driver-reported completion. A late signal arriving after the phase
    /// was cancelled (the supersession race) is a no-op, never an error.
    pub fn complete(&mut self) -> DomainResult<()> {
        match self.state {
            PhaseState::Active { .. } => {
                self.state = PhaseState::Finished;
                let event = TaskPhaseEvent::PhaseCompleted {
                    phase_id: self.id.clone(),
                    robot_id: self.robot_id.clone(),
                    timestamp: Utc::now(),
                };
                self.add_event(event);
                Ok(())
            }
            PhaseState::Pending => Err(DomainError::PhaseTransition {
                from: "pending".to_string(),
                to: "finished".to_string(),
            }),
            // Already terminal: first transition won.
            _ => Ok(()),
        }
    }

    /// Supersession by a newer phase, or an explicit stop. No-op once
    /// terminal.
    pub fn cancel(&mut self) -> DomainResult<()> {
        match self.state {
            PhaseState::Pending | PhaseState::Active { .. } => {
                self.state = PhaseState::Cancelled;
                let event = TaskPhaseEvent::PhaseCancelled {
                    phase_id: self.id.clone(),
                    robot_id: self.robot_id.clone(),
                    timestamp: Utc::now(),
                };
                self.add_event(event);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Driver-surfaced error condition, for platforms that report one.
    pub fn fail(&mut self, reason: String) -> DomainResult<()> {
        match self.state {
            PhaseState::Active { .. } => {
                self.state = PhaseState::Failed {
                    reason: reason.clone(),
                };
                let event = TaskPhaseEvent::PhaseFailed {
                    phase_id: self.id.clone(),
                    robot_id: self.robot_id.clone(),
                    reason,
                    timestamp: Utc::now(),
                };
                self.add_event(event);
                Ok(())
            }
            PhaseState::Pending => Err(DomainError::PhaseTransition {
                from: "pending".to_string(),
                to: "failed".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Human-readable progress for monitoring. While active this is the
    /// phase's progress text; otherwise a fixed sentinel for the state, so
    /// callers never see stale or empty text.
    pub fn current_status(&self) -> String {
        match &self.state {
            PhaseState::Pending => "pending".to_string(),
            PhaseState::Active { status_text } => status_text.clone(),
            PhaseState::Finished => "finished".to_string(),
            PhaseState::Cancelled => "cancelled".to_string(),
            PhaseState::Failed { reason } => format!("failed: {}", reason),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            PhaseState::Finished | PhaseState::Cancelled | PhaseState::Failed { .. }
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PhaseState::Active { .. })
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            PhaseState::Pending => "pending",
            PhaseState::Active { .. } => "active",
            PhaseState::Finished => "finished",
            PhaseState::Cancelled => "cancelled",
            PhaseState::Failed { .. } => "failed",
        }
    }
}

impl AggregateRoot for TaskPhase {
    type Event = TaskPhaseEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) -> DomainResult<()> {
        match event {
            TaskPhaseEvent::PhaseAssigned {
                phase_id,
                robot_id,
                kind,
                ..
            } => {
                self.id = phase_id.clone();
                self.robot_id = robot_id.clone();
                self.kind = kind.clone();
                self.state = PhaseState::Pending;
            }
            TaskPhaseEvent::PhaseActivated { status_text, .. } => {
                self.state = PhaseState::Active {
                    status_text: status_text.clone(),
                };
            }
            TaskPhaseEvent::PhaseCompleted { .. } => {
                self.state = PhaseState::Finished;
            }
            TaskPhaseEvent::PhaseCancelled { .. } => {
                self.state = PhaseState::Cancelled;
            }
            TaskPhaseEvent::PhaseFailed { reason, .. } => {
                self.state = PhaseState::Failed {
                    reason: reason.clone(),
                };
            }
        }
        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}
