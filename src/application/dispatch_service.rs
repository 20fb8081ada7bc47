// Robot dispatch service - composes the task lifecycle with the robot command port
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::common::{
    AggregateRoot, ApplicationError, ApplicationResult, DomainError, EventEnvelope, EventMetadata,
    EventSink,
};
use crate::domains::robot_command::{
    validate_path, CompletionCallback, RobotCommandPort, Waypoint,
};
use crate::domains::task_lifecycle::{PhaseKind, TaskPhase};

/// Shared handle to a phase. Completion callbacks fire from the driver's
/// execution context, so terminal transitions go through this mutex; the
/// aggregate's first-terminal-wins rule does the rest.
pub type PhaseHandle = Arc<Mutex<TaskPhase>>;

/// Per-robot dispatcher: owns the robot's command port and its currently
/// assigned phase. Assigning new work supersedes (cancels) whatever phase
/// was running, mirroring the hard-preemption semantics of the port itself.
/// Phase events are published to the configured sink as transitions happen.
pub struct RobotDispatchService {
    robot_id: String,
    command_port: Arc<dyn RobotCommandPort>,
    event_sink: Arc<dyn EventSink>,
    current_phase: Mutex<Option<PhaseHandle>>,
}

impl RobotDispatchService {
    pub fn new(
        robot_id: String,
        command_port: Arc<dyn RobotCommandPort>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            robot_id,
            command_port,
            event_sink,
            current_phase: Mutex::new(None),
        }
    }

    pub fn robot_id(&self) -> &str {
        &self.robot_id
    }

    /// Assign a new path-following phase. Any phase currently in flight is
    /// cancelled first; its completion callback, should the driver race us
    /// and fire it anyway, lands on an already-terminal phase and is
    /// ignored.
    pub async fn dispatch_path(&self, waypoints: Vec<Waypoint>) -> ApplicationResult<PhaseHandle> {
        validate_path(&waypoints)?;

        self.supersede_current().await?;

        let handle = self
            .activate_phase(
                PhaseKind::FollowPath {
                    waypoints: waypoints.clone(),
                },
                path_status_text(&waypoints),
            )
            .await?;

        self.command_port
            .follow_new_path(waypoints, completion_callback(&handle));

        *lock(&self.current_phase) = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Assign a docking phase.
    pub async fn dispatch_dock(&self, dock_name: &str) -> ApplicationResult<PhaseHandle> {
        self.supersede_current().await?;

        let handle = self
            .activate_phase(
                PhaseKind::Dock {
                    dock_name: dock_name.to_string(),
                },
                format!("Docking at '{}'", dock_name),
            )
            .await?;

        self.command_port
            .dock(dock_name, completion_callback(&handle));

        *lock(&self.current_phase) = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Halt the robot. Cancels the in-flight phase and records the stop as
    /// a phase of its own; the port call is synchronous, so that phase
    /// finishes immediately.
    pub async fn stop(&self) -> ApplicationResult<PhaseHandle> {
        self.supersede_current().await?;
        self.command_port.stop();

        let handle = self
            .activate_phase(PhaseKind::Stop, format!("Stopping robot {}", self.robot_id))
            .await?;
        lock(&handle).complete()?;
        self.publish_phase_events(&handle).await?;

        *lock(&self.current_phase) = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Mark the current phase failed, for platforms whose drivers surface
    /// an error condition out of band.
    pub async fn fail_current(&self, reason: String) -> ApplicationResult<()> {
        let current = lock(&self.current_phase).clone();
        if let Some(handle) = current {
            lock(&handle).fail(reason)?;
            self.publish_phase_events(&handle).await?;
        }
        Ok(())
    }

    /// Progress text of the robot's current phase, or "idle" when the robot
    /// has never been assigned work. Safe, non-blocking read.
    pub fn current_status(&self) -> String {
        match &*lock(&self.current_phase) {
            Some(handle) => lock(handle).current_status(),
            None => "idle".to_string(),
        }
    }

    /// Whether the robot is free to receive new work.
    pub fn is_idle(&self) -> bool {
        match &*lock(&self.current_phase) {
            Some(handle) => lock(handle).is_terminal(),
            None => true,
        }
    }

    pub fn current_phase(&self) -> Option<PhaseHandle> {
        lock(&self.current_phase).clone()
    }

    /// Publish any events the current phase accumulated since the last
    /// dispatcher call (completion happens in the driver's context, which
    /// cannot publish).
    pub async fn flush_events(&self) -> ApplicationResult<()> {
        let current = lock(&self.current_phase).clone();
        if let Some(handle) = current {
            self.publish_phase_events(&handle).await?;
        }
        Ok(())
    }

    async fn supersede_current(&self) -> ApplicationResult<()> {
        let superseded = lock(&self.current_phase).clone();
        if let Some(handle) = superseded {
            lock(&handle).cancel()?;
            self.publish_phase_events(&handle).await?;
        }
        Ok(())
    }

    async fn activate_phase(
        &self,
        kind: PhaseKind,
        status_text: String,
    ) -> ApplicationResult<PhaseHandle> {
        let mut phase = TaskPhase::new(self.robot_id.clone(), kind);
        phase.activate(status_text)?;

        let handle = Arc::new(Mutex::new(phase));
        self.publish_phase_events(&handle).await?;
        Ok(handle)
    }

    async fn publish_phase_events(&self, handle: &PhaseHandle) -> ApplicationResult<()> {
        // Collect under the lock, publish outside it.
        let events = {
            let mut phase = lock(handle);
            let events = phase.uncommitted_events().to_vec();
            phase.mark_events_as_committed();
            events
        };

        for event in events {
            let envelope = EventEnvelope::new(&event, "TaskPhase", self.metadata())
                .map_err(DomainError::from)?;
            self.event_sink
                .publish(envelope)
                .await
                .map_err(ApplicationError::EventChannel)?;
        }
        Ok(())
    }

    fn metadata(&self) -> EventMetadata {
        EventMetadata {
            correlation_id: None,
            causation_id: None,
            source: format!("dispatch:{}", self.robot_id),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn completion_callback(handle: &PhaseHandle) -> CompletionCallback {
    let phase = Arc::clone(handle);
    Box::new(move || {
        // First terminal transition wins; a stale completion is a no-op.
        let _ = lock(&phase).complete();
    })
}

fn path_status_text(waypoints: &[Waypoint]) -> String {
    let first = &waypoints[0].pose.position;
    let last = &waypoints[waypoints.len() - 1].pose.position;
    format!(
        "Moving robot ({:.2}, {:.2}) -> ({:.2}, {:.2})",
        first.x, first.y, last.x, last.y
    )
}
