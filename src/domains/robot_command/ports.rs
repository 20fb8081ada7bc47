use super::types::Waypoint;

/// Completion signal for an asynchronously executed robot command.
/// A driver fires it at most once, and never fires it for a command that
/// was superseded by a later `follow_new_path`, `dock` or `stop`.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Port trait a robot platform adapter implements to receive commands from
/// the fleet coordinator (Hexagonal port). One implementation exists per
/// platform: simulated, networked hardware bridge, vendor middleware.
///
/// The surface is deliberately small. Timing, conflict resolution and
/// replanning all live upstream; a driver only has to honor preemption and
/// timed waiting. Commands for one robot are always issued from a single
/// dispatcher context, so implementations may assume serialized delivery,
/// but completion callbacks may fire from any execution context.
pub trait RobotCommandPort: Send + Sync {
    /// Have the robot follow a new path. If it is already executing a path
    /// or docking procedure it must abandon that command immediately and
    /// switch over, discarding the abandoned command's callback unfired.
    ///
    /// The robot must wait at each waypoint until the fleet clock reaches
    /// that waypoint's `time` before proceeding to the next one; the
    /// waypoint timing is what keeps vehicles out of each other's way.
    ///
    /// `on_finished` fires exactly once, after the robot has reached the
    /// final waypoint and its wait has elapsed. The call itself must return
    /// immediately; motion happens asynchronously.
    ///
    /// The caller guarantees `waypoints` is non-empty with non-decreasing
    /// times (see [`validate_path`](super::types::validate_path)).
    fn follow_new_path(&self, waypoints: Vec<Waypoint>, on_finished: CompletionCallback);

    /// Bring the robot to an immediate halt, cancelling any in-flight
    /// command and discarding its callback unfired. Idempotent: stopping an
    /// already stopped robot is a no-op. Physical settling may lag the call;
    /// that lag is the replanning layer's problem, not the driver's.
    fn stop(&self);

    /// Begin a pre-registered docking procedure. Same preemption and
    /// single-fire callback semantics as [`follow_new_path`].
    ///
    /// A driver receiving an unrecognized `dock_name`, or one with no
    /// docking capability at all, must fire `on_finished` immediately
    /// rather than hang, so the coordinator's picture of the robot stays
    /// sound.
    ///
    /// [`follow_new_path`]: Self::follow_new_path
    fn dock(&self, dock_name: &str, on_finished: CompletionCallback);
}
