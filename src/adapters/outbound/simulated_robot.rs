// Simulated robot driver - in-process stand-in for a platform adapter
use crate::config::SimulationConfig;
use crate::domains::logger::DynLogger;
use crate::domains::robot_command::{CompletionCallback, Pose, RobotCommandPort, Waypoint};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One observed waypoint arrival, for inspecting driver behavior from tests
/// and monitoring. The log resets on every new path command.
#[derive(Debug, Clone)]
pub struct ArrivalRecord {
    pub waypoint_index: usize,
    pub pose: Pose,
    pub arrived_at: DateTime<Utc>,
}

struct DriverState {
    // Bumped on every command; a motion task whose generation is stale has
    // been preempted and must abandon itself without firing anything.
    generation: u64,
    pose: Pose,
    pending: Option<CompletionCallback>,
    arrivals: Vec<ArrivalRecord>,
}

/// A `RobotCommandPort` implementation that drives a simulated vehicle on
/// the Tokio clock. It honors the timed-waiting contract (never departs a
/// waypoint before its target time), hard-preempts on every new command,
/// and discards superseded completion callbacks unfired.
///
/// Travel between waypoints is instantaneous in simulation; the timed waits
/// are what matter to the coordination contract. Commands must be issued
/// from within a Tokio runtime.
pub struct SimulatedRobot {
    robot_id: String,
    docks: HashMap<String, Duration>,
    settle_jitter_ms: u64,
    logger: DynLogger,
    state: Arc<Mutex<DriverState>>,
}

impl SimulatedRobot {
    pub fn new(
        robot_id: String,
        start_pose: Pose,
        config: &SimulationConfig,
        logger: DynLogger,
    ) -> Self {
        let docks = config
            .docks
            .iter()
            .map(|(name, millis)| (name.clone(), Duration::from_millis(*millis)))
            .collect();

        Self {
            robot_id,
            docks,
            settle_jitter_ms: config.settle_jitter_ms,
            logger,
            state: Arc::new(Mutex::new(DriverState {
                generation: 0,
                pose: start_pose,
                pending: None,
                arrivals: Vec::new(),
            })),
        }
    }

    pub fn robot_id(&self) -> &str {
        &self.robot_id
    }

    /// Current simulated pose.
    pub fn pose(&self) -> Pose {
        lock_state(&self.state).pose.clone()
    }

    /// Waypoint arrivals observed since the last path command.
    pub fn arrivals(&self) -> Vec<ArrivalRecord> {
        lock_state(&self.state).arrivals.clone()
    }

    // Invalidate whatever command is in flight and install the next one.
    // The displaced callback is dropped here, unfired.
    fn preempt_and_register(&self, on_finished: Option<CompletionCallback>) -> u64 {
        let mut state = lock_state(&self.state);
        state.generation += 1;
        state.pending = on_finished;
        state.generation
    }
}

fn lock_state(state: &Arc<Mutex<DriverState>>) -> MutexGuard<'_, DriverState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// Take the callback for `generation` if it is still the live command.
fn take_if_current(state: &Arc<Mutex<DriverState>>, generation: u64) -> Option<CompletionCallback> {
    let mut state = lock_state(state);
    if state.generation != generation {
        return None;
    }
    state.pending.take()
}

impl RobotCommandPort for SimulatedRobot {
    fn follow_new_path(&self, waypoints: Vec<Waypoint>, on_finished: CompletionCallback) {
        let generation = self.preempt_and_register(Some(on_finished));
        {
            let mut state = lock_state(&self.state);
            state.arrivals.clear();
        }

        self.logger.info(&format!(
            "robot {}: following new path with {} waypoints",
            self.robot_id,
            waypoints.len()
        ));

        let state = Arc::clone(&self.state);
        let logger = Arc::clone(&self.logger);
        let robot_id = self.robot_id.clone();
        let settle_jitter_ms = self.settle_jitter_ms;

        tokio::spawn(async move {
            for (index, waypoint) in waypoints.iter().enumerate() {
                // Hold position until the fleet clock reaches the waypoint's
                // target time, even if we could get there sooner.
                if let Ok(wait) = (waypoint.time - Utc::now()).to_std() {
                    tokio::time::sleep(wait).await;
                }

                {
                    let mut state = lock_state(&state);
                    if state.generation != generation {
                        return; // superseded mid-path
                    }
                    state.pose = waypoint.pose.clone();
                    state.arrivals.push(ArrivalRecord {
                        waypoint_index: index,
                        pose: waypoint.pose.clone(),
                        arrived_at: Utc::now(),
                    });
                }
            }

            if settle_jitter_ms > 0 {
                let jitter = {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(0..=settle_jitter_ms)
                };
                tokio::time::sleep(Duration::from_millis(jitter)).await;
            }

            if let Some(on_finished) = take_if_current(&state, generation) {
                logger.info(&format!("robot {}: path finished", robot_id));
                on_finished();
            }
        });
    }

    fn stop(&self) {
        let mut state = lock_state(&self.state);
        state.generation += 1;
        if state.pending.take().is_some() {
            self.logger.info(&format!(
                "robot {}: stopped, in-flight command discarded",
                self.robot_id
            ));
        }
    }

    fn dock(&self, dock_name: &str, on_finished: CompletionCallback) {
        let duration = match self.docks.get(dock_name) {
            Some(duration) => *duration,
            None => {
                // Unknown procedure: preempt whatever was running and report
                // done right away so the coordinator never waits on a dock
                // this robot cannot perform.
                self.preempt_and_register(None);
                self.logger.warn(&format!(
                    "robot {}: unknown docking procedure '{}', completing immediately",
                    self.robot_id, dock_name
                ));
                on_finished();
                return;
            }
        };

        let generation = self.preempt_and_register(Some(on_finished));
        self.logger.info(&format!(
            "robot {}: docking at '{}'",
            self.robot_id, dock_name
        ));

        let state = Arc::clone(&self.state);
        let logger = Arc::clone(&self.logger);
        let robot_id = self.robot_id.clone();
        let dock_name = dock_name.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            if let Some(on_finished) = take_if_current(&state, generation) {
                logger.info(&format!("robot {}: docked at '{}'", robot_id, dock_name));
                on_finished();
            }
        });
    }
}
