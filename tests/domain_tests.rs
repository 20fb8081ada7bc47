use chrono::{Duration, Utc};
use tokio_test::assert_ok;
use fleet_command::common::AggregateRoot;
use fleet_command::domains::robot_command::*;
use fleet_command::domains::task_lifecycle::*;

fn waypoint(x: f64, y: f64, offset_ms: i64) -> Waypoint {
    Waypoint::new(Pose::new(x, y, 0.0), Utc::now() + Duration::milliseconds(offset_ms))
}

fn follow_path_kind() -> PhaseKind {
    PhaseKind::FollowPath {
        waypoints: vec![waypoint(0.0, 0.0, 100), waypoint(2.0, 0.0, 200)],
    }
}

#[tokio::test]
async fn test_phase_creation() {
    let phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());

    assert_eq!(phase.robot_id, "robot-1");
    assert_eq!(phase.state, PhaseState::Pending);
    assert_eq!(phase.current_status(), "pending");
    assert_eq!(phase.uncommitted_events().len(), 1);

    match &phase.uncommitted_events()[0] {
        TaskPhaseEvent::PhaseAssigned { phase_id, robot_id, .. } => {
            assert_eq!(phase_id, &phase.id);
            assert_eq!(robot_id, "robot-1");
        }
        _ => panic!("Expected PhaseAssigned event"),
    }
}

#[tokio::test]
async fn test_phase_activation() {
    let mut phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());

    phase.activate("Moving robot (0.00, 0.00) -> (2.00, 0.00)".to_string()).unwrap();

    assert!(phase.is_active());
    assert_eq!(phase.current_status(), "Moving robot (0.00, 0.00) -> (2.00, 0.00)");
    assert_eq!(phase.uncommitted_events().len(), 2);
}

#[tokio::test]
async fn test_activating_twice_is_rejected() {
    let mut phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    phase.activate("moving".to_string()).unwrap();

    let result = phase.activate("moving again".to_string());
    assert!(result.is_err());
    assert_eq!(phase.current_status(), "moving");
}

#[tokio::test]
async fn test_phase_completion() {
    let mut phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    phase.activate("moving".to_string()).unwrap();

    phase.complete().unwrap();

    assert!(phase.is_terminal());
    assert_eq!(phase.state, PhaseState::Finished);
    assert_eq!(phase.current_status(), "finished");
}

#[tokio::test]
async fn test_completing_a_pending_phase_is_rejected() {
    let mut phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    assert!(phase.complete().is_err());
    assert_eq!(phase.state, PhaseState::Pending);
}

#[tokio::test]
async fn test_cancel_from_pending_and_active() {
    let mut pending = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    pending.cancel().unwrap();
    assert_eq!(pending.state, PhaseState::Cancelled);
    assert_eq!(pending.current_status(), "cancelled");

    let mut active = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    active.activate("moving".to_string()).unwrap();
    active.cancel().unwrap();
    assert_eq!(active.state, PhaseState::Cancelled);
}

#[tokio::test]
async fn test_terminal_transition_is_monotonic() {
    // First terminal transition wins; late signals change nothing.
    let mut phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    phase.activate("moving".to_string()).unwrap();
    phase.cancel().unwrap();

    let events_before = phase.uncommitted_events().len();
    phase.complete().unwrap();
    phase.complete().unwrap();
    phase.cancel().unwrap();
    phase.fail("late error".to_string()).unwrap();

    assert_eq!(phase.state, PhaseState::Cancelled);
    assert_eq!(phase.current_status(), "cancelled");
    assert_eq!(phase.uncommitted_events().len(), events_before);

    // And the other way around: finished stays finished.
    let mut phase = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    phase.activate("moving".to_string()).unwrap();
    phase.complete().unwrap();
    phase.cancel().unwrap();
    assert_eq!(phase.state, PhaseState::Finished);
}

#[tokio::test]
async fn test_phase_failure() {
    let mut phase = TaskPhase::new("robot-1".to_string(), PhaseKind::Dock {
        dock_name: "charger_1".to_string(),
    });
    phase.activate("Docking at 'charger_1'".to_string()).unwrap();

    phase.fail("drive fault".to_string()).unwrap();

    assert_eq!(phase.current_status(), "failed: drive fault");
    assert!(phase.is_terminal());
}

#[tokio::test]
async fn test_event_replay_rebuilds_state() {
    let mut original = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    original.activate("moving".to_string()).unwrap();
    original.complete().unwrap();
    let history: Vec<TaskPhaseEvent> = original.uncommitted_events().to_vec();

    let mut replayed = TaskPhase::new("robot-1".to_string(), PhaseKind::Stop);
    for event in &history {
        replayed.apply(event).unwrap();
    }

    assert_eq!(replayed.id, original.id);
    assert_eq!(replayed.state, PhaseState::Finished);
    assert_eq!(replayed.version, history.len() as u64);
}

#[tokio::test]
async fn test_validate_path_rejects_empty() {
    assert!(validate_path(&[]).is_err());
}

#[tokio::test]
async fn test_validate_path_rejects_time_regression() {
    let path = vec![waypoint(0.0, 0.0, 500), waypoint(1.0, 0.0, 200)];
    assert!(validate_path(&path).is_err());
}

#[tokio::test]
async fn test_validate_path_accepts_monotonic_times() {
    let path = vec![
        waypoint(0.0, 0.0, 100),
        waypoint(1.0, 0.0, 300),
        waypoint(2.0, 0.0, 300), // equal times are allowed
        waypoint(3.0, 0.0, 600),
    ];
    tokio_test::assert_ok!(validate_path(&path));
}

#[tokio::test]
async fn test_projection_counts_phase_events() {
    let mut projection = RobotPhaseProjection::new("robot-1".to_string());

    let mut finished = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    finished.activate("moving".to_string()).unwrap();
    finished.complete().unwrap();
    let mut cancelled = TaskPhase::new("robot-1".to_string(), follow_path_kind());
    cancelled.cancel().unwrap();

    for event in finished.uncommitted_events().iter().chain(cancelled.uncommitted_events()) {
        projection.apply(event);
    }

    assert_eq!(projection.assigned_count, 2);
    assert_eq!(projection.finished_count, 1);
    assert_eq!(projection.cancelled_count, 1);
    assert_eq!(projection.failed_count, 0);
    assert_eq!(projection.last_status.as_deref(), Some("moving"));
}
