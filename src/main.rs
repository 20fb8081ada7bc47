use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use fleet_command::adapters::outbound::{init_console_logger, SimulatedRobot};
use fleet_command::common::EventEnvelope;
use fleet_command::application::RobotDispatchService;
use fleet_command::domains::robot_command::{Pose, Waypoint};
use fleet_command::domains::task_lifecycle::PhaseEventActor;
use fleet_command::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting fleet-command");

    // Load configuration, falling back to defaults when no file is present
    let config = match Config::from_file("config.toml").await {
        Ok(config) => config,
        Err(_) => {
            info!("No config.toml found, using default configuration");
            Config::default()
        }
    };

    info!("Fleet: {}", config.fleet.name);

    // Fleet event channel with a consumer that logs every phase event
    let (event_sender, mut event_receiver) =
        mpsc::channel::<EventEnvelope>(config.fleet.event_channel_capacity);
    tokio::spawn(async move {
        while let Some(envelope) = event_receiver.recv().await {
            info!(
                "event: {} for phase {} from {}",
                envelope.event_type, envelope.aggregate_id, envelope.metadata.source
            );
        }
    });

    // Wire one simulated robot through a dispatcher
    let logger = init_console_logger();
    let robot = Arc::new(SimulatedRobot::new(
        "robot-1".to_string(),
        Pose::new(0.0, 0.0, 0.0),
        &config.simulation,
        logger,
    ));
    let dispatcher = RobotDispatchService::new(
        "robot-1".to_string(),
        robot.clone(),
        Arc::new(PhaseEventActor::new(event_sender)),
    );

    // Command a short timed path
    let start = chrono::Utc::now();
    let path = vec![
        Waypoint::new(Pose::new(0.0, 0.0, 0.0), start + chrono::Duration::milliseconds(200)),
        Waypoint::new(Pose::new(2.0, 0.0, 0.0), start + chrono::Duration::milliseconds(600)),
        Waypoint::new(Pose::new(4.0, 0.0, 1.57), start + chrono::Duration::milliseconds(1000)),
    ];
    dispatcher.dispatch_path(path).await?;
    info!("status: {}", dispatcher.current_status());

    // Mid-path, redirect the robot: the first phase is superseded and its
    // completion callback is discarded by the driver
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    let redirect_start = chrono::Utc::now();
    let redirect = vec![
        Waypoint::new(Pose::new(2.0, 2.0, 0.0), redirect_start + chrono::Duration::milliseconds(300)),
        Waypoint::new(Pose::new(2.0, 4.0, 0.0), redirect_start + chrono::Duration::milliseconds(700)),
    ];
    dispatcher.dispatch_path(redirect).await?;
    info!("status after redirect: {}", dispatcher.current_status());

    // Wait for the redirected path to finish
    while !dispatcher.is_idle() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    dispatcher.flush_events().await?;
    info!("status: {}", dispatcher.current_status());
    info!("robot pose: {:?}", robot.pose());

    // Send the robot to a registered dock
    dispatcher.dispatch_dock("charger_1").await?;
    info!("status: {}", dispatcher.current_status());
    while !dispatcher.is_idle() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    dispatcher.flush_events().await?;
    info!("status: {}", dispatcher.current_status());

    info!("Shutting down fleet-command");
    Ok(())
}
