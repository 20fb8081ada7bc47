use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub fleet: FleetConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub name: String,
    pub event_channel_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Upper bound on the random settling delay a simulated robot adds
    /// after reaching its final waypoint, in milliseconds.
    pub settle_jitter_ms: u64,
    /// Registered docking procedures: name -> duration in milliseconds.
    pub docks: HashMap<String, u64>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fleet: FleetConfig {
                name: "fleet-command".to_string(),
                event_channel_capacity: 100,
            },
            simulation: SimulationConfig {
                settle_jitter_ms: 0,
                docks: HashMap::from([
                    ("charger_1".to_string(), 1500),
                    ("loading_bay".to_string(), 2500),
                ]),
            },
        }
    }
}
