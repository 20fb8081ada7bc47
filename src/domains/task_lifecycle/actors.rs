// Task lifecycle actors - phase event forwarding
use crate::common::{EventEnvelope, EventSink};
use tokio::sync::mpsc;

/// Forwards phase event envelopes onto the fleet's in-process event channel,
/// where monitoring or audit consumers pick them up.
pub struct PhaseEventActor {
    event_sender: mpsc::Sender<EventEnvelope>,
}

impl PhaseEventActor {
    pub fn new(event_sender: mpsc::Sender<EventEnvelope>) -> Self {
        Self { event_sender }
    }
}

#[async_trait::async_trait]
impl EventSink for PhaseEventActor {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), String> {
        self.event_sender
            .send(envelope)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}
