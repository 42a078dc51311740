use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

/// Events emitted while the player uses the app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ViewChanged {
        view: String,
    },
    ProfileSaved {
        name: String,
    },
    InputRejected {
        view: String,
        reason: String,
    },

    // Coach events
    CoachCallStarted {
        provider: String,
        model: String,
    },
    CoachCallCompleted {
        provider: String,
        chars: usize,
    },
    CoachCallFailed {
        provider: String,
        error: String,
    },
}

/// Event bus for component communication
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    metrics: Arc<RwLock<Metrics>>,
}

/// Accumulated metrics from events
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metrics {
    pub coach_calls: usize,
    pub coach_failures: usize,
    pub profile_saves: usize,
    pub rejected_inputs: usize,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            metrics: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub async fn emit(&self, event: Event) -> Result<()> {
        self.update_metrics(&event).await;

        // No receivers is fine
        let _ = self.sender.send(event);
        Ok(())
    }

    /// Get current metrics
    pub async fn get_metrics(&self) -> Metrics {
        self.metrics.read().await.clone()
    }

    async fn update_metrics(&self, event: &Event) {
        let mut metrics = self.metrics.write().await;

        match event {
            Event::CoachCallStarted { .. } => metrics.coach_calls += 1,
            Event::CoachCallFailed { .. } => metrics.coach_failures += 1,
            Event::ProfileSaved { .. } => metrics.profile_saves += 1,
            Event::InputRejected { .. } => metrics.rejected_inputs += 1,
            _ => {}
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();

        bus.emit(Event::ViewChanged {
            view: "Profile".to_string(),
        })
        .await
        .unwrap();

        match receiver.recv().await.unwrap() {
            Event::ViewChanged { view } => assert_eq!(view, "Profile"),
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_metrics_update() {
        let bus = EventBus::new(16);

        for event in [
            Event::CoachCallStarted {
                provider: "openai".to_string(),
                model: "gpt-4".to_string(),
            },
            Event::CoachCallFailed {
                provider: "openai".to_string(),
                error: "timeout".to_string(),
            },
            Event::ProfileSaved {
                name: "Asha".to_string(),
            },
        ] {
            bus.emit(event).await.unwrap();
        }

        let metrics = bus.get_metrics().await;
        assert_eq!(metrics.coach_calls, 1);
        assert_eq!(metrics.coach_failures, 1);
        assert_eq!(metrics.profile_saves, 1);
        assert_eq!(metrics.rejected_inputs, 0);
    }
}
