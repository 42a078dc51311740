use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event_bus::EventBus;
use crate::profile::ProfileStore;

/// State that lives exactly as long as one player's visit.
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub profiles: ProfileStore,
    pub event_bus: Arc<EventBus>,
}

impl Session {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            profiles: ProfileStore::new(),
            event_bus,
        }
    }

    /// Whole minutes and seconds since the session started.
    pub fn elapsed(&self) -> (i64, i64) {
        let secs = (Utc::now() - self.started_at).num_seconds().max(0);
        (secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_empty_profile() {
        let a = Session::new(Arc::new(EventBus::default()));
        let b = Session::new(Arc::new(EventBus::default()));
        assert!(a.profiles.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.elapsed().0, 0);
    }
}
