//! Event types and broadcast bus for the sync pipeline
//!
//! Progress events are fan-out, best-effort: emitting with zero live
//! subscribers is normal and never an error.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Sync progress event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    /// A sync run was started
    SyncStarted {
        run_id: Uuid,
        total_phases: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A phase began executing
    PhaseStarted {
        run_id: Uuid,
        phase_index: usize,
        total_phases: usize,
        description: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A phase finished (successfully or not)
    PhaseCompleted {
        run_id: Uuid,
        phase_index: usize,
        total_phases: usize,
        description: String,
        success: bool,
        created: usize,
        updated: usize,
        skipped: usize,
        errors: usize,
        /// Overall run progress, 0.0-100.0
        percent: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The full run completed; success is the AND of all phase successes
    SyncCompleted {
        run_id: Uuid,
        success: bool,
        created: usize,
        updated: usize,
        skipped: usize,
        errors: usize,
        duration_seconds: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The run was cancelled between phases
    SyncCancelled {
        run_id: Uuid,
        phases_completed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The run aborted on an error that escaped every phase handler
    SyncFailed {
        run_id: Uuid,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SyncEvent {
    /// Event type name for SSE event framing
    pub fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::SyncStarted { .. } => "SyncStarted",
            SyncEvent::PhaseStarted { .. } => "PhaseStarted",
            SyncEvent::PhaseCompleted { .. } => "PhaseCompleted",
            SyncEvent::SyncCompleted { .. } => "SyncCompleted",
            SyncEvent::SyncCancelled { .. } => "SyncCancelled",
            SyncEvent::SyncFailed { .. } => "SyncFailed",
        }
    }
}

/// Broadcast bus carrying [`SyncEvent`]s to live observers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// Old events are dropped once the buffer fills; observers that fall
    /// behind see a `Lagged` error on their receiver, not a stalled sync.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: SyncEvent,
    ) -> Result<usize, broadcast::error::SendError<SyncEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(run_id: Uuid) -> SyncEvent {
        SyncEvent::SyncStarted {
            run_id,
            total_phases: 7,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(10);
        assert_eq!(bus.capacity(), 10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_emit_lossy_without_subscribers() {
        let bus = EventBus::new(10);
        // Must not panic or error with zero receivers
        bus.emit_lossy(started(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_emit_delivers_to_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        let run_id = Uuid::new_v4();
        bus.emit_lossy(started(run_id));

        match rx.recv().await.expect("event delivered") {
            SyncEvent::SyncStarted { run_id: got, .. } => assert_eq!(got, run_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit_lossy(started(Uuid::new_v4()));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn test_event_type_names() {
        let ev = SyncEvent::SyncCompleted {
            run_id: Uuid::new_v4(),
            success: true,
            created: 1,
            updated: 2,
            skipped: 3,
            errors: 0,
            duration_seconds: 4,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(ev.event_type(), "SyncCompleted");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_string(&started(Uuid::new_v4())).unwrap();
        assert!(json.contains("\"type\":\"SyncStarted\""));
    }
}
