//! Event types for the GKAM event system
//!
//! Provides shared event definitions and the EventBus used to publish
//! session lifecycle events (consumed by the SSE stream and by tests).

mod stage_types;

pub use stage_types::IntakeStage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session lifecycle events
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// Session keys are carried as plain strings; the bus never sees session
/// contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntakeEvent {
    /// A session was created (explicitly or by its first message)
    SessionStarted {
        session_key: String,
        timestamp: DateTime<Utc>,
    },

    /// A session moved forward one stage
    StageChanged {
        session_key: String,
        old_stage: IntakeStage,
        new_stage: IntakeStage,
        timestamp: DateTime<Utc>,
    },

    /// A session was reset to the first stage
    SessionRestarted {
        session_key: String,
        /// Stage the session was in when the restart arrived
        from_stage: IntakeStage,
        timestamp: DateTime<Utc>,
    },

    /// Finalization refused because required data is missing
    FinalizeRejected {
        session_key: String,
        /// Validation failure description
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Albums and summary were produced; the session is gone
    SessionCompleted {
        session_key: String,
        album_count: usize,
        /// Total media items across all albums (lead duplicates included)
        item_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl IntakeEvent {
    /// Event type name, used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            IntakeEvent::SessionStarted { .. } => "SessionStarted",
            IntakeEvent::StageChanged { .. } => "StageChanged",
            IntakeEvent::SessionRestarted { .. } => "SessionRestarted",
            IntakeEvent::FinalizeRejected { .. } => "FinalizeRejected",
            IntakeEvent::SessionCompleted { .. } => "SessionCompleted",
        }
    }

    /// Session key the event belongs to
    pub fn session_key(&self) -> &str {
        match self {
            IntakeEvent::SessionStarted { session_key, .. }
            | IntakeEvent::StageChanged { session_key, .. }
            | IntakeEvent::SessionRestarted { session_key, .. }
            | IntakeEvent::FinalizeRejected { session_key, .. }
            | IntakeEvent::SessionCompleted { session_key, .. } => session_key,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use gkam_common::events::{EventBus, IntakeEvent};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(IntakeEvent::SessionStarted {
///     session_key: "chat-42".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "SessionStarted");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IntakeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: IntakeEvent,
    ) -> Result<usize, broadcast::error::SendError<IntakeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: IntakeEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
