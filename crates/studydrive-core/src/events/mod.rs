//! Domain events emitted by StudyDrive operations.
//!
//! Events are dispatched through the [`bus::EventBus`] and consumed by
//! external layers (UI refresh, notification delivery, audit logging).
//! Emission is fire-and-forget: a mutation never fails because nobody is
//! listening.

pub mod bus;
pub mod file;
pub mod folder;
pub mod trash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use file::FileEvent;
pub use folder::FolderEvent;
pub use trash::TrashEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The actor who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A folder-related event.
    Folder(FolderEvent),
    /// A file-related event.
    File(FileEvent),
    /// A trash-lifecycle event.
    Trash(TrashEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
