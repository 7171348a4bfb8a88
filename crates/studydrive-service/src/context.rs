//! Request context carrying the authenticated actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The actor's capability level, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A student operating on their own tree.
    Student,
    /// An administrator; may operate on any tree and trigger sweeps.
    Admin,
}

/// Context for the current request.
///
/// Identity is an external collaborator: the gateway supplies the actor id
/// and role, and StudyDrive trusts them as given. Services enforce tree
/// invariants, not access policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub actor_id: Uuid,
    /// The actor's capability level.
    pub role: ActorRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(actor_id: Uuid, role: ActorRole) -> Self {
        Self {
            actor_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current actor is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, ActorRole::Admin)
    }
}
