//! `Actor` extractor — reads the gateway-asserted identity headers.
//!
//! Identity is an external collaborator: the upstream gateway
//! authenticates the user and forwards `x-actor-id` and `x-actor-role`.
//! StudyDrive trusts these headers as given and enforces tree invariants
//! only.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_service::context::{ActorRole, RequestContext};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting user's id.
const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the acting user's role.
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extracted actor context available in handlers.
#[derive(Debug, Clone)]
pub struct Actor(pub RequestContext);

impl Actor {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for Actor {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing x-actor-id header"))?
            .parse::<Uuid>()
            .map_err(|_| AppError::authentication("Invalid x-actor-id header"))?;

        let role = match parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some("admin") => ActorRole::Admin,
            Some("student") | None => ActorRole::Student,
            Some(other) => {
                return Err(AppError::authentication(format!(
                    "Unknown actor role '{other}'"
                ))
                .into());
            }
        };

        Ok(Actor(RequestContext::new(actor_id, role)))
    }
}
