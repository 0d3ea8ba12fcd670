//! Acting-user extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use treasury_shared::{AppError, types::UserId};

use crate::error::ApiError;

/// Header carrying the id of the user performing the request.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Extractor for the acting user.
///
/// Authentication happens upstream; this only reads the identity it forwards.
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub UserId);

impl ActorId {
    /// Returns the user ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<UserId>().ok())
            .map(ActorId)
            .ok_or_else(|| {
                AppError::Unauthorized("X-Actor-Id header with a user UUID is required".into())
                    .into()
            })
    }
}
