//! Actor identity extractor.
//!
//! Session issuance and verification live upstream (reverse proxy or
//! gateway); by the time a request reaches this service the resolver has
//! translated the session into two trusted headers:
//!
//! - `x-actor-id`: the numeric user ID performing the request
//! - `x-actor-role`: optional; `admin` grants cross-owner edit rights
//!
//! A request without a valid `x-actor-id` is unauthenticated and rejected
//! with 401 before any handler logic runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use leadbook_core::error::CoreError;
use leadbook_core::types::DbId;

use crate::error::AppError;

/// Header carrying the resolved user ID.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the resolved role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: DbId,
    pub is_admin: bool,
}

impl Actor {
    /// Owner-or-admin rule for mutating a record owned by `owner_id`.
    pub fn may_edit(&self, owner_id: DbId) -> bool {
        self.is_admin || self.id == owner_id
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<DbId>().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing or invalid actor identity".to_string(),
                ))
            })?;

        let is_admin = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"));

        Ok(Actor { id, is_admin })
    }
}
