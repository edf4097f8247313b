use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use usermanager_shared::types::User;
use uuid::Uuid;

use super::{ApiError, AppState};

/// Header carrying the id of the acting user.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The user performing a request, loaded from [`ACTOR_HEADER`].
#[derive(Debug, Clone)]
pub struct Actor(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| ApiError::unauthorized(format!("missing {ACTOR_HEADER} header")))?
            .to_str()
            .map_err(|_| ApiError::unauthorized(format!("malformed {ACTOR_HEADER} header")))?;
        let user_id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::unauthorized(format!("malformed {ACTOR_HEADER} header")))?;

        let user = state
            .service
            .get_user(&user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("unknown acting user"))?;
        Ok(Actor(user))
    }
}
