use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::presentation::handlers::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Caller identity as asserted by the authentication layer in front of us.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: Option<String>,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let raw_id = header(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing user identity".to_string()))?;
        let id = UserId::parse(&raw_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(Self {
            id,
            name: header(USER_NAME_HEADER),
        })
    }
}
