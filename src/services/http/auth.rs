use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::{dispatch, AppState};
use crate::{
    models::users::User,
    services::{users::UserRequest, ServiceError},
};

/// The signed-in user. Rejects the request with 401 when absent.
pub struct AuthUser(pub User);

/// The signed-in user, if any. Unknown tokens count as anonymous.
pub struct MaybeAuthUser(pub Option<User>);

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Unauthenticated",
            "details": "A valid session token is required."
        })),
    )
        .into_response()
}

/// Accepts both `Bearer <token>` and a bare token.
fn session_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    (!token.is_empty()).then(|| token.to_string())
}

async fn lookup(state: &AppState, parts: &Parts) -> Result<Option<User>, ServiceError> {
    let Some(token) = session_token(parts) else {
        return Ok(None);
    };

    dispatch(&state.user_channel, "Users", |response| {
        UserRequest::Authenticate { token, response }
    })
    .await
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match lookup(state, parts).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(unauthorized()),
            Err(e) => Err(e.into_response()),
        }
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match lookup(state, parts).await {
            Ok(user) => Ok(MaybeAuthUser(user)),
            Err(e) => Err(e.into_response()),
        }
    }
}
