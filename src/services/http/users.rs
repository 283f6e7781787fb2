use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::{auth::AuthUser, dispatch, AppState};
use crate::{
    models::users,
    services::{users::UserRequest, ServiceError},
};

pub async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<users::NewUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = dispatch(&state.user_channel, "Users", |response| {
        UserRequest::CreateUser { new_user, response }
    })
    .await?;

    let token = user.token.clone();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": user,
            "token": token
        })),
    ))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<users::User> {
    Json(user)
}
