use axum::{extract::State, Json};

use super::{auth::MaybeAuthUser, dispatch, AppState};
use crate::{
    models::leaderboard::Leaderboard,
    services::{leaderboard::LeaderboardRequest, ServiceError},
};

pub async fn get_leaderboard(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Leaderboard>, ServiceError> {
    let leaderboard = dispatch(&state.leaderboard_channel, "Leaderboard", |response| {
        LeaderboardRequest::GetLeaderboard { viewer, response }
    })
    .await?;

    Ok(Json(leaderboard))
}
