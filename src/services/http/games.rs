use axum::{extract::State, Json};

use super::{dispatch, AppState};
use crate::{
    models::games::Game,
    services::{games::GameRequest, ServiceError},
};

pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>, ServiceError> {
    let games = dispatch(&state.game_channel, "Games", |response| {
        GameRequest::ListGames { response }
    })
    .await?;

    Ok(Json(games))
}
