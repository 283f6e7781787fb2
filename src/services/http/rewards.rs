use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::{auth::AuthUser, dispatch, AppState};
use crate::{
    rewards::spin::SpinOutcome,
    services::{
        rewards::{DailyClaim, RewardRequest},
        ServiceError,
    },
};

pub async fn spin(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ServiceError> {
    let outcome = dispatch(&state.reward_channel, "Rewards", |response| {
        RewardRequest::Spin {
            user_id: user.id,
            response,
        }
    })
    .await?;

    let body = match outcome {
        SpinOutcome::Won {
            reward,
            spins_left,
            prize_id,
        } => json!({
            "success": true,
            "reward": reward,
            "spins_left": spins_left,
            "index": prize_id
        }),
        SpinOutcome::NoSpinsLeft => json!({
            "success": false,
            "message": "No spins left for today!"
        }),
    };

    Ok(Json(body))
}

pub async fn claim_daily_reward(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ServiceError> {
    let claim = dispatch(&state.reward_channel, "Rewards", |response| {
        RewardRequest::ClaimDailyReward {
            user_id: user.id,
            response,
        }
    })
    .await?;

    let body = match claim {
        DailyClaim::Claimed {
            reward,
            new_streak,
            user,
        } => json!({
            "success": true,
            "reward": reward,
            "new_streak": new_streak,
            "user": user
        }),
        DailyClaim::AlreadyClaimed => json!({
            "success": false,
            "message": "Already claimed today!"
        }),
    };

    Ok(Json(body))
}

pub async fn add_spin(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ServiceError> {
    dispatch(&state.reward_channel, "Rewards", |response| {
        RewardRequest::AddSpin {
            user_id: user.id,
            response,
        }
    })
    .await?;

    Ok(Json(json!({ "success": true })))
}
