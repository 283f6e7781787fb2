use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::{
    games::GameRequest, leaderboard::LeaderboardRequest, rewards::RewardRequest,
    users::UserRequest, Channels, ServiceError,
};

mod auth;
mod games;
mod leaderboard;
mod rewards;
mod users;

#[derive(Clone)]
pub struct AppState {
    user_channel: mpsc::Sender<UserRequest>,
    reward_channel: mpsc::Sender<RewardRequest>,
    leaderboard_channel: mpsc::Sender<LeaderboardRequest>,
    game_channel: mpsc::Sender<GameRequest>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ServiceError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ServiceError::Misconfigured(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Service misconfigured")
            }
            ServiceError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ServiceError::Communication(..) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (
            status,
            Json(json!({
                "error": error,
                "details": self.to_string()
            })),
        )
            .into_response()
    }
}

/// Sends a request to a service task and waits for its answer.
async fn dispatch<Req, T>(
    channel: &mpsc::Sender<Req>,
    service: &str,
    build: impl FnOnce(oneshot::Sender<Result<T, ServiceError>>) -> Req + Send,
) -> Result<T, ServiceError>
where
    Req: Send,
    T: Send,
{
    let (response_tx, response_rx) = oneshot::channel();

    channel
        .send(build(response_tx))
        .await
        .map_err(|e| ServiceError::Communication(format!("HTTP => {service}"), e.to_string()))?;

    response_rx
        .await
        .map_err(|e| ServiceError::Communication(format!("{service} => HTTP"), e.to_string()))?
}

pub fn router(channels: Channels) -> Router {
    let app_state = AppState {
        user_channel: channels.users,
        reward_channel: channels.rewards,
        leaderboard_channel: channels.leaderboard,
        game_channel: channels.games,
    };

    Router::new()
        .route("/users", post(users::create_user))
        .route("/me", get(users::me))
        .route("/spin", post(rewards::spin))
        .route("/claim-daily-reward", post(rewards::claim_daily_reward))
        .route("/add-spin", post(rewards::add_spin))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/games", get(games::list_games))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(listen: &str, channels: Channels) -> Result<(), anyhow::Error> {
    let app = router(channels);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        repositories::memory::MemoryRepository,
        rewards::RewardRules,
        seed,
        services::spawn_services,
        settings::{Avatar, Referral},
    };

    async fn app() -> Router {
        let repository = MemoryRepository::new();
        seed::seed_reference_data(&repository).await;

        let channels = spawn_services(
            repository,
            RewardRules::default(),
            Referral {
                code_length: 6,
                widened_code_length: 8,
                max_attempts: 20,
            },
            Avatar {
                url_template: "https://avatars.test/{username}.png".to_string(),
            },
        );
        router(channels)
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    fn post(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn sign_up(app: &Router, username: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "username": username }).to_string()))
            .unwrap();

        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["coins"], 100);
        assert!(body["user"].get("token").is_none());

        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn reward_routes_require_authentication() {
        let app = app().await;

        for uri in ["/spin", "/claim-daily-reward", "/add-spin"] {
            let (status, body) = call(&app, post(uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "Unauthenticated");

            let (status, _) = call(&app, post(uri, Some("bogus"))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn spins_until_the_wheel_says_no() {
        let app = app().await;
        let token = sign_up(&app, "spinner").await;

        for expected_left in [2, 1, 0] {
            let (status, body) = call(&app, post("/spin", Some(&token))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], true);
            assert_eq!(body["spins_left"], expected_left);
            assert!(body["reward"].as_i64().unwrap() >= 20);
            assert!(body["index"].is_i64());
        }

        let (status, body) = call(&app, post("/spin", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No spins left for today!");

        let (_, body) = call(&app, post("/add-spin", Some(&token))).await;
        assert_eq!(body, json!({ "success": true }));
        let (_, body) = call(&app, post("/spin", Some(&token))).await;
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn daily_reward_is_claimed_once() {
        let app = app().await;
        let token = sign_up(&app, "claimer").await;

        let (status, body) = call(&app, post("/claim-daily-reward", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["reward"], 50);
        assert_eq!(body["new_streak"], 1);
        assert_eq!(body["user"]["coins"], 150);
        assert_eq!(body["user"]["daily_streak"], 1);

        let (status, body) = call(&app, post("/claim-daily-reward", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": false, "message": "Already claimed today!" })
        );

        let (_, me) = call(&app, get("/me", Some(&token))).await;
        assert_eq!(me["coins"], 150);
    }

    #[tokio::test]
    async fn leaderboard_ranks_signed_in_viewers() {
        let app = app().await;
        let rich = sign_up(&app, "rich").await;
        sign_up(&app, "poor").await;
        call(&app, post("/claim-daily-reward", Some(&rich))).await;

        let (status, body) = call(&app, get("/leaderboard", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_rank"], 0);
        assert_eq!(body["leaderboard"][0]["username"], "rich");
        assert_eq!(body["leaderboard"][0]["rank"], 1);
        assert_eq!(body["leaderboard"][1]["rank"], 2);
        assert_eq!(
            body["leaderboard"][0]["avatar"],
            "https://avatars.test/rich.png"
        );

        let (_, body) = call(&app, get("/leaderboard", Some(&rich))).await;
        assert_eq!(body["user_rank"], 1);
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let app = app().await;
        sign_up(&app, "twin").await;

        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "username": "twin" }).to_string()))
            .unwrap();
        let (status, body) = call(&app, request).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Conflict");
    }

    #[tokio::test]
    async fn games_and_health_are_public() {
        let app = app().await;

        let (status, body) = call(&app, get("/games", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10);
        assert_eq!(body[0]["title"], "Slope");

        let response = app.clone().oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
