use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    repositories::{Repository, RepositoryError},
    rewards::RewardRules,
    settings::{Avatar, Referral, Settings},
};

pub mod games;
pub mod http;
pub mod leaderboard;
pub mod rewards;
pub mod users;

const CHANNEL_CAPACITY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Misconfigured: {0}")]
    Misconfigured(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ServiceError::NotFound("User not found.".to_string()),
            RepositoryError::Conflict(field) => {
                ServiceError::Conflict(format!("The {field} is already taken."))
            }
            RepositoryError::Database(message) => ServiceError::Database(message),
        }
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Senders for every running service. Cloned into the HTTP state.
#[derive(Clone)]
pub struct Channels {
    pub users: mpsc::Sender<users::UserRequest>,
    pub rewards: mpsc::Sender<rewards::RewardRequest>,
    pub leaderboard: mpsc::Sender<leaderboard::LeaderboardRequest>,
    pub games: mpsc::Sender<games::GameRequest>,
}

pub fn spawn_services<R: Repository>(
    repository: R,
    rules: RewardRules,
    referral: Referral,
    avatar: Avatar,
) -> Channels {
    let (user_tx, mut user_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (reward_tx, mut reward_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (leaderboard_tx, mut leaderboard_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (game_tx, mut game_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let mut user_service = users::UserService::new();
    let mut reward_service = rewards::RewardService::new();
    let mut leaderboard_service = leaderboard::LeaderboardService::new();
    let mut game_service = games::GameService::new();

    log::info!("Starting user service.");
    let user_handler =
        users::UserRequestHandler::new(repository.clone(), rules.clone(), referral, avatar);
    tokio::spawn(async move {
        user_service.run(user_handler, &mut user_rx).await;
    });

    log::info!("Starting reward service.");
    let reward_handler = rewards::RewardRequestHandler::new(repository.clone(), rules.clone());
    tokio::spawn(async move {
        reward_service.run(reward_handler, &mut reward_rx).await;
    });

    log::info!("Starting leaderboard service.");
    let leaderboard_handler = leaderboard::LeaderboardRequestHandler::new(repository.clone(), rules);
    tokio::spawn(async move {
        leaderboard_service
            .run(leaderboard_handler, &mut leaderboard_rx)
            .await;
    });

    log::info!("Starting game service.");
    let game_handler = games::GameRequestHandler::new(repository);
    tokio::spawn(async move {
        game_service.run(game_handler, &mut game_rx).await;
    });

    Channels {
        users: user_tx,
        rewards: reward_tx,
        leaderboard: leaderboard_tx,
        games: game_tx,
    }
}

pub async fn start_services<R: Repository>(
    repository: R,
    settings: Settings,
) -> Result<(), anyhow::Error> {
    let channels = spawn_services(
        repository,
        settings.rewards,
        settings.referral,
        settings.avatar,
    );

    log::info!("Starting HTTP server.");
    http::start_http_server(&settings.server.listen, channels).await
}
