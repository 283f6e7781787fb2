use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::{models::games, repositories::Repository};

pub enum GameRequest {
    ListGames {
        response: oneshot::Sender<Result<Vec<games::Game>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct GameRequestHandler<R> {
    repository: R,
}

impl<R: Repository> GameRequestHandler<R> {
    pub fn new(repository: R) -> Self {
        GameRequestHandler { repository }
    }

    async fn list_games(&self) -> Result<Vec<games::Game>, ServiceError> {
        Ok(self.repository.list_active_games().await?)
    }
}

#[async_trait]
impl<R: Repository> RequestHandler<GameRequest> for GameRequestHandler<R> {
    async fn handle_request(&self, request: GameRequest) {
        match request {
            GameRequest::ListGames { response } => {
                let games = self.list_games().await;
                let _ = response.send(games);
            }
        }
    }
}

pub struct GameService;

impl GameService {
    pub fn new() -> Self {
        GameService {}
    }
}

#[async_trait]
impl<R: Repository> Service<GameRequest, GameRequestHandler<R>> for GameService {}
