use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::{
    models::{leaderboard::Leaderboard, users},
    repositories::Repository,
    rewards::{rank, RewardRules},
};

pub enum LeaderboardRequest {
    GetLeaderboard {
        viewer: Option<users::User>,
        response: oneshot::Sender<Result<Leaderboard, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct LeaderboardRequestHandler<R> {
    repository: R,
    rules: RewardRules,
}

impl<R: Repository> LeaderboardRequestHandler<R> {
    pub fn new(repository: R, rules: RewardRules) -> Self {
        LeaderboardRequestHandler { repository, rules }
    }

    /// The viewer's rank is counted over every user, so it is correct even
    /// when the viewer is far outside the returned window.
    async fn get_leaderboard(
        &self,
        viewer: Option<users::User>,
    ) -> Result<Leaderboard, ServiceError> {
        let top = self
            .repository
            .top_users_by_coins(self.rules.leaderboard_size)
            .await?;

        let user_rank = match viewer {
            Some(user) => {
                let greater = self
                    .repository
                    .count_users_with_more_coins(user.coins)
                    .await?;
                rank::rank_from_greater_count(greater)
            }
            None => 0,
        };

        Ok(Leaderboard {
            leaderboard: rank::rank_window(&top),
            user_rank,
        })
    }
}

#[async_trait]
impl<R: Repository> RequestHandler<LeaderboardRequest> for LeaderboardRequestHandler<R> {
    async fn handle_request(&self, request: LeaderboardRequest) {
        match request {
            LeaderboardRequest::GetLeaderboard { viewer, response } => {
                let leaderboard = self.get_leaderboard(viewer).await;
                if let Err(e) = &leaderboard {
                    log::error!("Failed to build leaderboard: {}", e);
                }
                let _ = response.send(leaderboard);
            }
        }
    }
}

pub struct LeaderboardService;

impl LeaderboardService {
    pub fn new() -> Self {
        LeaderboardService {}
    }
}

#[async_trait]
impl<R: Repository> Service<LeaderboardRequest, LeaderboardRequestHandler<R>>
    for LeaderboardService
{
}
