use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    daily_rewards::DailyRewardRepository, games::GameRepository, prizes::PrizeRepository,
    users::UserRepository, Mutation, ReferenceTable, Repository, RepositoryError,
};
use crate::models::{
    games::{Game, NewGame},
    prizes::{NewPrize, PrizeEntry},
    rewards::DailyRewardConfig,
    users::{NewUserRecord, User},
};

#[derive(Clone)]
pub struct PgRepository {
    conn: PgPool,
    users: UserRepository,
    prizes: PrizeRepository,
    daily_rewards: DailyRewardRepository,
    games: GameRepository,
}

impl PgRepository {
    pub fn new(conn: PgPool) -> Self {
        PgRepository {
            users: UserRepository::new(conn.clone()),
            prizes: PrizeRepository::new(conn.clone()),
            daily_rewards: DailyRewardRepository::new(conn.clone()),
            games: GameRepository::new(conn.clone()),
            conn,
        }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, RepositoryError> {
        self.users.insert_user(user).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.users.get_user_by_id(id).await
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        self.users.get_user_by_token(token).await
    }

    async fn find_user_id_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<String>, RepositoryError> {
        self.users.get_user_id_by_referral_code(code).await
    }

    async fn update_user<F, T>(&self, id: &str, mutate: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut User) -> Mutation<T> + Send,
        T: Send,
    {
        self.users.update_user(id, mutate).await
    }

    async fn top_users_by_coins(&self, limit: i64) -> Result<Vec<User>, RepositoryError> {
        self.users.top_by_coins(limit).await
    }

    async fn count_users_with_more_coins(&self, coins: i64) -> Result<i64, RepositoryError> {
        self.users.count_with_more_coins(coins).await
    }

    async fn list_prizes(&self, limit: i64) -> Result<Vec<PrizeEntry>, RepositoryError> {
        self.prizes.list_prizes(limit).await
    }

    async fn daily_reward_schedule(&self) -> Result<Vec<DailyRewardConfig>, RepositoryError> {
        self.daily_rewards.get_schedule().await
    }

    async fn list_active_games(&self) -> Result<Vec<Game>, RepositoryError> {
        self.games.list_active().await
    }

    async fn count_reference_rows(&self, table: ReferenceTable) -> Result<i64, RepositoryError> {
        // Table names come from a closed enum, never from input.
        let query = format!("SELECT COUNT(1) FROM {}", table.table_name());
        let count: i64 = sqlx::query_scalar(&query).fetch_one(&self.conn).await?;

        Ok(count)
    }

    async fn insert_games(&self, games: Vec<NewGame>) -> Result<(), RepositoryError> {
        self.games.insert_games(games).await
    }

    async fn insert_daily_rewards(
        &self,
        rewards: Vec<DailyRewardConfig>,
    ) -> Result<(), RepositoryError> {
        self.daily_rewards.insert_rewards(rewards).await
    }

    async fn insert_prizes(&self, prizes: Vec<NewPrize>) -> Result<(), RepositoryError> {
        self.prizes.insert_prizes(prizes).await
    }
}
