use async_trait::async_trait;

use crate::models::{
    games::{Game, NewGame},
    prizes::{NewPrize, PrizeEntry},
    rewards::DailyRewardConfig,
    users::{NewUserRecord, User},
};

pub mod daily_rewards;
pub mod games;
pub mod memory;
pub mod postgres;
pub mod prizes;
pub mod users;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,
    #[error("Duplicate value for {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_error) = e.as_database_error() {
            if db_error.is_unique_violation() {
                let field = db_error
                    .constraint()
                    .map(|name| {
                        name.trim_start_matches("users_")
                            .trim_end_matches("_key")
                            .to_string()
                    })
                    .unwrap_or_else(|| "unique field".to_string());
                return RepositoryError::Conflict(field);
            }
        }

        RepositoryError::Database(e.to_string())
    }
}

/// Result of a read-modify-write closure passed to [`Repository::update_user`].
pub enum Mutation<T> {
    /// Persist the modified record, then return the value.
    Save(T),
    /// Leave the stored record untouched.
    Discard(T),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceTable {
    Games,
    DailyRewards,
    Prizes,
}

impl ReferenceTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            ReferenceTable::Games => "games",
            ReferenceTable::DailyRewards => "daily_rewards_config",
            ReferenceTable::Prizes => "spin_wheel_prizes",
        }
    }
}

/// Storage collaborator for the reward services.
///
/// `update_user` must run its closure and the resulting write atomically with
/// respect to any other `update_user` call on the same record. The reward
/// logic takes no locks of its own and relies on that guarantee.
#[async_trait]
pub trait Repository: Clone + Send + Sync + 'static {
    /// Inserts a new account. Duplicate usernames, referral codes or tokens
    /// fail with [`RepositoryError::Conflict`].
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, RepositoryError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_user_id_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<String>, RepositoryError>;

    async fn update_user<F, T>(&self, id: &str, mutate: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut User) -> Mutation<T> + Send,
        T: Send;

    /// Users ordered by coins descending, ties by id.
    async fn top_users_by_coins(&self, limit: i64) -> Result<Vec<User>, RepositoryError>;

    async fn count_users_with_more_coins(&self, coins: i64) -> Result<i64, RepositoryError>;

    /// Prizes in wheel order.
    async fn list_prizes(&self, limit: i64) -> Result<Vec<PrizeEntry>, RepositoryError>;

    async fn daily_reward_schedule(&self) -> Result<Vec<DailyRewardConfig>, RepositoryError>;

    async fn list_active_games(&self) -> Result<Vec<Game>, RepositoryError>;

    async fn count_reference_rows(&self, table: ReferenceTable) -> Result<i64, RepositoryError>;

    async fn insert_games(&self, games: Vec<NewGame>) -> Result<(), RepositoryError>;

    async fn insert_daily_rewards(
        &self,
        rewards: Vec<DailyRewardConfig>,
    ) -> Result<(), RepositoryError>;

    async fn insert_prizes(&self, prizes: Vec<NewPrize>) -> Result<(), RepositoryError>;
}
