use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};

use super::{Mutation, ReferenceTable, Repository, RepositoryError};
use crate::models::{
    games::{Game, NewGame},
    prizes::{NewPrize, PrizeEntry},
    rewards::DailyRewardConfig,
    users::{NewUserRecord, User},
};

#[derive(Default)]
struct Tables {
    users: DashMap<String, User>,
    // Unique indexes: value -> user id.
    usernames: DashMap<String, String>,
    referral_codes: DashMap<String, String>,
    tokens: DashMap<String, String>,
    prizes: DashMap<i64, PrizeEntry>,
    daily_rewards: DashMap<i32, DailyRewardConfig>,
    games: DashMap<i64, Game>,
    next_id: AtomicI64,
}

impl Tables {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// In-process store. Each user record is guarded by its dashmap shard lock,
/// which is held for the whole of an `update_user` closure.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(
        index: &DashMap<String, String>,
        key: &str,
        user_id: &str,
        field: &str,
    ) -> Result<(), RepositoryError> {
        match index.entry(key.to_string()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(field.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user_id.to_string());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn insert_user(&self, user: NewUserRecord) -> Result<User, RepositoryError> {
        let tables = &self.tables;

        Self::reserve(&tables.usernames, &user.username, &user.id, "username")?;
        if let Err(e) = Self::reserve(
            &tables.referral_codes,
            &user.referral_code,
            &user.id,
            "referral_code",
        ) {
            tables.usernames.remove(&user.username);
            return Err(e);
        }
        if let Err(e) = Self::reserve(&tables.tokens, &user.token, &user.id, "token") {
            tables.usernames.remove(&user.username);
            tables.referral_codes.remove(&user.referral_code);
            return Err(e);
        }

        let user = user.into_user();
        tables.users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.users.get(id).map(|user| user.clone()))
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let Some(id) = self.tables.tokens.get(token).map(|id| id.clone()) else {
            return Ok(None);
        };

        Ok(self.tables.users.get(&id).map(|user| user.clone()))
    }

    async fn find_user_id_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self.tables.referral_codes.get(code).map(|id| id.clone()))
    }

    async fn update_user<F, T>(&self, id: &str, mutate: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut User) -> Mutation<T> + Send,
        T: Send,
    {
        let mut stored = self
            .tables
            .users
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;

        let mut draft = stored.clone();
        match mutate(&mut draft) {
            Mutation::Save(value) => {
                draft.updated_at = Utc::now();
                *stored = draft;
                Ok(value)
            }
            Mutation::Discard(value) => Ok(value),
        }
    }

    async fn top_users_by_coins(&self, limit: i64) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self
            .tables
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| b.coins.cmp(&a.coins).then_with(|| a.id.cmp(&b.id)));
        users.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(users)
    }

    async fn count_users_with_more_coins(&self, coins: i64) -> Result<i64, RepositoryError> {
        let count = self
            .tables
            .users
            .iter()
            .filter(|entry| entry.value().coins > coins)
            .count();

        Ok(count as i64)
    }

    async fn list_prizes(&self, limit: i64) -> Result<Vec<PrizeEntry>, RepositoryError> {
        let mut prizes: Vec<PrizeEntry> = self
            .tables
            .prizes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        prizes.sort_by_key(|prize| prize.id);
        prizes.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(prizes)
    }

    async fn daily_reward_schedule(&self) -> Result<Vec<DailyRewardConfig>, RepositoryError> {
        let mut schedule: Vec<DailyRewardConfig> = self
            .tables
            .daily_rewards
            .iter()
            .map(|entry| *entry.value())
            .collect();
        schedule.sort_by_key(|config| config.day_number);

        Ok(schedule)
    }

    async fn list_active_games(&self) -> Result<Vec<Game>, RepositoryError> {
        let mut games: Vec<Game> = self
            .tables
            .games
            .iter()
            .filter(|entry| entry.value().is_active)
            .map(|entry| entry.value().clone())
            .collect();
        games.sort_by_key(|game| game.id);

        Ok(games)
    }

    async fn count_reference_rows(&self, table: ReferenceTable) -> Result<i64, RepositoryError> {
        let count = match table {
            ReferenceTable::Games => self.tables.games.len(),
            ReferenceTable::DailyRewards => self.tables.daily_rewards.len(),
            ReferenceTable::Prizes => self.tables.prizes.len(),
        };

        Ok(count as i64)
    }

    async fn insert_games(&self, games: Vec<NewGame>) -> Result<(), RepositoryError> {
        for game in games {
            let id = self.tables.next_id();
            self.tables.games.insert(
                id,
                Game {
                    id,
                    title: game.title,
                    url: game.url,
                    image: game.image,
                    orientation: game.orientation,
                    category: game.category,
                    description: game.description,
                    is_active: game.is_active,
                },
            );
        }

        Ok(())
    }

    async fn insert_daily_rewards(
        &self,
        rewards: Vec<DailyRewardConfig>,
    ) -> Result<(), RepositoryError> {
        for reward in rewards {
            match self.tables.daily_rewards.entry(reward.day_number) {
                Entry::Occupied(_) => {
                    return Err(RepositoryError::Conflict("day_number".to_string()))
                }
                Entry::Vacant(slot) => {
                    slot.insert(reward);
                }
            }
        }

        Ok(())
    }

    async fn insert_prizes(&self, prizes: Vec<NewPrize>) -> Result<(), RepositoryError> {
        for prize in prizes {
            let id = self.tables.next_id();
            self.tables.prizes.insert(
                id,
                PrizeEntry {
                    id,
                    label: prize.label,
                    value: prize.value,
                    probability: prize.probability,
                },
            );
        }

        Ok(())
    }
}
