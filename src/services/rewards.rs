use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::{
    models::users,
    repositories::{Mutation, Repository},
    rewards::{
        spin::{self, SpinOutcome},
        streak::{self, ClaimOutcome},
        RewardRules,
    },
};

pub enum DailyClaim {
    Claimed {
        reward: i64,
        new_streak: i32,
        user: users::User,
    },
    AlreadyClaimed,
}

pub enum RewardRequest {
    Spin {
        user_id: String,
        response: oneshot::Sender<Result<SpinOutcome, ServiceError>>,
    },
    ClaimDailyReward {
        user_id: String,
        response: oneshot::Sender<Result<DailyClaim, ServiceError>>,
    },
    AddSpin {
        user_id: String,
        response: oneshot::Sender<Result<i32, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct RewardRequestHandler<R> {
    repository: R,
    rules: RewardRules,
}

impl<R: Repository> RewardRequestHandler<R> {
    pub fn new(repository: R, rules: RewardRules) -> Self {
        RewardRequestHandler { repository, rules }
    }

    async fn spin(&self, user_id: &str) -> Result<SpinOutcome, ServiceError> {
        let prizes = self
            .repository
            .list_prizes(self.rules.prize_table_limit)
            .await?;
        let now = Utc::now();
        let draw = spin::draw(&mut rand::thread_rng());
        let rules = &self.rules;

        let outcome = self
            .repository
            .update_user(user_id, |user| {
                let outcome = spin::resolve_spin(user, &prizes, now, draw, rules);
                if matches!(outcome, Ok(SpinOutcome::Won { .. })) {
                    Mutation::Save(outcome)
                } else {
                    Mutation::Discard(outcome)
                }
            })
            .await?
            .map_err(|e| ServiceError::Misconfigured(e.to_string()))?;

        match &outcome {
            SpinOutcome::Won {
                reward, prize_id, ..
            } => log::info!("User {user_id} won {reward} coins from prize {prize_id}."),
            SpinOutcome::NoSpinsLeft => log::info!("User {user_id} has no spins left today."),
        }

        Ok(outcome)
    }

    async fn claim_daily_reward(&self, user_id: &str) -> Result<DailyClaim, ServiceError> {
        let schedule = self.repository.daily_reward_schedule().await?;
        let now = Utc::now();
        let rules = &self.rules;

        let (outcome, user) = self
            .repository
            .update_user(user_id, |user| match streak::resolve_claim(user, &schedule, now, rules) {
                claimed @ ClaimOutcome::Claimed { .. } => {
                    user.updated_at = now;
                    Mutation::Save((claimed, user.clone()))
                }
                ClaimOutcome::AlreadyClaimed => {
                    Mutation::Discard((ClaimOutcome::AlreadyClaimed, user.clone()))
                }
            })
            .await?;

        match outcome {
            ClaimOutcome::Claimed { reward, new_streak } => {
                log::info!("User {user_id} claimed {reward} coins on streak day {new_streak}.");
                Ok(DailyClaim::Claimed {
                    reward,
                    new_streak,
                    user,
                })
            }
            ClaimOutcome::AlreadyClaimed => {
                log::info!("User {user_id} already claimed today.");
                Ok(DailyClaim::AlreadyClaimed)
            }
        }
    }

    async fn add_spin(&self, user_id: &str) -> Result<i32, ServiceError> {
        let spins_left = self
            .repository
            .update_user(user_id, |user| {
                user.daily_spins_left += 1;
                Mutation::Save(user.daily_spins_left)
            })
            .await?;

        Ok(spins_left)
    }
}

#[async_trait]
impl<R: Repository> RequestHandler<RewardRequest> for RewardRequestHandler<R> {
    async fn handle_request(&self, request: RewardRequest) {
        match request {
            RewardRequest::Spin { user_id, response } => {
                let result = self.spin(&user_id).await;
                if let Err(e) = &result {
                    log::error!("Spin failed for user {}: {}", user_id, e);
                }
                let _ = response.send(result);
            }
            RewardRequest::ClaimDailyReward { user_id, response } => {
                let result = self.claim_daily_reward(&user_id).await;
                if let Err(e) = &result {
                    log::error!("Daily claim failed for user {}: {}", user_id, e);
                }
                let _ = response.send(result);
            }
            RewardRequest::AddSpin { user_id, response } => {
                let result = self.add_spin(&user_id).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct RewardService;

impl RewardService {
    pub fn new() -> Self {
        RewardService {}
    }
}

#[async_trait]
impl<R: Repository> Service<RewardRequest, RewardRequestHandler<R>> for RewardService {}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        models::users::NewUserRecord, repositories::memory::MemoryRepository, seed,
    };

    async fn setup(seeded: bool) -> (RewardRequestHandler<MemoryRepository>, MemoryRepository) {
        let repository = MemoryRepository::new();
        if seeded {
            seed::seed_reference_data(&repository).await;
        }

        let now = Utc::now();
        repository
            .insert_user(NewUserRecord {
                id: "u1".to_string(),
                username: "alice".to_string(),
                email: None,
                avatar_url: String::new(),
                token: "t1".to_string(),
                referral_code: "AAAAAA".to_string(),
                referred_by: None,
                coins: 100,
                daily_spins_left: 3,
                daily_streak: 0,
                level: 1,
                last_spin_date: now - Duration::days(1),
                created_at: now,
            })
            .await
            .unwrap();

        (
            RewardRequestHandler::new(repository.clone(), RewardRules::default()),
            repository,
        )
    }

    #[tokio::test]
    async fn spins_run_out_after_the_daily_allotment() {
        let (handler, repository) = setup(true).await;

        for expected_left in [2, 1, 0] {
            match handler.spin("u1").await.unwrap() {
                SpinOutcome::Won { spins_left, .. } => assert_eq!(spins_left, expected_left),
                SpinOutcome::NoSpinsLeft => panic!("expected a win"),
            }
        }
        let coins_before = repository.get_user("u1").await.unwrap().unwrap().coins;

        assert_eq!(handler.spin("u1").await.unwrap(), SpinOutcome::NoSpinsLeft);
        let user = repository.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.coins, coins_before);
        assert_eq!(user.daily_spins_left, 0);
        assert!(user.coins >= 100 + 3 * 20);
    }

    #[tokio::test]
    async fn empty_prize_table_is_a_hard_error() {
        let (handler, repository) = setup(false).await;

        let err = handler.spin("u1").await.unwrap_err();

        assert!(matches!(err, ServiceError::Misconfigured(_)));
        assert_eq!(repository.get_user("u1").await.unwrap().unwrap().coins, 100);
    }

    #[tokio::test]
    async fn daily_claim_is_idempotent_within_a_day() {
        let (handler, repository) = setup(true).await;

        match handler.claim_daily_reward("u1").await.unwrap() {
            DailyClaim::Claimed {
                reward,
                new_streak,
                user,
            } => {
                assert_eq!(reward, 50);
                assert_eq!(new_streak, 1);
                assert_eq!(user.coins, 150);
            }
            DailyClaim::AlreadyClaimed => panic!("first claim must succeed"),
        }

        assert!(matches!(
            handler.claim_daily_reward("u1").await.unwrap(),
            DailyClaim::AlreadyClaimed
        ));
        let user = repository.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.coins, 150);
        assert_eq!(user.daily_streak, 1);
    }

    #[tokio::test]
    async fn claim_without_schedule_pays_the_fallback() {
        let (handler, _) = setup(false).await;

        match handler.claim_daily_reward("u1").await.unwrap() {
            DailyClaim::Claimed { reward, .. } => assert_eq!(reward, 50),
            DailyClaim::AlreadyClaimed => panic!("first claim must succeed"),
        }
    }

    #[tokio::test]
    async fn added_spins_stack_on_the_current_day() {
        let (handler, _) = setup(true).await;
        handler.spin("u1").await.unwrap();

        assert_eq!(handler.add_spin("u1").await.unwrap(), 3);
        assert_eq!(handler.add_spin("u1").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn concurrent_spins_never_overspend() {
        let (handler, repository) = setup(true).await;

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let handler = handler.clone();
                tokio::spawn(async move { handler.spin("u1").await.unwrap() })
            })
            .collect();

        let mut wins = 0;
        for task in tasks {
            if matches!(task.await.unwrap(), SpinOutcome::Won { .. }) {
                wins += 1;
            }
        }

        assert_eq!(wins, 3);
        assert_eq!(
            repository.get_user("u1").await.unwrap().unwrap().daily_spins_left,
            0
        );
    }

    #[tokio::test]
    async fn unknown_users_are_not_found() {
        let (handler, _) = setup(true).await;

        assert!(matches!(
            handler.spin("ghost").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
