use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::{
    models::users,
    repositories::Repository,
    rewards::{
        account::{self, ReferralError},
        RewardRules,
    },
    settings::{Avatar, Referral},
};

pub enum UserRequest {
    CreateUser {
        new_user: users::NewUser,
        response: oneshot::Sender<Result<users::User, ServiceError>>,
    },
    Authenticate {
        token: String,
        response: oneshot::Sender<Result<Option<users::User>, ServiceError>>,
    },
}

impl From<ReferralError> for ServiceError {
    fn from(e: ReferralError) -> Self {
        match e {
            ReferralError::Exhausted { .. } => ServiceError::Misconfigured(e.to_string()),
            ReferralError::Repository(e) => e.into(),
        }
    }
}

#[derive(Clone)]
pub struct UserRequestHandler<R> {
    repository: R,
    rules: RewardRules,
    referral: Referral,
    avatar: Avatar,
}

impl<R: Repository> UserRequestHandler<R> {
    pub fn new(repository: R, rules: RewardRules, referral: Referral, avatar: Avatar) -> Self {
        UserRequestHandler {
            repository,
            rules,
            referral,
            avatar,
        }
    }

    async fn resolve_referrer(&self, code: Option<&str>) -> Result<Option<String>, ServiceError> {
        let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
            return Ok(None);
        };

        let referrer = self
            .repository
            .find_user_id_by_referral_code(&code.to_uppercase())
            .await?;
        if referrer.is_none() {
            log::info!("Ignoring unknown referral code {}.", code);
        }

        Ok(referrer)
    }

    async fn create_user(&self, new_user: users::NewUser) -> Result<users::User, ServiceError> {
        account::validate_username(&new_user.username).map_err(ServiceError::BadRequest)?;

        let referred_by = self.resolve_referrer(new_user.referred_by.as_deref()).await?;
        let referral_code =
            account::assign_referral_code(&self.repository, &self.referral, |length| {
                account::generate_referral_code(&mut rand::thread_rng(), length)
            })
            .await?;

        let record = account::prepare_account(
            new_user,
            referral_code,
            referred_by,
            Utc::now(),
            &self.rules,
            &self.avatar,
        );
        let user = self.repository.insert_user(record).await?;

        log::info!(
            "Created user {} ({}) with referral code {}.",
            user.id,
            user.username,
            user.referral_code
        );
        Ok(user)
    }

    async fn authenticate(&self, token: &str) -> Result<Option<users::User>, ServiceError> {
        Ok(self.repository.find_user_by_token(token).await?)
    }
}

#[async_trait]
impl<R: Repository> RequestHandler<UserRequest> for UserRequestHandler<R> {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::CreateUser { new_user, response } => {
                let user = self.create_user(new_user).await;
                if let Err(e) = &user {
                    log::warn!("Could not create user: {}", e);
                }
                let _ = response.send(user);
            }
            UserRequest::Authenticate { token, response } => {
                let user = self.authenticate(&token).await;
                let _ = response.send(user);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl<R: Repository> Service<UserRequest, UserRequestHandler<R>> for UserService {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryRepository;

    fn handler(repository: MemoryRepository) -> UserRequestHandler<MemoryRepository> {
        UserRequestHandler::new(
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
        )
    }

    fn new_user(username: &str, referred_by: Option<&str>) -> users::NewUser {
        users::NewUser {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            avatar_url: None,
            referred_by: referred_by.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn created_users_are_retrievable_by_token() {
        let handler = handler(MemoryRepository::new());

        let user = handler.create_user(new_user("alice", None)).await.unwrap();
        let found = handler.authenticate(&user.token).await.unwrap().unwrap();

        assert_eq!(found.id, user.id);
        assert_eq!(found.coins, 100);
        assert_eq!(found.avatar_url, "https://avatars.test/alice.png");
        assert_eq!(found.referral_code.len(), 6);
    }

    #[tokio::test]
    async fn referral_codes_link_the_inviter() {
        let handler = handler(MemoryRepository::new());
        let inviter = handler.create_user(new_user("alice", None)).await.unwrap();

        let invited = handler
            .create_user(new_user("bob", Some(&inviter.referral_code.to_lowercase())))
            .await
            .unwrap();
        let stray = handler
            .create_user(new_user("carol", Some("NOPE00")))
            .await
            .unwrap();

        assert_eq!(invited.referred_by.as_deref(), Some(inviter.id.as_str()));
        assert_eq!(stray.referred_by, None);
        assert_ne!(invited.referral_code, inviter.referral_code);
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let handler = handler(MemoryRepository::new());
        handler.create_user(new_user("alice", None)).await.unwrap();

        let err = handler.create_user(new_user("alice", None)).await.unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_usernames_are_rejected() {
        let handler = handler(MemoryRepository::new());

        let err = handler.create_user(new_user("a b", None)).await.unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_tokens_resolve_to_nobody() {
        let handler = handler(MemoryRepository::new());

        assert!(handler.authenticate("missing").await.unwrap().is_none());
    }
}
