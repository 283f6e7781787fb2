use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use super::RewardRules;
use crate::{
    models::users::{NewUser, NewUserRecord},
    repositories::{Repository, RepositoryError},
    settings::{Avatar, Referral},
};

pub const REFERRAL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    #[error("No unused referral code found after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub fn generate_referral_code<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| REFERRAL_ALPHABET[rng.gen_range(0..REFERRAL_ALPHABET.len())] as char)
        .collect()
}

/// Draws candidates from `candidate` until one is unused by every stored user.
///
/// Each code length in the policy gets `max_attempts` draws, so a crowded
/// six character space widens once before giving up.
pub async fn assign_referral_code<R, G>(
    repository: &R,
    policy: &Referral,
    mut candidate: G,
) -> Result<String, ReferralError>
where
    R: Repository,
    G: FnMut(usize) -> String + Send,
{
    let mut attempts = 0;

    for length in [policy.code_length, policy.widened_code_length] {
        for _ in 0..policy.max_attempts {
            attempts += 1;
            let code = candidate(length);

            if repository
                .find_user_id_by_referral_code(&code)
                .await?
                .is_none()
            {
                return Ok(code);
            }
            log::debug!("Referral code collision on attempt {attempts}.");
        }

        log::warn!(
            "No free referral code of length {length} after {} attempts.",
            policy.max_attempts
        );
    }

    Err(ReferralError::Exhausted { attempts })
}

/// Usernames feed the avatar URL verbatim, so they are limited to URL-safe characters.
pub fn validate_username(username: &str) -> Result<(), String> {
    let length = username.chars().count();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return Err(format!(
            "Username must be between {USERNAME_MIN_LENGTH} and {USERNAME_MAX_LENGTH} characters."
        ));
    }

    let mut chars = username.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if first_ok && rest_ok {
        Ok(())
    } else {
        Err("Username may only contain letters, digits, '_', '.' and '-'.".to_string())
    }
}

pub fn avatar_url(avatar: &Avatar, username: &str) -> String {
    avatar.url_template.replace("{username}", username)
}

/// Seeds progression fields for an account that is about to be inserted.
///
/// `last_spin_date` is placed one day in the past so that the first spin
/// request always performs the fresh-day reset.
pub fn prepare_account(
    new_user: NewUser,
    referral_code: String,
    referred_by: Option<String>,
    now: DateTime<Utc>,
    rules: &RewardRules,
    avatar: &Avatar,
) -> NewUserRecord {
    let avatar_url = match new_user.avatar_url {
        Some(url) if !url.trim().is_empty() => url,
        _ => avatar_url(avatar, &new_user.username),
    };

    NewUserRecord {
        id: Uuid::new_v4().hyphenated().to_string(),
        username: new_user.username,
        email: new_user.email.filter(|email| !email.trim().is_empty()),
        avatar_url,
        token: Uuid::new_v4().simple().to_string(),
        referral_code,
        referred_by,
        coins: rules.starting_coins,
        daily_spins_left: rules.daily_spins,
        daily_streak: 0,
        level: rules.starting_level,
        last_spin_date: now - Duration::days(1),
        created_at: now,
    }
}
