//! Reward computation: account defaults, the spin wheel, the daily streak and
//! leaderboard ranks. Everything in here is synchronous and operates on an
//! in-memory [`User`](crate::models::users::User); persistence is left to the
//! repositories.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

pub mod account;
pub mod rank;
pub mod spin;
pub mod streak;

#[derive(Clone, Debug, Deserialize)]
pub struct RewardRules {
    /// Spins granted at the start of every UTC calendar day.
    pub daily_spins: i32,
    pub starting_coins: i64,
    pub starting_level: i32,
    /// Paid when the reward schedule has no row for a cycle day.
    pub streak_fallback_reward: i64,
    pub cycle_length: i32,
    pub prize_table_limit: i64,
    pub leaderboard_size: i64,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            daily_spins: 3,
            starting_coins: 100,
            starting_level: 1,
            streak_fallback_reward: 50,
            cycle_length: 7,
            prize_table_limit: 100,
            leaderboard_size: 50,
        }
    }
}

/// UTC calendar date of an instant. Time of day is ignored.
pub fn calendar_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    calendar_day(a) == calendar_day(b)
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, Utc};

    use crate::models::users::User;

    pub fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    pub fn user(coins: i64) -> User {
        let created = at("2024-01-01T00:00:00Z");
        User {
            id: format!("user-{coins}"),
            username: format!("player{coins}"),
            email: None,
            avatar_url: String::new(),
            token: format!("token-{coins}"),
            referral_code: "ABC123".to_string(),
            referred_by: None,
            coins,
            daily_spins_left: 3,
            daily_streak: 0,
            level: 1,
            last_spin_date: created,
            last_check_in: None,
            created_at: created,
            updated_at: created,
        }
    }
}
