use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub coins: i64,
    pub daily_spins_left: i32,
    pub daily_streak: i32,
    pub level: i32,
    pub last_spin_date: DateTime<Utc>,
    /// `None` until the first daily reward is claimed.
    pub last_check_in: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account creation request as received from clients.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Referral code of the inviting user.
    pub referred_by: Option<String>,
}

/// A fully initialized account, ready to be inserted.
#[derive(Clone, Debug)]
pub struct NewUserRecord {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: String,
    pub token: String,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub coins: i64,
    pub daily_spins_left: i32,
    pub daily_streak: i32,
    pub level: i32,
    pub last_spin_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewUserRecord {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            avatar_url: self.avatar_url,
            token: self.token,
            referral_code: self.referral_code,
            referred_by: self.referred_by,
            coins: self.coins,
            daily_spins_left: self.daily_spins_left,
            daily_streak: self.daily_streak,
            level: self.level,
            last_spin_date: self.last_spin_date,
            last_check_in: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
