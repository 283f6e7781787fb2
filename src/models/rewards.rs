use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, sqlx::FromRow, PartialEq, Eq)]
pub struct DailyRewardConfig {
    pub day_number: i32,
    pub reward_amount: i64,
}
