use crate::models::rewards;

use sqlx::PgPool;

use super::RepositoryError;

#[derive(Clone)]
pub struct DailyRewardRepository {
    conn: PgPool,
}

impl DailyRewardRepository {
    pub fn new(conn: PgPool) -> Self {
        DailyRewardRepository { conn }
    }

    pub async fn get_schedule(&self) -> Result<Vec<rewards::DailyRewardConfig>, RepositoryError> {
        let schedule = sqlx::query_as::<_, rewards::DailyRewardConfig>(
            "SELECT day_number, reward_amount FROM daily_rewards_config ORDER BY day_number",
        )
        .fetch_all(&self.conn)
        .await?;

        Ok(schedule)
    }

    pub async fn insert_rewards(
        &self,
        rewards: Vec<rewards::DailyRewardConfig>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.conn.begin().await?;

        for reward in rewards {
            sqlx::query(
                "INSERT INTO daily_rewards_config (day_number, reward_amount) VALUES ($1, $2)",
            )
            .bind(reward.day_number)
            .bind(reward.reward_amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
