use crate::models::prizes;

use sqlx::PgPool;

use super::RepositoryError;

#[derive(Clone)]
pub struct PrizeRepository {
    conn: PgPool,
}

impl PrizeRepository {
    pub fn new(conn: PgPool) -> Self {
        PrizeRepository { conn }
    }

    /// Prizes ordered by id, which is the order they appear on the wheel.
    pub async fn list_prizes(&self, limit: i64) -> Result<Vec<prizes::PrizeEntry>, RepositoryError> {
        let prizes = sqlx::query_as::<_, prizes::PrizeEntry>(
            "SELECT id, label, value, probability FROM spin_wheel_prizes ORDER BY id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.conn)
        .await?;

        Ok(prizes)
    }

    pub async fn insert_prizes(&self, prizes: Vec<prizes::NewPrize>) -> Result<(), RepositoryError> {
        let mut tx = self.conn.begin().await?;

        for prize in prizes {
            sqlx::query(
                "INSERT INTO spin_wheel_prizes (label, value, probability) VALUES ($1, $2, $3)",
            )
            .bind(&prize.label)
            .bind(prize.value)
            .bind(prize.probability)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
