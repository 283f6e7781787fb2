use crate::models::users;

use sqlx::PgPool;

use super::{Mutation, RepositoryError};

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
}

impl UserRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_user(
        &self,
        new_user: users::NewUserRecord,
    ) -> Result<users::User, RepositoryError> {
        let user = sqlx::query_as::<_, users::User>(
            r#"
                INSERT INTO users
                (id, username, email, avatar_url, token, referral_code, referred_by,
                 coins, daily_spins_left, daily_streak, level, last_spin_date, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
                RETURNING *
            "#,
        )
        .bind(&new_user.id)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.avatar_url)
        .bind(&new_user.token)
        .bind(&new_user.referral_code)
        .bind(&new_user.referred_by)
        .bind(new_user.coins)
        .bind(new_user.daily_spins_left)
        .bind(new_user.daily_streak)
        .bind(new_user.level)
        .bind(new_user.last_spin_date)
        .bind(new_user.created_at)
        .fetch_one(&self.conn)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<users::User>, RepositoryError> {
        let user = sqlx::query_as::<_, users::User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<users::User>, RepositoryError> {
        let user = sqlx::query_as::<_, users::User>("SELECT * FROM users WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.conn)
            .await?;

        Ok(user)
    }

    pub async fn get_user_id_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let id: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE referral_code = $1")
            .bind(code)
            .fetch_optional(&self.conn)
            .await?;

        Ok(id)
    }

    /// Locks the row with `SELECT ... FOR UPDATE` for the duration of `mutate`.
    pub async fn update_user<F, T>(&self, user_id: &str, mutate: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut users::User) -> Mutation<T>,
    {
        let mut tx = self.conn.begin().await?;

        let user = sqlx::query_as::<_, users::User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut user) = user else {
            return Err(RepositoryError::NotFound);
        };

        match mutate(&mut user) {
            Mutation::Save(value) => {
                sqlx::query(
                    r#"
                        UPDATE users SET
                            coins = $2,
                            daily_spins_left = $3,
                            daily_streak = $4,
                            level = $5,
                            last_spin_date = $6,
                            last_check_in = $7,
                            updated_at = CURRENT_TIMESTAMP
                        WHERE id = $1
                    "#,
                )
                .bind(&user.id)
                .bind(user.coins)
                .bind(user.daily_spins_left)
                .bind(user.daily_streak)
                .bind(user.level)
                .bind(user.last_spin_date)
                .bind(user.last_check_in)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
                Ok(value)
            }
            Mutation::Discard(value) => {
                tx.rollback().await?;
                Ok(value)
            }
        }
    }

    pub async fn top_by_coins(&self, limit: i64) -> Result<Vec<users::User>, RepositoryError> {
        let users = sqlx::query_as::<_, users::User>(
            "SELECT * FROM users ORDER BY coins DESC, id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.conn)
        .await?;

        Ok(users)
    }

    pub async fn count_with_more_coins(&self, coins: i64) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE coins > $1")
            .bind(coins)
            .fetch_one(&self.conn)
            .await?;

        Ok(count)
    }
}
