use crate::models::games;

use sqlx::PgPool;

use super::RepositoryError;

#[derive(Clone)]
pub struct GameRepository {
    conn: PgPool,
}

impl GameRepository {
    pub fn new(conn: PgPool) -> Self {
        GameRepository { conn }
    }

    pub async fn list_active(&self) -> Result<Vec<games::Game>, RepositoryError> {
        let games =
            sqlx::query_as::<_, games::Game>("SELECT * FROM games WHERE is_active ORDER BY id")
                .fetch_all(&self.conn)
                .await?;

        Ok(games)
    }

    pub async fn insert_games(&self, games: Vec<games::NewGame>) -> Result<(), RepositoryError> {
        let mut tx = self.conn.begin().await?;

        for game in games {
            sqlx::query(
                r#"INSERT INTO games
                (title, url, image, orientation, category, description, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(&game.title)
            .bind(&game.url)
            .bind(&game.image)
            .bind(&game.orientation)
            .bind(&game.category)
            .bind(&game.description)
            .bind(game.is_active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
