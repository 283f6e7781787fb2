use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub image: String,
    pub orientation: String,
    pub category: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Clone, Debug)]
pub struct NewGame {
    pub title: String,
    pub url: String,
    pub image: String,
    pub orientation: String,
    pub category: String,
    pub description: String,
    pub is_active: bool,
}
