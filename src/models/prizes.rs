use serde::{Deserialize, Serialize};

/// One slice of the spin wheel. `probability` is a weight in parts per 100.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow, PartialEq, Eq)]
pub struct PrizeEntry {
    pub id: i64,
    pub label: String,
    pub value: i64,
    pub probability: i32,
}

#[derive(Clone, Debug)]
pub struct NewPrize {
    pub label: String,
    pub value: i64,
    pub probability: i32,
}
