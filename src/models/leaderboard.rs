use serde::Serialize;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LeaderboardItem {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub coins: i64,
    pub rank: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Leaderboard {
    pub leaderboard: Vec<LeaderboardItem>,
    /// Zero when the caller is anonymous.
    pub user_rank: i64,
}
