pub mod games;
pub mod leaderboard;
pub mod prizes;
pub mod rewards;
pub mod users;
