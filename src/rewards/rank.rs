use crate::models::{leaderboard::LeaderboardItem, users::User};

/// Competition rank: users with equal balances share a rank.
pub fn rank_from_greater_count(strictly_greater: i64) -> i64 {
    strictly_greater + 1
}

/// Ranks a window taken from the top of the coin ordering.
///
/// `users` must be sorted by coins, descending. Within such a window the index
/// of the first user with a given balance is the number of users above it.
pub fn rank_window(users: &[User]) -> Vec<LeaderboardItem> {
    let mut items: Vec<LeaderboardItem> = Vec::with_capacity(users.len());

    for (index, user) in users.iter().enumerate() {
        let rank = match items.last() {
            Some(previous) if previous.coins == user.coins => previous.rank,
            _ => rank_from_greater_count(index as i64),
        };

        items.push(LeaderboardItem {
            id: user.id.clone(),
            username: user.username.clone(),
            avatar: user.avatar_url.clone(),
            coins: user.coins,
            rank,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::testing::user;

    fn rank_among(coins: i64, balances: &[i64]) -> i64 {
        let greater = balances.iter().filter(|&&balance| balance > coins).count();
        rank_from_greater_count(greater as i64)
    }

    #[test]
    fn ties_share_the_higher_rank() {
        let balances = [500, 500, 300, 100];

        assert_eq!(rank_among(500, &balances), 1);
        assert_eq!(rank_among(300, &balances), 3);
        assert_eq!(rank_among(100, &balances), 4);
    }

    #[test]
    fn richest_user_is_first_even_when_alone() {
        assert_eq!(rank_among(10, &[10]), 1);
        assert_eq!(rank_among(10, &[]), 1);
    }

    #[test]
    fn window_ranks_match_full_set_ranks() {
        let users: Vec<User> = [500, 500, 300, 100].into_iter().map(user).collect();
        let ranks: Vec<i64> = rank_window(&users).iter().map(|item| item.rank).collect();

        assert_eq!(ranks, vec![1, 1, 3, 4]);
    }
}
