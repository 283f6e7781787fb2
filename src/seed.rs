//! Reference data loaded on start-up. Each table is only filled while empty,
//! so running the seed on every boot is harmless.

use crate::{
    models::{games::NewGame, prizes::NewPrize, rewards::DailyRewardConfig},
    repositories::{ReferenceTable, Repository, RepositoryError},
};

const GAMES: &[(&str, &str, &str, &str, &str)] = &[
    ("Slope", "39322238374d47479712165181177656", "landscape", "Action", "Drive your ball through a high-speed 3D tunnel. Avoid obstacles!"),
    ("Moto X3M", "28481498a9fa4353a2a68897f2613d05", "landscape", "Racing", "Perform stunts and beat the clock in this bike racing game."),
    ("Subway Runner", "6990521e251147a78122606830f30c9d", "portrait", "Action", "Run as fast as you can through the subway tracks."),
    ("Ludo Legend", "366e51c8651c4e7ab1b8f522858b760a", "landscape", "Casual", "The classic board game Ludo, now on your phone."),
    ("Candy Riddles", "5650117079f4492694b407ec14b40108", "portrait", "Puzzle", "Match candies in this sweet puzzle adventure."),
    ("Penalty Shooters 2", "5f72005047b84f3388a994784e1b731e", "landscape", "Sports", "Choose your team and win the soccer championship."),
    ("8 Ball Pool", "6c2049e2501140088012606830f30c9d", "landscape", "Sports", "Standard 8-ball billiards game."),
    ("Tomb Runner", "a42b1f8f307f4337910830f30c9d6905", "portrait", "Action", "Sprint through the tomb, jumping and sliding to survive."),
    ("Drift Cup Racing", "00139965d8364835848606830f30c9d6", "landscape", "Racing", "Top-down racing where drifting is the key to victory."),
    ("Onet Connect Classic", "59322238374d47479712165181177656", "portrait", "Puzzle", "Link pairs of tiles to clear the board."),
];

const DAILY_REWARDS: [i64; 7] = [50, 75, 100, 125, 150, 200, 500];

const PRIZES: &[(&str, i64, i32)] = &[
    ("20", 20, 30),
    ("50", 50, 25),
    ("100", 100, 20),
    ("200", 200, 10),
    ("500", 500, 5),
    ("1K", 1000, 2),
    ("Ticket", 50, 8),
    ("JACKPOT", 5000, 0),
];

pub fn default_games() -> Vec<NewGame> {
    GAMES
        .iter()
        .map(|&(title, slug, orientation, category, description)| NewGame {
            title: title.to_string(),
            url: format!("https://html5.gamedistribution.com/{slug}/"),
            image: format!("https://img.gamedistribution.com/{slug}-512x512.jpeg"),
            orientation: orientation.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            is_active: true,
        })
        .collect()
}

pub fn default_daily_rewards() -> Vec<DailyRewardConfig> {
    DAILY_REWARDS
        .iter()
        .zip(1..)
        .map(|(&reward_amount, day_number)| DailyRewardConfig {
            day_number,
            reward_amount,
        })
        .collect()
}

pub fn default_prizes() -> Vec<NewPrize> {
    PRIZES
        .iter()
        .map(|&(label, value, probability)| NewPrize {
            label: label.to_string(),
            value,
            probability,
        })
        .collect()
}

async fn is_empty<R: Repository>(repository: &R, table: ReferenceTable) -> Result<bool, RepositoryError> {
    Ok(repository.count_reference_rows(table).await? == 0)
}

/// Fills every empty reference table. A table that fails is logged and
/// skipped; the others are still attempted.
pub async fn seed_reference_data<R: Repository>(repository: &R) {
    match is_empty(repository, ReferenceTable::Games).await {
        Ok(true) => match repository.insert_games(default_games()).await {
            Ok(()) => log::info!("Seeded {} games.", GAMES.len()),
            Err(e) => log::error!("Failed to seed games: {}", e),
        },
        Ok(false) => log::debug!("Games already present, skipping seed."),
        Err(e) => log::error!("Could not inspect games table: {}", e),
    }

    match is_empty(repository, ReferenceTable::DailyRewards).await {
        Ok(true) => match repository.insert_daily_rewards(default_daily_rewards()).await {
            Ok(()) => log::info!("Seeded daily rewards."),
            Err(e) => log::error!("Failed to seed daily rewards: {}", e),
        },
        Ok(false) => log::debug!("Daily rewards already present, skipping seed."),
        Err(e) => log::error!("Could not inspect daily rewards table: {}", e),
    }

    match is_empty(repository, ReferenceTable::Prizes).await {
        Ok(true) => match repository.insert_prizes(default_prizes()).await {
            Ok(()) => log::info!("Seeded spin prizes."),
            Err(e) => log::error!("Failed to seed spin prizes: {}", e),
        },
        Ok(false) => log::debug!("Spin prizes already present, skipping seed."),
        Err(e) => log::error!("Could not inspect spin prizes table: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryRepository;

    #[test]
    fn default_prize_weights_sum_to_one_hundred() {
        let total: i32 = default_prizes().iter().map(|prize| prize.probability).sum();
        assert_eq!(total, 100);
    }

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate_rows() {
        let repository = MemoryRepository::new();

        seed_reference_data(&repository).await;
        seed_reference_data(&repository).await;

        assert_eq!(repository.list_active_games().await.unwrap().len(), 10);
        assert_eq!(repository.daily_reward_schedule().await.unwrap().len(), 7);

        let prizes = repository.list_prizes(100).await.unwrap();
        let labels: Vec<&str> = prizes.iter().map(|prize| prize.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["20", "50", "100", "200", "500", "1K", "Ticket", "JACKPOT"]
        );
    }
}
