use chrono::{DateTime, Utc};

use super::{calendar_day, RewardRules};
use crate::models::{rewards::DailyRewardConfig, users::User};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed { reward: i64, new_streak: i32 },
    AlreadyClaimed,
}

/// Streak length after a claim at `now`, or `None` if today was already claimed.
pub fn next_streak(
    last_check_in: Option<DateTime<Utc>>,
    current_streak: i32,
    now: DateTime<Utc>,
) -> Option<i32> {
    let today = calendar_day(now);
    let yesterday = today.pred_opt();

    match last_check_in.map(calendar_day) {
        Some(day) if day == today => None,
        Some(day) if Some(day) == yesterday => Some(current_streak + 1),
        _ => Some(1),
    }
}

/// Position of `streak` inside the repeating reward cycle, starting at 1.
pub fn cycle_day(streak: i32, cycle_length: i32) -> i32 {
    (streak - 1).rem_euclid(cycle_length.max(1)) + 1
}

pub fn reward_for_day(schedule: &[DailyRewardConfig], day: i32, fallback: i64) -> i64 {
    schedule
        .iter()
        .find(|config| config.day_number == day)
        .map(|config| config.reward_amount)
        .unwrap_or(fallback)
}

pub fn resolve_claim(
    user: &mut User,
    schedule: &[DailyRewardConfig],
    now: DateTime<Utc>,
    rules: &RewardRules,
) -> ClaimOutcome {
    let Some(new_streak) = next_streak(user.last_check_in, user.daily_streak, now) else {
        return ClaimOutcome::AlreadyClaimed;
    };

    let day = cycle_day(new_streak, rules.cycle_length);
    let reward = reward_for_day(schedule, day, rules.streak_fallback_reward);

    user.coins += reward;
    user.daily_streak = new_streak;
    user.last_check_in = Some(now);

    ClaimOutcome::Claimed { reward, new_streak }
}
