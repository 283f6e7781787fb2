use chrono::{DateTime, Utc};
use rand::Rng;

use super::{same_calendar_day, RewardRules};
use crate::models::{prizes::PrizeEntry, users::User};

/// Draws fall in `1..=DRAW_MAX`, matching weights expressed in parts per 100.
pub const DRAW_MAX: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpinOutcome {
    Won {
        reward: i64,
        spins_left: i32,
        prize_id: i64,
    },
    NoSpinsLeft,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpinError {
    #[error("The spin wheel has no prizes configured")]
    EmptyPrizeTable,
}

pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..=DRAW_MAX)
}

/// Picks the first prize whose cumulative weight reaches `draw`.
///
/// Tables summing to less than `DRAW_MAX` leave high draws unmatched; those
/// fall back to the first prize rather than paying nothing.
pub fn select_prize(prizes: &[PrizeEntry], draw: u32) -> Option<&PrizeEntry> {
    let mut cumulative: i64 = 0;

    prizes
        .iter()
        .find(|prize| {
            cumulative += i64::from(prize.probability);
            i64::from(draw) <= cumulative
        })
        .or_else(|| prizes.first())
}

/// Restores the daily allotment when the last spin happened on an earlier UTC day.
pub fn refresh_daily_spins(user: &mut User, now: DateTime<Utc>, rules: &RewardRules) -> bool {
    if same_calendar_day(user.last_spin_date, now) {
        return false;
    }

    user.daily_spins_left = rules.daily_spins;
    true
}

pub fn resolve_spin(
    user: &mut User,
    prizes: &[PrizeEntry],
    now: DateTime<Utc>,
    draw: u32,
    rules: &RewardRules,
) -> Result<SpinOutcome, SpinError> {
    refresh_daily_spins(user, now, rules);

    if user.daily_spins_left <= 0 {
        return Ok(SpinOutcome::NoSpinsLeft);
    }

    let prize = select_prize(prizes, draw).ok_or(SpinError::EmptyPrizeTable)?;

    user.coins += prize.value;
    user.daily_spins_left -= 1;
    user.last_spin_date = now;

    Ok(SpinOutcome::Won {
        reward: prize.value,
        spins_left: user.daily_spins_left,
        prize_id: prize.id,
    })
}
