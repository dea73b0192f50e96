//! Leaderboard qualification and entry construction.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::error::ValidationError;
use crate::session::SessionResult;
use crate::types::{HighScore, HighScoreDraft, Identity};

/// Number of entries kept on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;
/// Minimum player name length, after trimming.
pub const MIN_PLAYER_NAME_LEN: usize = 3;

/// Ranking order: fewer mistakes first, then faster time.
pub fn rank_cmp(a_mistakes: u32, a_time: f64, b_mistakes: u32, b_time: f64) -> Ordering {
    a_mistakes
        .cmp(&b_mistakes)
        .then_with(|| a_time.total_cmp(&b_time))
}

/// Sort entries best first.
pub fn sort_by_rank(entries: &mut [HighScore]) {
    entries.sort_by(|a, b| rank_cmp(a.mistakes, a.time_secs, b.mistakes, b.time_secs));
}

/// Round seconds to one decimal place.
pub fn round_to_tenth(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}

/// Whether a finished session earns a leaderboard spot.
///
/// With fewer than [`LEADERBOARD_SIZE`] entries every result qualifies.
/// Otherwise the result must rank strictly better than the last entry that
/// still fits on the board.
pub fn qualifies(leaderboard: &[HighScore], result: &SessionResult) -> bool {
    if leaderboard.len() < LEADERBOARD_SIZE {
        return true;
    }

    let mut ranked = leaderboard.to_vec();
    sort_by_rank(&mut ranked);
    let worst = &ranked[LEADERBOARD_SIZE - 1];

    rank_cmp(
        result.mistakes,
        round_to_tenth(result.elapsed_secs()),
        worst.mistakes,
        worst.time_secs,
    ) == Ordering::Less
}

/// Trim a player name and check its length.
pub fn validate_player_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_PLAYER_NAME_LEN {
        return Err(ValidationError::PlayerNameTooShort {
            min: MIN_PLAYER_NAME_LEN,
        });
    }
    Ok(trimmed.to_string())
}

impl HighScoreDraft {
    /// Build the entry to submit for a finished session.
    pub fn new(
        player_name: &str,
        owner: Identity,
        result: &SessionResult,
        date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            player_name: validate_player_name(player_name)?,
            owner,
            category: result.category,
            mistakes: result.mistakes,
            time_secs: round_to_tenth(result.elapsed_secs()),
            date,
        })
    }
}
