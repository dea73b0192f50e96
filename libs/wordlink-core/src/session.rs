//! Quiz session state machine.
//!
//! A [`QuizSession`] moves through [`Phase::Preview`], [`Phase::Playing`],
//! [`Phase::RoundResult`] and [`Phase::Finished`]. It performs no I/O and
//! keeps no clock of its own: elapsed time advances through [`QuizSession::tick`]
//! and the delayed end-of-quiz steps arrive through [`QuizSession::show_win_banner`],
//! [`QuizSession::finish`] and [`QuizSession::hide_win_banner`]. Each of those
//! carries the epoch it was scheduled under, so events left over from an
//! earlier start or reset are ignored.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SessionError;
use crate::matching::judge;
use crate::selector::select_rounds;
use crate::types::{CategoryChoice, Question};

/// Period of the elapsed-time clock. One tick adds one tenth of a second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Delay between revealing the final round and showing the win banner.
pub const WIN_BANNER_DELAY: Duration = Duration::from_secs(1);
/// Delay between revealing the final round and finishing the session.
pub const FINISH_DELAY: Duration = Duration::from_secs(2);
/// How long the win banner stays visible.
pub const WIN_BANNER_DURATION: Duration = Duration::from_secs(5);

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Idle, choosing a category.
    Preview,
    /// Round in progress, guess not yet revealed.
    Playing,
    /// Guess revealed.
    RoundResult,
    /// All rounds consumed.
    Finished,
}

impl Phase {
    /// Whether the clock runs in this phase.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::RoundResult)
    }
}

/// Win banner tier, by cumulative mistakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinTier {
    Perfect,
    Good,
    Ok,
    Bad,
}

impl WinTier {
    pub fn for_mistakes(mistakes: u32) -> Self {
        match mistakes {
            0 => Self::Perfect,
            1..=2 => Self::Good,
            3..=5 => Self::Ok,
            _ => Self::Bad,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perfect => "perfect",
            Self::Good => "good",
            Self::Ok => "ok",
            Self::Bad => "bad",
        }
    }
}

/// What happened when a guess was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessOutcome {
    pub round_index: usize,
    pub correct: bool,
    pub distance: usize,
    pub solution: String,
    pub explanation: String,
    /// Mistakes including this round.
    pub mistakes: u32,
    /// The guess was for the last round; the caller schedules the ending.
    pub final_round: bool,
    pub epoch: u64,
}

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub category: CategoryChoice,
    pub mistakes: u32,
    pub elapsed_tenths: u32,
    pub rounds: usize,
}

impl SessionResult {
    /// Elapsed seconds with one decimal.
    pub fn elapsed_secs(&self) -> f64 {
        tenths_to_secs(self.elapsed_tenths)
    }

    pub fn tier(&self) -> WinTier {
        WinTier::for_mistakes(self.mistakes)
    }
}

/// Result of the confirm key in [`Phase::RoundResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Advanced { round_index: usize },
    Finished(SessionResult),
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub category: CategoryChoice,
    pub round_index: usize,
    pub round_count: usize,
    pub mistakes: u32,
    pub elapsed_tenths: u32,
    pub last_guess_correct: Option<bool>,
    pub banner: Option<WinTier>,
    pub epoch: u64,
}

pub(crate) fn tenths_to_secs(tenths: u32) -> f64 {
    f64::from(tenths) / 10.0
}

/// One play-through of up to ten rounds.
#[derive(Debug, Clone)]
pub struct QuizSession {
    phase: Phase,
    category: CategoryChoice,
    rounds: Vec<Question>,
    round_index: usize,
    mistakes: u32,
    elapsed_tenths: u32,
    last_guess_correct: Option<bool>,
    banner: Option<WinTier>,
    epoch: u64,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Preview,
            category: CategoryChoice::Random,
            rounds: Vec::new(),
            round_index: 0,
            mistakes: 0,
            elapsed_tenths: 0,
            last_guess_correct: None,
            banner: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn category(&self) -> CategoryChoice {
        self.category
    }

    pub fn rounds(&self) -> &[Question] {
        &self.rounds
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn elapsed_tenths(&self) -> u32 {
        self.elapsed_tenths
    }

    pub fn elapsed_secs(&self) -> f64 {
        tenths_to_secs(self.elapsed_tenths)
    }

    pub fn banner(&self) -> Option<WinTier> {
        self.banner
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == Phase::RoundResult
    }

    /// Question of the round being played or revealed.
    pub fn current_round(&self) -> Option<&Question> {
        if self.phase.is_active() {
            self.rounds.get(self.round_index)
        } else {
            None
        }
    }

    pub fn is_final_round(&self) -> bool {
        !self.rounds.is_empty() && self.round_index + 1 == self.rounds.len()
    }

    /// Result of the session once it is finished.
    pub fn result(&self) -> Option<SessionResult> {
        (self.phase == Phase::Finished).then(|| self.make_result())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            category: self.category,
            round_index: self.round_index,
            round_count: self.rounds.len(),
            mistakes: self.mistakes,
            elapsed_tenths: self.elapsed_tenths,
            last_guess_correct: self.last_guess_correct,
            banner: self.banner,
            epoch: self.epoch,
        }
    }

    /// Pick the category for the next start. Only allowed in preview.
    pub fn choose_category(&mut self, choice: CategoryChoice) -> bool {
        if self.phase != Phase::Preview {
            return false;
        }
        self.category = choice;
        true
    }

    /// Select fresh rounds from `catalog` and begin playing.
    ///
    /// Returns the number of rounds. On error the session is unchanged.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        catalog: &[Question],
        rng: &mut R,
    ) -> Result<usize, SessionError> {
        if self.phase.is_active() {
            return Err(SessionError::InProgress);
        }

        let rounds = select_rounds(catalog, self.category, rng);
        if rounds.is_empty() {
            return Err(SessionError::NoQuestions(self.category));
        }

        self.rounds = rounds;
        self.restart();
        Ok(self.rounds.len())
    }

    /// Judge a guess for the current round.
    ///
    /// Returns `None` unless a round is in progress, so a repeated
    /// submission for an already revealed round is a no-op.
    pub fn submit_guess(&mut self, guess: &str) -> Option<GuessOutcome> {
        if self.phase != Phase::Playing {
            return None;
        }
        let question = self.rounds.get(self.round_index)?;
        let judgement = judge(guess, &question.solution_word);

        if !judgement.is_correct {
            self.mistakes += 1;
        }
        self.last_guess_correct = Some(judgement.is_correct);
        self.phase = Phase::RoundResult;

        Some(GuessOutcome {
            round_index: self.round_index,
            correct: judgement.is_correct,
            distance: judgement.distance,
            solution: question.solution_word.clone(),
            explanation: question.answer_explanation.clone(),
            mistakes: self.mistakes,
            final_round: self.is_final_round(),
            epoch: self.epoch,
        })
    }

    /// Move on to the next round. Only valid on a revealed, non-final round.
    pub fn advance(&mut self) -> bool {
        if self.phase != Phase::RoundResult || self.is_final_round() {
            return false;
        }
        self.round_index += 1;
        self.last_guess_correct = None;
        self.phase = Phase::Playing;
        true
    }

    /// Confirm key: next round, or finish right away on the final round.
    pub fn confirm(&mut self) -> Option<ConfirmAction> {
        if self.phase != Phase::RoundResult {
            return None;
        }
        if self.is_final_round() {
            Some(ConfirmAction::Finished(self.finish_now()))
        } else {
            self.advance();
            Some(ConfirmAction::Advanced {
                round_index: self.round_index,
            })
        }
    }

    /// Scheduled end of the session after the final round was revealed.
    pub fn finish(&mut self, epoch: u64) -> Option<SessionResult> {
        if epoch != self.epoch || self.phase != Phase::RoundResult || !self.is_final_round() {
            return None;
        }
        Some(self.finish_now())
    }

    /// Scheduled display of the win banner.
    pub fn show_win_banner(&mut self, epoch: u64) -> Option<WinTier> {
        let ending = match self.phase {
            Phase::RoundResult => self.is_final_round(),
            Phase::Finished => true,
            _ => false,
        };
        if epoch != self.epoch || !ending || self.banner.is_some() {
            return None;
        }
        let tier = WinTier::for_mistakes(self.mistakes);
        self.banner = Some(tier);
        Some(tier)
    }

    /// Scheduled removal of the win banner.
    pub fn hide_win_banner(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.banner.is_none() {
            return false;
        }
        self.banner = None;
        true
    }

    /// Replay the same rounds from the first one.
    pub fn soft_reset(&mut self) -> bool {
        if self.phase == Phase::Preview || self.rounds.is_empty() {
            return false;
        }
        self.restart();
        true
    }

    /// Drop the rounds and go back to choosing a category.
    pub fn hard_reset(&mut self) {
        self.phase = Phase::Preview;
        self.category = CategoryChoice::Random;
        self.rounds.clear();
        self.round_index = 0;
        self.mistakes = 0;
        self.elapsed_tenths = 0;
        self.last_guess_correct = None;
        self.banner = None;
        self.epoch += 1;
    }

    /// Advance the clock by one [`TICK_INTERVAL`] if it is running.
    pub fn tick(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || !self.phase.is_active() {
            return false;
        }
        self.elapsed_tenths = self.elapsed_tenths.saturating_add(1);
        true
    }

    fn restart(&mut self) {
        self.phase = Phase::Playing;
        self.round_index = 0;
        self.mistakes = 0;
        self.elapsed_tenths = 0;
        self.last_guess_correct = None;
        self.banner = None;
        self.epoch += 1;
    }

    fn finish_now(&mut self) -> SessionResult {
        self.phase = Phase::Finished;
        self.make_result()
    }

    fn make_result(&self) -> SessionResult {
        SessionResult {
            category: self.category,
            mistakes: self.mistakes,
            elapsed_tenths: self.elapsed_tenths,
            rounds: self.rounds.len(),
        }
    }
}
