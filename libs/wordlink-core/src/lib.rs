//! Core word-link quiz library shared by the client applications.
//!
//! Provides:
//! - Shared types (Question, Category, HighScore, Identity, etc.)
//! - Typo-tolerant answer matching (Levenshtein distance)
//! - Round selection with an unbiased shuffle
//! - The quiz session state machine
//! - Leaderboard qualification

pub mod error;
pub mod highscore;
pub mod matching;
pub mod selector;
pub mod session;
pub mod types;

pub use error::{CategoryParseError, SessionError, ValidationError};
pub use highscore::{qualifies, validate_player_name, LEADERBOARD_SIZE};
pub use matching::{is_correct, judge, levenshtein_distance, Judgement, MAX_TYPO_DISTANCE};
pub use selector::{active_categories, select_rounds, ROUNDS_PER_SESSION};
pub use session::{
    ConfirmAction, GuessOutcome, Phase, QuizSession, SessionResult, SessionSnapshot, WinTier,
};
pub use types::{
    Category, CategoryChoice, HighScore, HighScoreDraft, Identity, Question, QuestionDraft,
    ANONYMOUS_SENTINEL,
};
