//! Core types for the word-link quiz.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CategoryParseError, ValidationError};

/// Owner id used by the backend when nobody is logged in.
pub const ANONYMOUS_SENTINEL: &str = "anonymousUser";

/// Question category.
///
/// The declaration order is significant: it drives display order and the
/// list of categories offered for play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Animals,
    Art,
    Brands,
    FictionalCharacters,
    FoodAndDrink,
    General,
    Geography,
    History,
    Literature,
    Mathematics,
    MoviesAndTv,
    Music,
    Nature,
    Objects,
    Occupations,
    Politics,
    Science,
    Sports,
}

impl Category {
    /// Every category, in canonical order.
    pub const ALL: [Category; 18] = [
        Self::Animals,
        Self::Art,
        Self::Brands,
        Self::FictionalCharacters,
        Self::FoodAndDrink,
        Self::General,
        Self::Geography,
        Self::History,
        Self::Literature,
        Self::Mathematics,
        Self::MoviesAndTv,
        Self::Music,
        Self::Nature,
        Self::Objects,
        Self::Occupations,
        Self::Politics,
        Self::Science,
        Self::Sports,
    ];

    /// Wire name as used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Animals => "ANIMALS",
            Self::Art => "ART",
            Self::Brands => "BRANDS",
            Self::FictionalCharacters => "FICTIONAL_CHARACTERS",
            Self::FoodAndDrink => "FOOD_AND_DRINK",
            Self::General => "GENERAL",
            Self::Geography => "GEOGRAPHY",
            Self::History => "HISTORY",
            Self::Literature => "LITERATURE",
            Self::Mathematics => "MATHEMATICS",
            Self::MoviesAndTv => "MOVIES_AND_TV",
            Self::Music => "MUSIC",
            Self::Nature => "NATURE",
            Self::Objects => "OBJECTS",
            Self::Occupations => "OCCUPATIONS",
            Self::Politics => "POLITICS",
            Self::Science => "SCIENCE",
            Self::Sports => "SPORTS",
        }
    }

    /// Human readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Animals => "🐾 Animals",
            Self::Art => "🎨 Art",
            Self::Brands => "🏷️ Brands",
            Self::FictionalCharacters => "🦸 Fictional Characters",
            Self::FoodAndDrink => "🍔 Food & Drink",
            Self::General => "📚 General",
            Self::Geography => "🗺️ Geography",
            Self::History => "🏺 History",
            Self::Literature => "📖 Literature",
            Self::Mathematics => "➗ Mathematics",
            Self::MoviesAndTv => "🎬 Movies & TV",
            Self::Music => "🎵 Music",
            Self::Nature => "🌿 Nature",
            Self::Objects => "📦 Objects",
            Self::Occupations => "💼 Occupations",
            Self::Politics => "🏛️ Politics",
            Self::Science => "🔬 Science",
            Self::Sports => "🏅 Sports",
        }
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter chosen before a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CategoryChoice {
    #[default]
    Random,
    Only(Category),
}

impl CategoryChoice {
    const RANDOM: &'static str = "RANDOM";

    /// Whether a question of `category` belongs to this choice.
    pub fn matches(&self, category: Category) -> bool {
        match self {
            Self::Random => true,
            Self::Only(c) => *c == category,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => Self::RANDOM,
            Self::Only(c) => c.as_str(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Random => "🎲 Random",
            Self::Only(c) => c.display_name(),
        }
    }
}

impl FromStr for CategoryChoice {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::RANDOM {
            Ok(Self::Random)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl TryFrom<String> for CategoryChoice {
    type Error = CategoryParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryChoice> for String {
    fn from(choice: CategoryChoice) -> Self {
        choice.as_str().to_string()
    }
}

impl From<Category> for CategoryChoice {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

impl fmt::Display for CategoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who owns a question or a high score.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Identity {
    #[default]
    Anonymous,
    User(String),
}

impl Identity {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Anonymous => ANONYMOUS_SENTINEL,
            Self::User(id) => id,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ANONYMOUS_SENTINEL {
            Self::Anonymous
        } else {
            Self::User(trimmed.to_string())
        }
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.as_str().to_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A word-link question card as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    #[serde(rename = "categoryEnum")]
    pub category: Category,
    pub clue_words: Vec<String>,
    pub solution_word: String,
    pub answer_explanation: String,
    #[serde(rename = "isActive", alias = "active")]
    pub active: bool,
    #[serde(rename = "githubId")]
    pub owner: Identity,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Question {
    /// Active, with a non-blank solution and at least one clue, none blank.
    pub fn is_playable(&self) -> bool {
        self.active
            && !self.solution_word.trim().is_empty()
            && !self.clue_words.is_empty()
            && self.clue_words.iter().all(|c| !c.trim().is_empty())
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        !identity.is_anonymous() && self.owner == *identity
    }
}

/// Minimum length of question text fields.
pub const MIN_QUESTION_FIELD_LEN: usize = 3;
/// Minimum number of clue words per question.
pub const MIN_CLUE_WORDS: usize = 4;

/// Create/update payload for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub title: String,
    #[serde(rename = "categoryEnum")]
    pub category: Category,
    pub clue_words: Vec<String>,
    pub solution_word: String,
    pub answer_explanation: String,
    pub is_active: bool,
    #[serde(rename = "githubId")]
    pub owner: Identity,
    pub image_url: Option<String>,
}

impl QuestionDraft {
    /// Start an edit from an existing question.
    pub fn from_question(question: &Question) -> Self {
        Self {
            title: question.title.clone(),
            category: question.category,
            clue_words: question.clue_words.clone(),
            solution_word: question.solution_word.clone(),
            answer_explanation: question.answer_explanation.clone(),
            is_active: question.active,
            owner: question.owner.clone(),
            image_url: question.image_url.clone(),
        }
    }

    /// Check the same field rules the backend enforces, reporting all of them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.title.trim().chars().count() < MIN_QUESTION_FIELD_LEN {
            errors.push(format!(
                "title: Title must be at least {MIN_QUESTION_FIELD_LEN} characters long"
            ));
        }
        if self.clue_words.len() < MIN_CLUE_WORDS {
            errors.push(format!(
                "clueWords: There must be at least {MIN_CLUE_WORDS} clue words"
            ));
        }
        for (i, clue) in self.clue_words.iter().enumerate() {
            if clue.trim().chars().count() < MIN_QUESTION_FIELD_LEN {
                errors.push(format!(
                    "clueWords[{i}]: Each clue word must be at least {MIN_QUESTION_FIELD_LEN} characters long"
                ));
            }
        }
        if self.solution_word.trim().chars().count() < MIN_QUESTION_FIELD_LEN {
            errors.push(format!(
                "solutionWord: Solution Word must be at least {MIN_QUESTION_FIELD_LEN} characters long"
            ));
        }
        if self.answer_explanation.trim().chars().count() < MIN_QUESTION_FIELD_LEN {
            errors.push(format!(
                "answerExplanation: Answer Explanation must be at least {MIN_QUESTION_FIELD_LEN} characters long"
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidQuestion(errors))
        }
    }
}

/// A persisted leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub id: String,
    pub player_name: String,
    #[serde(rename = "githubId")]
    pub owner: Identity,
    #[serde(rename = "categoryEnum")]
    pub category: CategoryChoice,
    #[serde(rename = "wrongAnswerCount")]
    pub mistakes: u32,
    /// Seconds, one decimal.
    #[serde(rename = "scoreTime")]
    pub time_secs: f64,
    /// Sent without an offset; read as UTC.
    #[serde(with = "local_date_time")]
    pub date: DateTime<Utc>,
}

/// A leaderboard entry before the backend assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreDraft {
    pub player_name: String,
    #[serde(rename = "githubId")]
    pub owner: Identity,
    #[serde(rename = "categoryEnum")]
    pub category: CategoryChoice,
    #[serde(rename = "wrongAnswerCount")]
    pub mistakes: u32,
    #[serde(rename = "scoreTime")]
    pub time_secs: f64,
    #[serde(with = "local_date_time")]
    pub date: DateTime<Utc>,
}

/// Leaderboard timestamps as the backend stores them: a local date-time
/// without offset, e.g. `2025-03-05T12:00:00`. RFC 3339 input is accepted too.
pub mod local_date_time {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
    const FORMAT_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.naive_utc().format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid date-time: {raw}"))
        })
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, FORMAT_NO_SECONDS))
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}
