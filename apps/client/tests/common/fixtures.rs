//! Test fixtures and factory functions for creating test data.

use chrono::{TimeZone, Utc};

use wordlink_client::api::Profile;
use wordlink_core::{Category, CategoryChoice, HighScore, Identity, Question, QuestionDraft};

/// A playable question whose solution is `word{n}`.
pub fn question(n: usize, category: Category) -> Question {
    Question {
        id: format!("q{n}"),
        title: format!("Link {n}"),
        category,
        clue_words: vec![
            "river".to_string(),
            "piggy".to_string(),
            "blood".to_string(),
            "data".to_string(),
        ],
        solution_word: format!("word{n}"),
        answer_explanation: format!("Explanation {n}"),
        active: true,
        owner: Identity::User("1001".to_string()),
        image_url: None,
    }
}

/// Three ANIMALS and two SCIENCE questions.
pub fn mixed_catalog() -> Vec<Question> {
    vec![
        question(1, Category::Animals),
        question(2, Category::Animals),
        question(3, Category::Animals),
        question(4, Category::Science),
        question(5, Category::Science),
    ]
}

pub fn owned_question(n: usize, owner: &str) -> Question {
    Question {
        owner: Identity::User(owner.to_string()),
        ..question(n, Category::General)
    }
}

pub fn valid_draft() -> QuestionDraft {
    QuestionDraft {
        title: "Things with banks".to_string(),
        category: Category::Geography,
        clue_words: vec![
            "river".to_string(),
            "piggy".to_string(),
            "blood".to_string(),
            "snow".to_string(),
        ],
        solution_word: "bank".to_string(),
        answer_explanation: "River bank, piggy bank, blood bank, snow bank".to_string(),
        is_active: true,
        owner: Identity::Anonymous,
        image_url: None,
    }
}

pub fn high_score(n: usize, mistakes: u32, time_secs: f64) -> HighScore {
    HighScore {
        id: format!("hs{n}"),
        player_name: format!("Player {n}"),
        owner: Identity::Anonymous,
        category: CategoryChoice::Random,
        mistakes,
        time_secs,
        date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

/// Full leaderboard whose worst entry is 5 mistakes in 30.0 s.
pub fn full_leaderboard() -> Vec<HighScore> {
    let mut board: Vec<_> = (0..9).map(|i| high_score(i, 1, 10.0 + i as f64)).collect();
    board.push(high_score(9, 5, 30.0));
    board
}

/// Board that nothing with mistakes can beat.
pub fn perfect_leaderboard() -> Vec<HighScore> {
    (0..10).map(|i| high_score(i, 0, 1.0)).collect()
}

pub fn profile(login: &str, name: Option<&str>) -> Profile {
    Profile {
        login: login.to_string(),
        name: name.map(str::to_string),
        avatar_url: Some(format!("https://avatars.example/{login}.png")),
        html_url: Some(format!("https://github.example/{login}")),
        location: None,
        bio: None,
    }
}
