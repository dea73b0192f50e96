//! Common test utilities for client integration tests.
//!
//! Provides an in-memory fake of the word-link backend and profile service,
//! served by axum on an ephemeral local port, plus an in-process
//! `QuizBackend` for driver tests that must not touch the network.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use wordlink_client::api::{ApiClient, ApiError, Profile};
use wordlink_client::catalog::QuizBackend;
use wordlink_client::config::ClientConfig;
use wordlink_client::prefs::SqlitePreferences;
use wordlink_client::state::AppState;
use wordlink_core::highscore::sort_by_rank;
use wordlink_core::{
    HighScore, HighScoreDraft, Identity, Question, QuestionDraft, LEADERBOARD_SIZE,
};

const SESSION_PREFIX: &str = "SESSION=";

/// Mutable backend data shared with the test body.
#[derive(Default)]
pub struct FakeData {
    pub questions: Vec<Question>,
    pub high_scores: Vec<HighScore>,
    pub favorites: HashMap<String, BTreeSet<String>>,
    pub profiles: HashMap<String, Profile>,
    pub fail_high_scores: bool,
    pub logged_out: Vec<String>,
}

type Shared = Arc<Mutex<FakeData>>;

/// Fake backend listening on 127.0.0.1.
pub struct FakeBackend {
    pub data: Shared,
    pub url: String,
    server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        Self::start_with(FakeData::default()).await
    }

    pub async fn start_with(data: FakeData) -> Self {
        let data = Arc::new(Mutex::new(data));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let app = router(data.clone());

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend failed");
        });

        Self {
            data,
            url: format!("http://{addr}"),
            server,
        }
    }

    /// Client without a session cookie.
    pub fn anonymous_client(&self) -> ApiClient {
        ApiClient::new(&self.url, &self.url, None)
    }

    /// Client logged in as `user`.
    pub fn client_for(&self, user: &str) -> ApiClient {
        ApiClient::new(&self.url, &self.url, Some(format!("{SESSION_PREFIX}{user}")))
    }

    /// App state talking to this backend, signed in as `user` when given.
    pub fn app_state(&self, user: Option<&str>) -> AppState {
        let url = self.url.clone();
        let cookie = user.map(|u| format!("{SESSION_PREFIX}{u}"));
        let config = ClientConfig::from_lookup(|key| match key {
            "WORDLINK_BACKEND_URL" | "WORDLINK_PROFILE_URL" => Some(url.clone()),
            "WORDLINK_SESSION_COOKIE" => cookie.clone(),
            "WORDLINK_DATA_DIR" => Some("/tmp/wordlink-client-tests".to_string()),
            _ => None,
        });
        let preferences = SqlitePreferences::open_in_memory().expect("in-memory preferences");
        let identity = user.map(Identity::from).unwrap_or_default();
        AppState::new(config, preferences, identity)
    }

    pub fn data(&self) -> std::sync::MutexGuard<'_, FakeData> {
        self.data.lock().unwrap()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(data: Shared) -> Router {
    Router::new()
        .route(
            "/api/word-link-hub",
            get(all_questions).post(create_question),
        )
        .route("/api/word-link-hub/active", get(active_questions))
        .route(
            "/api/word-link-hub/:id",
            get(question_by_id)
                .put(update_question)
                .delete(delete_question),
        )
        .route("/api/users/me", get(me))
        .route("/api/users/me/my-questions/:github_id", get(my_questions))
        .route("/api/users/favorites", get(favorites))
        .route(
            "/api/users/favorites/:question_id",
            post(add_favorite).delete(remove_favorite),
        )
        .route("/api/users/logout", post(logout))
        .route("/api/users/:id/toggle-active", put(toggle_active))
        .route("/api/high-score", get(high_scores).post(add_high_score))
        .route("/user/:id", get(profile))
        .with_state(data)
}

fn session_user(headers: &HeaderMap) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie
        .split(';')
        .find_map(|c| c.trim().strip_prefix(SESSION_PREFIX))
        .map(str::to_string)
}

fn require_user(headers: &HeaderMap) -> Result<String, Response> {
    session_user(headers).ok_or_else(|| StatusCode::UNAUTHORIZED.into_response())
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "You do not have permission").into_response()
}

fn not_found(id: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("No question found with id: {id}")).into_response()
}

async fn all_questions(State(data): State<Shared>) -> Json<Vec<Question>> {
    Json(data.lock().unwrap().questions.clone())
}

async fn active_questions(State(data): State<Shared>) -> Json<Vec<Question>> {
    let data = data.lock().unwrap();
    Json(data.questions.iter().filter(|q| q.active).cloned().collect())
}

async fn question_by_id(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let data = data.lock().unwrap();
    match data.questions.iter().find(|q| q.id == id) {
        Some(q) => Json(q.clone()).into_response(),
        None => not_found(&id),
    }
}

/// Pull the DTO and optional image URL out of a question upload.
async fn read_question_form(
    mut multipart: Multipart,
) -> Result<(QuestionDraft, Option<String>), Response> {
    let mut draft = None;
    let mut image_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response())?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("questionModelDto") => {
                let bytes = field.bytes().await.unwrap();
                draft = Some(serde_json::from_slice::<QuestionDraft>(&bytes).map_err(|e| {
                    (StatusCode::BAD_REQUEST, e.to_string()).into_response()
                })?);
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.unwrap();
                if !bytes.is_empty() {
                    image_url = Some(format!("https://images.example/{file_name}"));
                }
            }
            _ => {}
        }
    }

    let draft = draft.ok_or_else(|| {
        (StatusCode::BAD_REQUEST, "missing questionModelDto").into_response()
    })?;
    if let Err(wordlink_core::ValidationError::InvalidQuestion(messages)) = draft.validate() {
        let fields: HashMap<String, String> = messages
            .into_iter()
            .filter_map(|m| m.split_once(": ").map(|(f, msg)| (f.to_string(), msg.to_string())))
            .collect();
        return Err((StatusCode::BAD_REQUEST, Json(fields)).into_response());
    }
    Ok((draft, image_url))
}

async fn create_question(
    State(data): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let (draft, image_url) = match read_question_form(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    let question = Question {
        id: Uuid::new_v4().to_string(),
        title: draft.title,
        category: draft.category,
        clue_words: draft.clue_words,
        solution_word: draft.solution_word,
        answer_explanation: draft.answer_explanation,
        active: draft.is_active,
        owner: Identity::User(user),
        image_url,
    };
    data.lock().unwrap().questions.push(question.clone());
    (StatusCode::CREATED, Json(question)).into_response()
}

async fn update_question(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let (draft, image_url) = match read_question_form(multipart).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    let mut data = data.lock().unwrap();
    let Some(question) = data.questions.iter_mut().find(|q| q.id == id) else {
        return not_found(&id);
    };
    if question.owner.as_str() != user {
        return forbidden();
    }
    question.title = draft.title;
    question.category = draft.category;
    question.clue_words = draft.clue_words;
    question.solution_word = draft.solution_word;
    question.answer_explanation = draft.answer_explanation;
    question.active = draft.is_active;
    question.image_url = image_url.or(draft.image_url);
    Json(question.clone()).into_response()
}

async fn delete_question(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut data = data.lock().unwrap();
    let Some(pos) = data.questions.iter().position(|q| q.id == id) else {
        return not_found(&id);
    };
    if data.questions[pos].owner.as_str() != user {
        return forbidden();
    }
    data.questions.remove(pos);
    StatusCode::NO_CONTENT.into_response()
}

async fn toggle_active(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut data = data.lock().unwrap();
    let Some(question) = data.questions.iter_mut().find(|q| q.id == id) else {
        return not_found(&id);
    };
    if question.owner.as_str() != user {
        return forbidden();
    }
    question.active = !question.active;
    Json(question.clone()).into_response()
}

async fn me(headers: HeaderMap) -> String {
    session_user(&headers).unwrap_or_else(|| wordlink_core::ANONYMOUS_SENTINEL.to_string())
}

async fn my_questions(
    State(data): State<Shared>,
    Path(github_id): Path<String>,
) -> Json<Vec<Question>> {
    let data = data.lock().unwrap();
    Json(
        data.questions
            .iter()
            .filter(|q| q.owner.as_str() == github_id)
            .cloned()
            .collect(),
    )
}

async fn favorites(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let data = data.lock().unwrap();
    let ids = data.favorites.get(&user).cloned().unwrap_or_default();
    let questions: Vec<Question> = data
        .questions
        .iter()
        .filter(|q| ids.contains(&q.id))
        .cloned()
        .collect();
    Json(questions).into_response()
}

async fn add_favorite(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    data.lock()
        .unwrap()
        .favorites
        .entry(user)
        .or_default()
        .insert(question_id);
    StatusCode::CREATED.into_response()
}

async fn remove_favorite(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Some(ids) = data.lock().unwrap().favorites.get_mut(&user) {
        ids.remove(&question_id);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn logout(State(data): State<Shared>, headers: HeaderMap) -> StatusCode {
    if let Some(user) = session_user(&headers) {
        data.lock().unwrap().logged_out.push(user);
    }
    StatusCode::OK
}

async fn high_scores(State(data): State<Shared>) -> Response {
    let data = data.lock().unwrap();
    if data.fail_high_scores {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    let rows: Vec<_> = data.high_scores.iter().map(backend_row).collect();
    Json(rows).into_response()
}

/// A leaderboard row as the backend writes it: `date` is a `LocalDateTime`
/// with no offset.
fn backend_row(score: &HighScore) -> serde_json::Value {
    json!({
        "id": score.id,
        "playerName": score.player_name,
        "githubId": score.owner,
        "categoryEnum": score.category,
        "wrongAnswerCount": score.mistakes,
        "scoreTime": score.time_secs,
        "date": score.date.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
    })
}

async fn add_high_score(
    State(data): State<Shared>,
    Json(draft): Json<HighScoreDraft>,
) -> Response {
    if draft.player_name.trim().chars().count() < 3 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "playerName": "Player name must be at least 3 characters long" })),
        )
            .into_response();
    }

    let mut data = data.lock().unwrap();
    if data.fail_high_scores {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }

    // Only the best ten are kept; a worse or equal entry is not stored
    let mut board = data.high_scores.clone();
    sort_by_rank(&mut board);
    if board.len() >= LEADERBOARD_SIZE {
        let worst = &board[LEADERBOARD_SIZE - 1];
        let is_worse = draft.mistakes > worst.mistakes
            || (draft.mistakes == worst.mistakes && draft.time_secs >= worst.time_secs);
        if is_worse {
            return StatusCode::CREATED.into_response();
        }
        let worst_id = worst.id.clone();
        data.high_scores.retain(|s| s.id != worst_id);
    }

    let saved = HighScore {
        id: Uuid::new_v4().to_string(),
        player_name: draft.player_name,
        owner: draft.owner,
        category: draft.category,
        mistakes: draft.mistakes,
        time_secs: draft.time_secs,
        date: draft.date,
    };
    data.high_scores.push(saved.clone());
    (StatusCode::CREATED, Json(backend_row(&saved))).into_response()
}

async fn profile(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if headers.get(header::USER_AGENT).is_none() {
        return (StatusCode::FORBIDDEN, "User-Agent required").into_response();
    }
    match data.lock().unwrap().profiles.get(&id) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

// === In-process backend for driver tests ===

#[derive(Default)]
struct MemoryInner {
    questions: Vec<Question>,
    high_scores: Vec<HighScore>,
    fail_high_scores: bool,
    stall_high_scores: bool,
    fail_submit: bool,
    reject_submit: bool,
    stall_submit: bool,
    leaderboard_fetches: usize,
    submit_attempts: usize,
    submitted: Vec<HighScoreDraft>,
}

/// `QuizBackend` that keeps everything in memory and counts calls.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryBackend {
    pub fn new(questions: Vec<Question>) -> Self {
        let backend = Self::default();
        backend.inner.lock().unwrap().questions = questions;
        backend
    }

    pub fn with_high_scores(self, scores: Vec<HighScore>) -> Self {
        self.inner.lock().unwrap().high_scores = scores;
        self
    }

    pub fn fail_high_scores(&self) {
        self.inner.lock().unwrap().fail_high_scores = true;
    }

    /// Leaderboard requests never complete.
    pub fn stall_high_scores(&self) {
        self.inner.lock().unwrap().stall_high_scores = true;
    }

    pub fn set_fail_submit(&self, fail: bool) {
        self.inner.lock().unwrap().fail_submit = fail;
    }

    /// Submissions are accepted but not stored, like a board that moved on.
    pub fn set_reject_submit(&self, reject: bool) {
        self.inner.lock().unwrap().reject_submit = reject;
    }

    /// Submissions never complete.
    pub fn stall_submit(&self) {
        self.inner.lock().unwrap().stall_submit = true;
    }

    pub fn leaderboard_fetches(&self) -> usize {
        self.inner.lock().unwrap().leaderboard_fetches
    }

    pub fn submit_attempts(&self) -> usize {
        self.inner.lock().unwrap().submit_attempts
    }

    pub fn submitted(&self) -> Vec<HighScoreDraft> {
        self.inner.lock().unwrap().submitted.clone()
    }
}

impl QuizBackend for MemoryBackend {
    async fn active_questions(&self) -> Result<Vec<Question>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.questions.iter().filter(|q| q.active).cloned().collect())
    }

    async fn high_scores(&self) -> Result<Vec<HighScore>, ApiError> {
        let stall = {
            let mut inner = self.inner.lock().unwrap();
            inner.leaderboard_fetches += 1;
            inner.stall_high_scores
        };
        if stall {
            std::future::pending::<()>().await;
        }

        let inner = self.inner.lock().unwrap();
        if inner.fail_high_scores {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        Ok(inner.high_scores.clone())
    }

    async fn submit_high_score(
        &self,
        draft: &HighScoreDraft,
    ) -> Result<Option<HighScore>, ApiError> {
        let stall = {
            let mut inner = self.inner.lock().unwrap();
            inner.submit_attempts += 1;
            inner.stall_submit
        };
        if stall {
            std::future::pending::<()>().await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.fail_submit {
            return Err(ApiError::Backend {
                status: 500,
                message: "database unavailable".to_string(),
            });
        }
        if inner.reject_submit {
            return Ok(None);
        }
        inner.submitted.push(draft.clone());
        let saved = HighScore {
            id: format!("hs{}", inner.submitted.len()),
            player_name: draft.player_name.clone(),
            owner: draft.owner.clone(),
            category: draft.category,
            mistakes: draft.mistakes,
            time_secs: draft.time_secs,
            date: draft.date,
        };
        inner.high_scores.push(saved.clone());
        Ok(Some(saved))
    }
}
