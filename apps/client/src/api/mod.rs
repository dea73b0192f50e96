//! HTTP client for the word-link backend and the profile service.

pub mod error;

pub use error::ApiError;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wordlink_core::{HighScore, HighScoreDraft, Identity, Question, QuestionDraft};

const QUESTIONS_PATH: &str = "/api/word-link-hub";
const USERS_PATH: &str = "/api/users";
const HIGH_SCORE_PATH: &str = "/api/high-score";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CLIENT_USER_AGENT: &str = concat!("wordlink/", env!("CARGO_PKG_VERSION"));

/// Public profile of an identity, as served by the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Profile {
    /// Full name when known, otherwise the login.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

/// Image attached to a question upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Inner state shared across clones.
struct ApiClientInner {
    client: Client,
    backend_url: String,
    profile_url: String,
    session_cookie: Option<String>,
}

/// Backend client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl ApiClient {
    /// Create a client for the given backend and profile service.
    pub fn new(backend_url: &str, profile_url: &str, session_cookie: Option<String>) -> Self {
        Self::with_timeout(backend_url, profile_url, session_cookie, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Like [`ApiClient::new`], with a per-request timeout.
    pub fn with_timeout(
        backend_url: &str,
        profile_url: &str,
        session_cookie: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            warn!(error = %e, "failed to build HTTP client with timeout, using defaults");
            Client::new()
        });
        Self {
            inner: Arc::new(ApiClientInner {
                client,
                backend_url: backend_url.trim_end_matches('/').to_string(),
                profile_url: profile_url.trim_end_matches('/').to_string(),
                session_cookie,
            }),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.inner.backend_url
    }

    /// Whether requests carry a session cookie.
    pub fn has_session(&self) -> bool {
        self.inner.session_cookie.is_some()
    }

    // === Questions ===

    pub async fn all_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json(QUESTIONS_PATH).await
    }

    /// Questions flagged active, the pool quizzes are drawn from.
    pub async fn active_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json(&format!("{QUESTIONS_PATH}/active")).await
    }

    pub async fn question(&self, id: &str) -> Result<Question, ApiError> {
        self.get_json(&format!("{QUESTIONS_PATH}/{id}")).await
    }

    /// Create a question. The draft is validated locally first.
    pub async fn create_question(
        &self,
        draft: &QuestionDraft,
        image: Option<ImageUpload>,
    ) -> Result<Question, ApiError> {
        draft.validate()?;
        let form = question_form(draft, image)?;
        let resp = self
            .request(self.inner.client.post(self.backend(QUESTIONS_PATH)))
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        parse_json(check(resp).await?).await
    }

    /// Replace a question. The draft is validated locally first.
    pub async fn update_question(
        &self,
        id: &str,
        draft: &QuestionDraft,
        image: Option<ImageUpload>,
    ) -> Result<Question, ApiError> {
        draft.validate()?;
        let form = question_form(draft, image)?;
        let url = self.backend(&format!("{QUESTIONS_PATH}/{id}"));
        let resp = self
            .request(self.inner.client.put(url))
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        parse_json(check(resp).await?).await
    }

    pub async fn delete_question(&self, id: &str) -> Result<(), ApiError> {
        let url = self.backend(&format!("{QUESTIONS_PATH}/{id}"));
        self.send_empty(self.inner.client.delete(url)).await
    }

    /// Flip a question's active flag. Only its owner may do this.
    pub async fn toggle_active(&self, id: &str) -> Result<Question, ApiError> {
        let url = self.backend(&format!("{USERS_PATH}/{id}/toggle-active"));
        let resp = self
            .request(self.inner.client.put(url))
            .send()
            .await
            .map_err(network)?;
        parse_json(check(resp).await?).await
    }

    // === Users ===

    /// Identity the backend associates with our session.
    pub async fn current_identity(&self) -> Result<Identity, ApiError> {
        let url = self.backend(&format!("{USERS_PATH}/me"));
        debug!(%url, "GET");
        let resp = self
            .request(self.inner.client.get(url))
            .send()
            .await
            .map_err(network)?;
        let text = check(resp)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(Identity::from(text.as_str()))
    }

    /// Questions created by `owner`.
    pub async fn my_questions(&self, owner: &Identity) -> Result<Vec<Question>, ApiError> {
        if owner.is_anonymous() {
            return Err(ApiError::NotAuthenticated);
        }
        self.get_json(&format!("{USERS_PATH}/me/my-questions/{}", owner.as_str()))
            .await
    }

    pub async fn favorite_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json(&format!("{USERS_PATH}/favorites")).await
    }

    pub async fn add_favorite(&self, question_id: &str) -> Result<(), ApiError> {
        let url = self.backend(&format!("{USERS_PATH}/favorites/{question_id}"));
        self.send_empty(self.inner.client.post(url)).await
    }

    pub async fn remove_favorite(&self, question_id: &str) -> Result<(), ApiError> {
        let url = self.backend(&format!("{USERS_PATH}/favorites/{question_id}"));
        self.send_empty(self.inner.client.delete(url)).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.backend(&format!("{USERS_PATH}/logout"));
        self.send_empty(self.inner.client.post(url)).await
    }

    // === High scores ===

    pub async fn high_scores(&self) -> Result<Vec<HighScore>, ApiError> {
        self.get_json(HIGH_SCORE_PATH).await
    }

    /// Submit a leaderboard entry.
    ///
    /// The backend answers with an empty body when the entry does not beat
    /// the current board; that yields `Ok(None)`.
    pub async fn submit_high_score(
        &self,
        draft: &HighScoreDraft,
    ) -> Result<Option<HighScore>, ApiError> {
        debug!(player = %draft.player_name, mistakes = draft.mistakes, "submitting high score");
        let resp = self
            .request(self.inner.client.post(self.backend(HIGH_SCORE_PATH)))
            .json(draft)
            .send()
            .await
            .map_err(network)?;
        let body = check(resp).await?.text().await.map_err(network)?;
        parse_optional(&body)
    }

    // === Profiles ===

    /// Look up the public profile of a signed-in identity.
    pub async fn profile(&self, identity: &Identity) -> Result<Profile, ApiError> {
        if identity.is_anonymous() {
            return Err(ApiError::NotAuthenticated);
        }
        let url = format!("{}/user/{}", self.inner.profile_url, identity.as_str());
        debug!(%url, "GET");
        let resp = self
            .inner
            .client
            .get(&url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(network)?;
        parse_json(check(resp).await?).await
    }

    // === Helpers ===

    fn backend(&self, path: &str) -> String {
        format!("{}{}", self.inner.backend_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.inner.session_cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.backend(path);
        debug!(%url, "GET");
        let resp = self
            .request(self.inner.client.get(url))
            .send()
            .await
            .map_err(network)?;
        parse_json(check(resp).await?).await
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let resp = self.request(builder).send().await.map_err(network)?;
        check(resp).await?;
        Ok(())
    }
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse a body that may be empty or `null`.
fn parse_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Map non-success statuses to errors.
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    match status {
        StatusCode::BAD_REQUEST => Err(ApiError::Validation(validation_messages(&message))),
        StatusCode::UNAUTHORIZED => Err(ApiError::NotAuthenticated),
        _ => Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Turn a `{ field: message }` body into `field: message` lines.
fn validation_messages(body: &str) -> Vec<String> {
    match serde_json::from_str::<BTreeMap<String, String>>(body) {
        Ok(fields) if !fields.is_empty() => fields
            .into_iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect(),
        _ if body.trim().is_empty() => vec!["request rejected".to_string()],
        _ => vec![body.trim().to_string()],
    }
}

fn question_form(draft: &QuestionDraft, image: Option<ImageUpload>) -> Result<Form, ApiError> {
    let json = serde_json::to_string(draft).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let dto = Part::text(json)
        .mime_str("application/json")
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let mut form = Form::new().part("questionModelDto", dto);

    if let Some(image) = image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        form = form.part("image", part);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_from_field_map() {
        let body = r#"{"title":"Title must be at least 3 characters long","clueWords":"There must be at least 4 clue words"}"#;
        assert_eq!(
            validation_messages(body),
            vec![
                "clueWords: There must be at least 4 clue words".to_string(),
                "title: Title must be at least 3 characters long".to_string(),
            ]
        );
    }

    #[test]
    fn test_validation_messages_plain_body() {
        assert_eq!(validation_messages(" bad input "), vec!["bad input".to_string()]);
        assert_eq!(validation_messages(""), vec!["request rejected".to_string()]);
    }

    #[test]
    fn test_parse_optional_body() {
        assert_eq!(parse_optional::<Profile>("").unwrap(), None);
        assert_eq!(parse_optional::<Profile>("  null ").unwrap(), None);
        let profile = parse_optional::<Profile>(r#"{"login":"octocat"}"#).unwrap();
        assert_eq!(profile.map(|p| p.login), Some("octocat".to_string()));
        assert!(matches!(
            parse_optional::<Profile>("{"),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/", "https://api.github.com/", None);
        assert_eq!(client.backend_url(), "http://localhost:8080");
        assert_eq!(
            client.backend("/api/high-score"),
            "http://localhost:8080/api/high-score"
        );
        assert!(!client.has_session());
    }

    #[test]
    fn test_profile_display_name() {
        let mut profile = Profile {
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            avatar_url: None,
            html_url: None,
            location: None,
            bio: None,
        };
        assert_eq!(profile.display_name(), "The Octocat");
        profile.name = Some("  ".to_string());
        assert_eq!(profile.display_name(), "octocat");
    }

    #[test]
    fn test_profile_from_service_json() {
        let profile: Profile = serde_json::from_str(
            r#"{"login":"octocat","id":1,"avatar_url":"https://x/a.png","html_url":"https://x/octocat","name":null}"#,
        )
        .unwrap();
        assert_eq!(profile.login, "octocat");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://x/a.png"));
        assert_eq!(profile.name, None);
    }
}
