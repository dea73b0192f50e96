//! Data the quiz needs from the backend, with degraded fallbacks.

use std::future::Future;

use tracing::{info, warn};

use wordlink_core::highscore::sort_by_rank;
use wordlink_core::{HighScore, HighScoreDraft, Question};

use crate::api::{ApiClient, ApiError};

/// Backend operations used while playing.
pub trait QuizBackend: Send + Sync + 'static {
    fn active_questions(&self) -> impl Future<Output = Result<Vec<Question>, ApiError>> + Send;

    fn high_scores(&self) -> impl Future<Output = Result<Vec<HighScore>, ApiError>> + Send;

    /// `Ok(None)` when the backend declined to store the entry.
    fn submit_high_score(
        &self,
        draft: &HighScoreDraft,
    ) -> impl Future<Output = Result<Option<HighScore>, ApiError>> + Send;
}

impl QuizBackend for ApiClient {
    fn active_questions(&self) -> impl Future<Output = Result<Vec<Question>, ApiError>> + Send {
        ApiClient::active_questions(self)
    }

    fn high_scores(&self) -> impl Future<Output = Result<Vec<HighScore>, ApiError>> + Send {
        ApiClient::high_scores(self)
    }

    fn submit_high_score(
        &self,
        draft: &HighScoreDraft,
    ) -> impl Future<Output = Result<Option<HighScore>, ApiError>> + Send {
        ApiClient::submit_high_score(self, draft)
    }
}

/// Fetch the active catalog; an unreachable backend yields an empty one.
pub async fn active_questions_or_empty<B: QuizBackend>(backend: &B) -> Vec<Question> {
    match backend.active_questions().await {
        Ok(questions) => {
            info!(count = questions.len(), "loaded question catalog");
            questions
        }
        Err(e) => {
            warn!(error = %e, "failed to load questions, using empty catalog");
            Vec::new()
        }
    }
}

/// Fetch the leaderboard sorted best first; failures yield an empty board.
pub async fn leaderboard_or_empty<B: QuizBackend>(backend: &B) -> Vec<HighScore> {
    match backend.high_scores().await {
        Ok(mut scores) => {
            sort_by_rank(&mut scores);
            scores
        }
        Err(e) => {
            warn!(error = %e, "failed to load high scores, using empty leaderboard");
            Vec::new()
        }
    }
}
