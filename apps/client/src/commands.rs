//! Question management actions offered by the front end.
//!
//! Each action needs a signed-in identity; the backend checks ownership.

use tracing::info;

use wordlink_core::{Question, QuestionDraft};

use crate::api::ApiError;
use crate::state::AppState;

fn require_sign_in(state: &AppState) -> Result<(), ApiError> {
    if state.identity.is_anonymous() {
        Err(ApiError::NotAuthenticated)
    } else {
        Ok(())
    }
}

/// Create a question, or replace `question_id` when given.
pub async fn save_question(
    state: &AppState,
    question_id: Option<&str>,
    draft: &QuestionDraft,
) -> Result<Question, ApiError> {
    require_sign_in(state)?;
    let saved = match question_id {
        Some(id) => state.api.update_question(id, draft, None).await?,
        None => state.api.create_question(draft, None).await?,
    };
    info!(id = %saved.id, updated = question_id.is_some(), "question saved");
    Ok(saved)
}

/// Fetch a question to edit.
pub async fn question_for_edit(state: &AppState, id: &str) -> Result<Question, ApiError> {
    require_sign_in(state)?;
    state.api.question(id).await
}

pub async fn delete_question(state: &AppState, id: &str) -> Result<(), ApiError> {
    require_sign_in(state)?;
    state.api.delete_question(id).await?;
    info!(%id, "question deleted");
    Ok(())
}

/// Flip whether a question is offered for play.
pub async fn toggle_active(state: &AppState, id: &str) -> Result<Question, ApiError> {
    require_sign_in(state)?;
    state.api.toggle_active(id).await
}

/// Returns whether the question is now a favorite.
pub async fn toggle_favorite(state: &mut AppState, id: &str) -> Result<bool, ApiError> {
    // Pick up favorites added elsewhere before deciding the direction
    if state.favorites.ids().next().is_none() {
        state.favorites.refresh().await?;
    }
    state.favorites.toggle(id).await
}

/// Lines to show for a failed action.
pub fn error_lines(error: &ApiError) -> Vec<String> {
    match error {
        ApiError::Validation(messages) => messages.clone(),
        other => vec![other.to_string()],
    }
}
