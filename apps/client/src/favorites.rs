//! Favorite questions of the signed-in identity.

use std::collections::BTreeSet;

use tracing::debug;

use wordlink_core::{Identity, Question};

use crate::api::{ApiClient, ApiError};

/// Local view of the favorites set, refreshed from the backend.
pub struct Favorites {
    api: ApiClient,
    identity: Identity,
    ids: BTreeSet<String>,
}

impl Favorites {
    pub fn new(api: ApiClient, identity: Identity) -> Self {
        Self {
            api,
            identity,
            ids: BTreeSet::new(),
        }
    }

    /// Favorites need a signed-in identity.
    pub fn is_available(&self) -> bool {
        !self.identity.is_anonymous()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.ids.contains(question_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Re-fetch the favorite questions and return them.
    pub async fn refresh(&mut self) -> Result<Vec<Question>, ApiError> {
        if !self.is_available() {
            return Err(ApiError::NotAuthenticated);
        }
        let questions = self.api.favorite_questions().await?;
        self.ids = questions.iter().map(|q| q.id.clone()).collect();
        debug!(count = self.ids.len(), "refreshed favorites");
        Ok(questions)
    }

    /// Add or remove a favorite. Returns whether it is now a favorite.
    pub async fn toggle(&mut self, question_id: &str) -> Result<bool, ApiError> {
        if !self.is_available() {
            return Err(ApiError::NotAuthenticated);
        }

        if self.ids.contains(question_id) {
            self.api.remove_favorite(question_id).await?;
            self.ids.remove(question_id);
            Ok(false)
        } else {
            self.api.add_favorite(question_id).await?;
            self.ids.insert(question_id.to_string());
            Ok(true)
        }
    }
}
