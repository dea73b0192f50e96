//! Identity display names backed by the profile service.

use std::collections::HashMap;

use tracing::warn;

use wordlink_core::Identity;

use crate::api::{ApiClient, Profile};

/// Shown for the anonymous identity.
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// Caches profile lookups by identity.
pub struct ProfileDirectory {
    api: ApiClient,
    cache: HashMap<String, Profile>,
}

impl ProfileDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: HashMap::new(),
        }
    }

    /// Profile for `identity`, fetched once. `None` when anonymous or the lookup fails.
    pub async fn profile(&mut self, identity: &Identity) -> Option<Profile> {
        let Identity::User(id) = identity else {
            return None;
        };
        if let Some(profile) = self.cache.get(id) {
            return Some(profile.clone());
        }

        match self.api.profile(identity).await {
            Ok(profile) => {
                self.cache.insert(id.clone(), profile.clone());
                Some(profile)
            }
            Err(e) => {
                warn!(identity = %id, error = %e, "profile lookup failed");
                None
            }
        }
    }

    /// Human readable name, falling back to the raw identity.
    pub async fn display_name(&mut self, identity: &Identity) -> String {
        match identity {
            Identity::Anonymous => ANONYMOUS_DISPLAY_NAME.to_string(),
            Identity::User(id) => match self.profile(identity).await {
                Some(profile) => profile.display_name().to_string(),
                None => id.clone(),
            },
        }
    }
}
