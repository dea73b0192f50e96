//! Application state.

use tracing::{info, warn};

use wordlink_core::Identity;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::favorites::Favorites;
use crate::identity::ProfileDirectory;
use crate::prefs::{load_profile_tab, save_profile_tab, PrefsError, ProfileTab, SqlitePreferences};

/// Everything the front end holds besides the running quiz.
pub struct AppState {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub identity: Identity,
    pub preferences: SqlitePreferences,
    pub profile_tab: ProfileTab,
    pub favorites: Favorites,
    pub profiles: ProfileDirectory,
}

impl AppState {
    pub fn new(config: ClientConfig, preferences: SqlitePreferences, identity: Identity) -> Self {
        let api = ApiClient::with_timeout(
            &config.backend_url,
            &config.profile_url,
            config.session_cookie.clone(),
            config.request_timeout,
        );
        let profile_tab = match load_profile_tab(&preferences) {
            Ok(tab) => tab,
            Err(e) => {
                warn!(error = %e, "failed to read profile tab, using default");
                ProfileTab::default()
            }
        };

        Self {
            favorites: Favorites::new(api.clone(), identity.clone()),
            profiles: ProfileDirectory::new(api.clone()),
            config,
            api,
            identity,
            preferences,
            profile_tab,
        }
    }

    /// Open local storage and ask the backend who we are.
    pub async fn initialize(config: ClientConfig) -> Result<Self, PrefsError> {
        let preferences = SqlitePreferences::open(config.preferences_path())?;
        let api = ApiClient::with_timeout(
            &config.backend_url,
            &config.profile_url,
            config.session_cookie.clone(),
            config.request_timeout,
        );

        let identity = match api.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "identity lookup failed, playing anonymously");
                Identity::Anonymous
            }
        };
        info!(identity = %identity, backend = %config.backend_url, "client initialized");

        Ok(Self::new(config, preferences, identity))
    }

    /// Switch profile tab and remember it for the next run.
    pub fn set_profile_tab(&mut self, tab: ProfileTab) -> Result<(), PrefsError> {
        save_profile_tab(&self.preferences, tab)?;
        self.profile_tab = tab;
        Ok(())
    }
}
