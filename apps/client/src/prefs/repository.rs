//! Preference storage.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::prefs::error::PrefsError;
use crate::prefs::schema::{SCHEMA, SCHEMA_VERSION};

type Result<T> = std::result::Result<T, PrefsError>;

const PROFILE_TAB_KEY: &str = "activeTab";

/// Key/value preference storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Section shown on the profile screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileTab {
    #[default]
    Profile,
    AddQuestion,
    MyQuestions,
    Favorites,
}

impl ProfileTab {
    pub const ALL: [ProfileTab; 4] = [
        Self::Profile,
        Self::AddQuestion,
        Self::MyQuestions,
        Self::Favorites,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::AddQuestion => "add-question",
            Self::MyQuestions => "my-questions",
            Self::Favorites => "favorites",
        }
    }
}

impl FromStr for ProfileTab {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s.trim())
            .ok_or_else(|| PrefsError::InvalidValue {
                key: PROFILE_TAB_KEY.to_string(),
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProfileTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last selected profile tab; unknown stored values fall back to the default.
pub fn load_profile_tab<S: PreferenceStore + ?Sized>(store: &S) -> Result<ProfileTab> {
    Ok(store
        .get(PROFILE_TAB_KEY)?
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

pub fn save_profile_tab<S: PreferenceStore + ?Sized>(store: &S, tab: ProfileTab) -> Result<()> {
    store.set(PROFILE_TAB_KEY, tab.as_str())
}

/// SQLite-backed preference store.
pub struct SqlitePreferences {
    conn: Connection,
}

impl SqlitePreferences {
    /// Open database at path, creating it and its directory if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (id, version) VALUES (1, ?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| {
                row.get(0)
            })?)
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(key, value, "saving preference");
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
