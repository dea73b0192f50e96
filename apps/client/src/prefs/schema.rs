//! SQLite schema for local preferences.

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA: &str = r#"
-- Key/value user preferences
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL
);
"#;
