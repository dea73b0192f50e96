//! Local preference persistence.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::PrefsError;
pub use repository::{
    load_profile_tab, save_profile_tab, PreferenceStore, ProfileTab, SqlitePreferences,
};
