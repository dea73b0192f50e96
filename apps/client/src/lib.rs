pub mod api;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod driver;
pub mod editor;
pub mod favorites;
pub mod identity;
pub mod prefs;
pub mod state;
pub mod terminal;
pub mod ticker;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;
use crate::driver::QuizDriver;
use crate::state::AppState;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();

    tracing::info!("Opening preferences at {}", config.preferences_path().display());
    let state = AppState::initialize(config).await?;

    let (driver, events) = QuizDriver::new(state.api.clone(), state.identity.clone()).spawn();

    terminal::run(state, driver, events).await
}
