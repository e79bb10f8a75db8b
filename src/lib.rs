//! Adventurer Guild server
//!
//! REST JSON API for running an adventurer guild: quests and their
//! lifecycle, the adventurer roster and calendars, equipment and consumable
//! stock, and the guild ledger.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
