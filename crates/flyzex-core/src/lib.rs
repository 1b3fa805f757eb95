//! FlyzexBot core — guild application lifecycle, storage, and insights
//!
//! This library provides everything the bot needs that is not Telegram:
//! the JSON-backed guild store, the application intake state machine,
//! configuration loading, dashboard analytics, and Persian localization.
//!
//! # Module Structure
//!
//! - `application`: domain types and the intake/review state machine
//! - `storage`: persistent guild state (applications, XP, cups, admins)
//! - `analytics`: aggregate insights for the dashboard
//! - `config`: settings file + environment loading
//! - `i18n`: fluent-based localization helpers

pub mod analytics;
pub mod application;
pub mod config;
pub mod error;
pub mod i18n;
pub mod storage;

// Re-export commonly used types for convenience
pub use application::{Answer, Application, ApplicationStatus, IntakeSession, IntakeStep};
pub use config::Settings;
pub use error::{AppError, AppResult};
pub use storage::{ReviewOutcome, Storage, SubmitOutcome};
