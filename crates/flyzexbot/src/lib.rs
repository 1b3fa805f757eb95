//! FlyzexBot — Telegram bot for guild membership applications
//!
//! This library provides the bot's Telegram integration and the dashboard
//! web server; the domain itself (storage, application lifecycle, i18n)
//! lives in `flyzex-core`.
//!
//! # Module Structure
//!
//! - `cli`: command-line interface
//! - `logging`: logger initialization
//! - `telegram`: dispatcher schema, handlers, keyboards
//! - `webapp`: read-only dashboard API + static frontend serving

pub mod cli;
pub mod logging;
pub mod telegram;
pub mod webapp;

// Re-export commonly used types for convenience
pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
pub use webapp::{create_webapp_router, run_webapp_server};
