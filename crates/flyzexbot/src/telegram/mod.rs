//! Telegram bot integration and handlers

pub mod bot;
pub mod dm;
pub mod group;
pub mod keyboards;
pub mod review;
pub mod schema;
pub mod types;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};

/// The bot type used throughout the handlers.
pub use teloxide::Bot;
