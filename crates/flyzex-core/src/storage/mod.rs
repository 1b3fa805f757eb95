//! Persistent guild state: applications, XP, cups, admins.

pub mod state;
pub mod store;

// Re-exports for convenience
pub use state::{Cup, GuildState, StatusChange};
pub use store::{ReviewOutcome, Storage, SubmitOutcome};
