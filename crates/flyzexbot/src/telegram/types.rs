//! Handler types and shared dependencies.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::{Message, User};

use flyzex_core::{IntakeSession, Settings, Storage};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub storage: Arc<Storage>,
    pub settings: Arc<Settings>,
    /// Active intake sessions keyed by applicant user id.
    pub sessions: Arc<DashMap<i64, IntakeSession>>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(storage: Arc<Storage>, settings: Arc<Settings>) -> Self {
        Self {
            storage,
            settings,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// True for the configured owner or any stored admin.
    pub async fn is_reviewer(&self, user_id: i64) -> bool {
        user_id == self.settings.telegram.owner_id || self.storage.is_admin(user_id).await
    }
}

/// Applicant info extracted from a Telegram message or callback.
#[derive(Clone)]
pub struct UserInfo {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub language_code: Option<String>,
}

impl UserInfo {
    /// Extract user info from a Telegram message.
    pub fn from_message(msg: &Message) -> Option<Self> {
        msg.from.as_ref().map(Self::from_user)
    }

    /// Extract user info from a Telegram user.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: i64::try_from(user.id.0).unwrap_or(0),
            username: user.username.clone(),
            full_name: user.full_name(),
            language_code: user.language_code.clone(),
        }
    }
}
