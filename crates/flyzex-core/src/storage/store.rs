//! The guild store: an in-memory document behind a lock, saved to disk
//! after every mutation.
//!
//! Mutations take the write guard for the whole read-modify-write-save
//! cycle, so two concurrent admin actions on the same application
//! serialize and the loser observes the already-applied status.

use std::collections::VecDeque;
use std::path::PathBuf;

use itertools::Itertools;
use tokio::sync::RwLock;

use crate::analytics::{self, InsightsReport};
use crate::application::{Application, ApplicationStatus};
use crate::error::AppResult;

use super::state::{Cup, GuildState, StatusChange, STATUS_LOG_CAP};

/// Result of submitting a completed application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stored as the user's pending application.
    Accepted,
    /// The user already has a pending application.
    AlreadyPending,
    /// A previous application was already approved or denied.
    AlreadyDecided(ApplicationStatus),
}

/// Result of a review or withdrawal action.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    /// The transition applied; the updated record is returned.
    Updated(Application),
    /// The application exists but is no longer pending.
    NotPending(ApplicationStatus),
    /// The user has no application on file.
    NotFound,
}

pub struct Storage {
    path: Option<PathBuf>,
    state: RwLock<GuildState>,
}

impl Storage {
    /// A store that never touches the filesystem. Used by tests and by
    /// anything that wants the semantics without persistence.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(GuildState::default()),
        }
    }

    /// Opens the document at `path`, starting empty if it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let state = match fs_err::tokio::read(&path).await {
            Ok(bytes) if bytes.is_empty() => GuildState::default(),
            Ok(bytes) => {
                let state: GuildState = serde_json::from_slice(&bytes)?;
                log::info!(
                    "Guild document {} loaded ({} applications)",
                    path.display(),
                    state.applications.len()
                );
                state
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No guild document at {}, starting empty", path.display());
                GuildState::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// Writes the document atomically (temp file + rename).
    async fn persist(&self, state: &GuildState) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::tokio::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        fs_err::tokio::write(&tmp, &payload).await?;
        fs_err::tokio::rename(&tmp, path).await?;
        Ok(())
    }

    /// Saves the current state; mutations already save, so this is only
    /// useful for forcing a write of an untouched document.
    pub async fn save(&self) -> AppResult<()> {
        let state = self.state.read().await;
        self.persist(&state).await
    }

    // Admins

    /// Registers an admin. Returns false if already registered.
    pub async fn add_admin(&self, user_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.admins.contains(&user_id) {
            return Ok(false);
        }
        state.admins.push(user_id);
        self.persist(&state).await?;
        Ok(true)
    }

    /// Removes an admin. Returns false if the id was not registered.
    pub async fn remove_admin(&self, user_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.admins.len();
        state.admins.retain(|id| *id != user_id);
        if state.admins.len() == before {
            return Ok(false);
        }
        self.persist(&state).await?;
        Ok(true)
    }

    pub async fn is_admin(&self, user_id: i64) -> bool {
        self.state.read().await.admins.contains(&user_id)
    }

    pub async fn list_admins(&self) -> Vec<i64> {
        self.state.read().await.admins.clone()
    }

    // Applications

    /// Stores a freshly completed application.
    ///
    /// At most one pending application per user: a pending record rejects
    /// the submission, a decided (approved/denied) record rejects it too,
    /// and only a withdrawn record is replaced by the new one.
    pub async fn submit_application(&self, application: Application) -> AppResult<SubmitOutcome> {
        let mut state = self.state.write().await;
        match state.applications.get(&application.user_id) {
            Some(existing) if existing.status == ApplicationStatus::Pending => {
                return Ok(SubmitOutcome::AlreadyPending);
            }
            Some(existing) if existing.status != ApplicationStatus::Withdrawn => {
                return Ok(SubmitOutcome::AlreadyDecided(existing.status));
            }
            _ => {}
        }
        state.applications.insert(application.user_id, application);
        self.persist(&state).await?;
        Ok(SubmitOutcome::Accepted)
    }

    /// The user's application on file, if any.
    pub async fn application(&self, user_id: i64) -> Option<Application> {
        self.state.read().await.applications.get(&user_id).cloned()
    }

    pub async fn has_pending(&self, user_id: i64) -> bool {
        self.state
            .read()
            .await
            .applications
            .get(&user_id)
            .is_some_and(|a| a.status == ApplicationStatus::Pending)
    }

    /// All pending applications, oldest first.
    pub async fn pending_applications(&self) -> Vec<Application> {
        self.state
            .read()
            .await
            .applications
            .values()
            .filter(|a| a.status == ApplicationStatus::Pending)
            .sorted_by_key(|a| a.created_at)
            .cloned()
            .collect()
    }

    pub async fn approve(&self, user_id: i64) -> AppResult<ReviewOutcome> {
        self.set_status(user_id, ApplicationStatus::Approved).await
    }

    pub async fn deny(&self, user_id: i64) -> AppResult<ReviewOutcome> {
        self.set_status(user_id, ApplicationStatus::Denied).await
    }

    pub async fn withdraw(&self, user_id: i64) -> AppResult<ReviewOutcome> {
        self.set_status(user_id, ApplicationStatus::Withdrawn).await
    }

    /// The single transition path for review and withdrawal. Rejecting
    /// non-pending records here is what makes approve/deny idempotent:
    /// a second press finds the record decided and no side effect runs.
    async fn set_status(&self, user_id: i64, next: ApplicationStatus) -> AppResult<ReviewOutcome> {
        let mut state = self.state.write().await;
        let snapshot = {
            let Some(application) = state.applications.get_mut(&user_id) else {
                return Ok(ReviewOutcome::NotFound);
            };
            if application.transition(next).is_err() {
                return Ok(ReviewOutcome::NotPending(application.status));
            }
            application.clone()
        };
        push_status_change(&mut state.status_log, &snapshot);
        self.persist(&state).await?;
        Ok(ReviewOutcome::Updated(snapshot))
    }

    // XP tracking

    /// Adds XP and returns the user's new total for the chat.
    pub async fn add_xp(&self, chat_id: i64, user_id: i64, amount: i64) -> AppResult<i64> {
        let mut state = self.state.write().await;
        let score = state.xp.entry(chat_id).or_default().entry(user_id).or_insert(0);
        *score += amount;
        let total = *score;
        self.persist(&state).await?;
        Ok(total)
    }

    /// Top scores for a chat, highest first, at most `limit` entries.
    pub async fn xp_leaderboard(&self, chat_id: i64, limit: usize) -> Vec<(i64, i64)> {
        let state = self.state.read().await;
        let Some(scores) = state.xp.get(&chat_id) else {
            return Vec::new();
        };
        scores
            .iter()
            .map(|(user_id, score)| (*user_id, *score))
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(limit)
            .collect()
    }

    // Cups

    pub async fn add_cup(&self, chat_id: i64, cup: Cup) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.cups.entry(chat_id).or_default().push(cup);
        self.persist(&state).await?;
        Ok(())
    }

    /// The chat's cup archive, newest first, at most `limit` entries.
    pub async fn cups(&self, chat_id: i64, limit: usize) -> Vec<Cup> {
        let state = self.state.read().await;
        let Some(cups) = state.cups.get(&chat_id) else {
            return Vec::new();
        };
        cups.iter()
            .sorted_by(|a, b| b.created_at.cmp(&a.created_at))
            .take(limit)
            .cloned()
            .collect()
    }

    // Insights

    pub async fn insights(&self) -> InsightsReport {
        analytics::insights(&*self.state.read().await)
    }
}

fn push_status_change(log: &mut VecDeque<StatusChange>, application: &Application) {
    log.push_front(StatusChange {
        user_id: application.user_id,
        full_name: application.full_name.clone(),
        status: application.status,
        changed_at: application.updated_at,
    });
    log.truncate(STATUS_LOG_CAP);
}
