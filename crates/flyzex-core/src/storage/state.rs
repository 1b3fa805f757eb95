//! The serialized shape of the guild document.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{Application, ApplicationStatus};

/// How many status transitions the insights feed keeps.
pub const STATUS_LOG_CAP: usize = 20;

/// A recorded tournament with its podium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cup {
    pub title: String,
    pub description: String,
    /// Ranked finisher names, winner first.
    pub podium: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Cup {
    pub fn new(title: String, description: String, podium: Vec<String>) -> Self {
        Self {
            title,
            description,
            podium,
            created_at: Utc::now(),
        }
    }
}

/// One entry of the recent status-change feed, newest kept at the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub user_id: i64,
    pub full_name: String,
    pub status: ApplicationStatus,
    pub changed_at: DateTime<Utc>,
}

/// The whole persisted document. Written as one JSON file; every field
/// defaults so older documents keep loading as the shape grows.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GuildState {
    /// User ids allowed to review applications.
    #[serde(default)]
    pub admins: Vec<i64>,
    /// Applications keyed by applicant user id (latest record per user).
    #[serde(default)]
    pub applications: BTreeMap<i64, Application>,
    /// XP scores: chat id -> user id -> score.
    #[serde(default)]
    pub xp: BTreeMap<i64, BTreeMap<i64, i64>>,
    /// Cup archive per chat, in insertion order.
    #[serde(default)]
    pub cups: BTreeMap<i64, Vec<Cup>>,
    /// Recent status transitions, newest first, capped at STATUS_LOG_CAP.
    #[serde(default)]
    pub status_log: VecDeque<StatusChange>,
}
