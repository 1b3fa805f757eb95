//! Aggregate insights over the guild document, as served by the dashboard.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::application::ApplicationStatus;
use crate::storage::state::{GuildState, StatusChange};

/// The `/api/applications/insights` payload.
///
/// `total` is always the sum of `status_counts` values; `pending`
/// duplicates the pending bucket so the dashboard does not have to dig
/// through the map for its headline number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    pub status_counts: BTreeMap<String, usize>,
    pub pending: usize,
    pub total: usize,
    pub average_pending_answer_length: f64,
    pub languages: BTreeMap<String, usize>,
    pub recent_updates: Vec<StatusChange>,
}

/// Computes the insights snapshot. Pure so it can be tested without a
/// store; `Storage::insights` calls this under its read guard.
pub fn insights(state: &GuildState) -> InsightsReport {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    let mut pending = 0usize;
    let mut pending_answer_chars = 0usize;

    for application in state.applications.values() {
        *status_counts.entry(application.status.to_string()).or_insert(0) += 1;
        let language = application
            .language_code
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        *languages.entry(language).or_insert(0) += 1;

        if application.status == ApplicationStatus::Pending {
            pending += 1;
            pending_answer_chars += application.combined_answer_len();
        }
    }

    let total = status_counts.values().sum();
    let average_pending_answer_length = if pending == 0 {
        0.0
    } else {
        pending_answer_chars as f64 / pending as f64
    };

    InsightsReport {
        status_counts,
        pending,
        total,
        average_pending_answer_length,
        languages,
        recent_updates: state.status_log.iter().cloned().collect(),
    }
}
