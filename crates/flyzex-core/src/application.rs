//! Guild application domain types and the intake state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{AppError, AppResult};

/// Lifecycle status of a guild application.
///
/// Transitions are monotonic: `Pending` is the only non-terminal state and
/// every other state is final. `Withdrawn` permits re-application (a fresh
/// record replaces the old one); `Approved` and `Denied` do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Denied,
    Withdrawn,
}

impl ApplicationStatus {
    /// A terminal status never changes again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only forward transitions out of `Pending` are allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::Pending) && next != Self::Pending
    }
}

/// One recorded question/answer pair, in intake order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

/// A guild membership application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub answers: Vec<Answer>,
    pub language_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Creates a fresh pending application from a completed intake session.
    pub fn new(
        user_id: i64,
        username: Option<String>,
        full_name: String,
        answers: Vec<Answer>,
        language_code: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            full_name,
            answers,
            language_code,
            created_at: now,
            status: ApplicationStatus::Pending,
            updated_at: now,
        }
    }

    /// Applies a status change, enforcing forward-only transitions.
    pub fn transition(&mut self, next: ApplicationStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Combined character length of all answers (insights input).
    pub fn combined_answer_len(&self) -> usize {
        self.answers.iter().map(|a| a.answer.chars().count()).sum()
    }
}

/// Result of recording one intake answer.
#[derive(Debug, PartialEq, Eq)]
pub enum IntakeStep<'a> {
    /// Answer stored; ask this question next.
    NextQuestion(&'a str),
    /// The last question was answered; the session is finished.
    Completed(Vec<Answer>),
}

/// Per-user intake session: a cursor over the configured question list.
///
/// The session itself is pure data; the caller owns where it lives (the
/// bot keeps one per user in a concurrent map) and what happens on
/// completion (submit to storage, notify reviewers).
#[derive(Debug, Clone, Default)]
pub struct IntakeSession {
    answers: Vec<Answer>,
    question_index: usize,
}

impl IntakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The question the user should answer next, if any remains.
    pub fn current_question<'a>(&self, questions: &'a [String]) -> Option<&'a str> {
        questions.get(self.question_index).map(String::as_str)
    }

    /// Records `text` as the answer to the current question and advances.
    ///
    /// Answers are trimmed but otherwise taken as-is; the flow accepts any
    /// non-empty text. An already-exhausted session completes immediately
    /// with whatever was collected.
    pub fn record_answer<'a>(&mut self, questions: &'a [String], text: &str) -> IntakeStep<'a> {
        if let Some(question) = questions.get(self.question_index) {
            self.answers.push(Answer {
                question: question.clone(),
                answer: text.trim().to_string(),
            });
            self.question_index += 1;
        }

        match questions.get(self.question_index) {
            Some(next) => IntakeStep::NextQuestion(next),
            None => IntakeStep::Completed(std::mem::take(&mut self.answers)),
        }
    }
}
