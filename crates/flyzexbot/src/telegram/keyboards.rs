//! Inline keyboards for the glass panel UI.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use unic_langid::LanguageIdentifier;

use flyzex_core::i18n;

/// Callback data of the welcome panel's apply button.
pub const APPLY_CALLBACK: &str = "apply_for_guild";

/// The welcome panel: a single apply button.
pub fn glass_welcome_keyboard(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        format!("🪟 {}", i18n::t(lang, "dm-apply-button")),
        APPLY_CALLBACK,
    )]])
}

/// Approve/deny row plus a skip row, bound to one applicant.
pub fn application_review_keyboard(lang: &LanguageIdentifier, user_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                i18n::t(lang, "review-approve-button"),
                format!("application:{user_id}:approve"),
            ),
            InlineKeyboardButton::callback(
                i18n::t(lang, "review-deny-button"),
                format!("application:{user_id}:deny"),
            ),
        ],
        vec![InlineKeyboardButton::callback(
            i18n::t(lang, "review-skip-button"),
            "application:skip",
        )],
    ])
}

/// An empty markup used to collapse a review keyboard in place.
pub fn cleared_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new())
}
