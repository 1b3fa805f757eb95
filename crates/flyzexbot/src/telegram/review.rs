//! Admin review callbacks: approve, deny, skip.
//!
//! The storage transition is the idempotence gate — a button pressed twice
//! finds the record already decided and no invite is resent.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html;

use flyzex_core::{i18n, Application, ReviewOutcome};

use super::dm;
use super::keyboards;
use super::types::{HandlerDeps, UserInfo};
use super::Bot;

/// Parsed review callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve(i64),
    Deny(i64),
    Skip,
}

impl ReviewAction {
    /// Parses `application:skip` and `application:{user_id}:{approve|deny}`.
    pub fn parse(data: &str) -> Option<Self> {
        let rest = data.strip_prefix("application:")?;
        if rest == "skip" {
            return Some(Self::Skip);
        }
        let (user_id, action) = rest.split_once(':')?;
        let user_id = user_id.parse().ok()?;
        match action {
            "approve" => Some(Self::Approve(user_id)),
            "deny" => Some(Self::Deny(user_id)),
            _ => None,
        }
    }
}

/// Routes all inline-button presses: the welcome panel's apply button and
/// the review actions. Unknown data is acknowledged and dropped.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> ResponseResult<()> {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    if data == keyboards::APPLY_CALLBACK {
        return dm::handle_apply_callback(bot, q, deps).await;
    }
    if let Some(action) = ReviewAction::parse(&data) {
        return handle_review_action(bot, q, deps, action).await;
    }

    log::warn!("Unhandled callback data: {data}");
    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

async fn handle_review_action(
    bot: Bot,
    q: CallbackQuery,
    deps: HandlerDeps,
    action: ReviewAction,
) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some((chat_id, message_id)) = q.message.as_ref().map(|m| (m.chat().id, m.id())) else {
        return Ok(());
    };
    let admin = UserInfo::from_user(&q.from);
    let lang = i18n::fallback_lang();

    if !deps.is_reviewer(admin.user_id).await {
        bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-admin-only"))
            .await?;
        return Ok(());
    }

    match action {
        ReviewAction::Skip => {
            bot.edit_message_reply_markup(chat_id, message_id)
                .reply_markup(keyboards::cleared_keyboard())
                .await?;
        }
        ReviewAction::Approve(target) => match deps.storage.approve(target).await {
            Ok(ReviewOutcome::Updated(application)) => {
                log::info!("Admin {} approved application of user {target}", admin.user_id);
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-approved-admin"))
                    .await?;
                notify_applicant_approved(&bot, &deps, &application).await;
            }
            Ok(ReviewOutcome::NotPending(_)) => {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-processed"))
                    .await?;
            }
            Ok(ReviewOutcome::NotFound) => {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-no-pending"))
                    .await?;
            }
            Err(err) => {
                log::error!("Approve of user {target} failed: {err}");
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "error-generic"))
                    .await?;
            }
        },
        ReviewAction::Deny(target) => match deps.storage.deny(target).await {
            Ok(ReviewOutcome::Updated(application)) => {
                log::info!("Admin {} denied application of user {target}", admin.user_id);
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-denied-admin"))
                    .await?;
                notify_applicant_denied(&bot, &application).await;
            }
            Ok(ReviewOutcome::NotPending(_)) => {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-processed"))
                    .await?;
            }
            Ok(ReviewOutcome::NotFound) => {
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-no-pending"))
                    .await?;
            }
            Err(err) => {
                log::error!("Deny of user {target} failed: {err}");
                bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "error-generic"))
                    .await?;
            }
        },
    }
    Ok(())
}

/// Sends the invite code to an approved applicant. Delivery failures are
/// logged, not propagated — the approval itself already happened.
async fn notify_applicant_approved(bot: &Bot, deps: &HandlerDeps, application: &Application) {
    let lang = i18n::lang_for(application.language_code.as_deref());
    let mut args = FluentArgs::new();
    args.set("invite_code", html::escape(&deps.settings.intake.invite_code));
    let text = i18n::t_args(&lang, "dm-application-approved-user", &args);

    if let Err(err) = bot
        .send_message(ChatId(application.user_id), text)
        .parse_mode(ParseMode::Html)
        .await
    {
        log::error!("Failed to notify approved user {}: {err}", application.user_id);
    }
}

async fn notify_applicant_denied(bot: &Bot, application: &Application) {
    let lang = i18n::lang_for(application.language_code.as_deref());
    if let Err(err) = bot
        .send_message(ChatId(application.user_id), i18n::t(&lang, "dm-application-denied-user"))
        .await
    {
        log::error!("Failed to notify denied user {}: {err}", application.user_id);
    }
}
