//! Private-chat handlers: the glass welcome panel, the application intake
//! flow, self-service commands, and owner-side admin management.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html;
use unic_langid::LanguageIdentifier;

use flyzex_core::{
    i18n, Application, ApplicationStatus, IntakeSession, IntakeStep, ReviewOutcome, SubmitOutcome,
};

use super::keyboards;
use super::types::{HandlerDeps, UserInfo};
use super::Bot;

/// `/start` in a private chat: the welcome panel with the apply button.
pub async fn handle_start(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let lang = lang_of(msg);
    bot.send_message(
        msg.chat.id,
        format!(
            "{}\n\n{}",
            i18n::t(&lang, "dm-welcome"),
            i18n::t(&lang, "glass-panel-caption")
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::glass_welcome_keyboard(&lang))
    .await?;
    Ok(())
}

/// The apply button: starts an intake session unless the user already has
/// an application in flight or decided.
pub async fn handle_apply_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some((chat_id, message_id)) = q.message.as_ref().map(|m| (m.chat().id, m.id())) else {
        return Ok(());
    };
    let user = UserInfo::from_user(&q.from);
    let lang = i18n::lang_for(user.language_code.as_deref());

    if deps.storage.is_admin(user.user_id).await {
        bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-admin-only"))
            .await?;
        return Ok(());
    }

    match deps.storage.application(user.user_id).await {
        Some(app) if app.status == ApplicationStatus::Pending => {
            bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-duplicate"))
                .await?;
            return Ok(());
        }
        Some(app) if app.status != ApplicationStatus::Withdrawn => {
            bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-already-decided"))
                .await?;
            return Ok(());
        }
        _ => {}
    }

    let session = IntakeSession::new();
    let first_question = session
        .current_question(&deps.settings.intake.questions)
        .map(str::to_string);
    deps.sessions.insert(user.user_id, session);

    log::info!("User {} started an application", user.user_id);
    bot.edit_message_text(chat_id, message_id, i18n::t(&lang, "dm-application-started"))
        .await?;
    if let Some(question) = first_question {
        bot.send_message(chat_id, question).await?;
    }
    Ok(())
}

/// Free text in a private chat: an intake answer when a session is active,
/// ignored otherwise. Stray messages never restart the flow.
pub async fn handle_intake_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let lang = i18n::lang_for(user.language_code.as_deref());

    let questions = &deps.settings.intake.questions;
    let step = match deps.sessions.get_mut(&user.user_id) {
        Some(mut session) => session.record_answer(questions, text),
        None => return Ok(()),
    };

    match step {
        IntakeStep::NextQuestion(question) => {
            bot.send_message(msg.chat.id, question).await?;
        }
        IntakeStep::Completed(answers) => {
            deps.sessions.remove(&user.user_id);
            let application = Application::new(
                user.user_id,
                user.username.clone(),
                user.full_name.clone(),
                answers,
                user.language_code.clone(),
            );
            match deps.storage.submit_application(application.clone()).await {
                Ok(SubmitOutcome::Accepted) => {
                    log::info!("Application submitted by user {}", user.user_id);
                    bot.send_message(msg.chat.id, i18n::t(&lang, "dm-application-received"))
                        .await?;
                    notify_reviewers(bot, deps, &application).await;
                }
                Ok(SubmitOutcome::AlreadyPending) => {
                    bot.send_message(msg.chat.id, i18n::t(&lang, "dm-application-duplicate"))
                        .await?;
                }
                Ok(SubmitOutcome::AlreadyDecided(_)) => {
                    bot.send_message(msg.chat.id, i18n::t(&lang, "dm-application-already-decided"))
                        .await?;
                }
                Err(err) => {
                    log::error!("Failed to store application for user {}: {err}", user.user_id);
                    bot.send_message(msg.chat.id, i18n::t(&lang, "error-generic")).await?;
                }
            }
        }
    }
    Ok(())
}

/// `/cancel`: drops the active intake session, if any.
pub async fn handle_cancel(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    deps.sessions.remove(&user.user_id);
    let lang = i18n::lang_for(user.language_code.as_deref());
    bot.send_message(msg.chat.id, i18n::t(&lang, "dm-application-cancelled"))
        .await?;
    Ok(())
}

/// `/withdraw`: takes a pending application out of the review queue.
pub async fn handle_withdraw(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    let lang = i18n::lang_for(user.language_code.as_deref());

    match deps.storage.withdraw(user.user_id).await {
        Ok(ReviewOutcome::Updated(_)) => {
            log::info!("User {} withdrew their application", user.user_id);
            bot.send_message(msg.chat.id, i18n::t(&lang, "dm-application-withdrawn"))
                .await?;
        }
        Ok(_) => {
            bot.send_message(msg.chat.id, i18n::t(&lang, "dm-nothing-to-withdraw"))
                .await?;
        }
        Err(err) => {
            log::error!("Withdrawal failed for user {}: {err}", user.user_id);
            bot.send_message(msg.chat.id, i18n::t(&lang, "error-generic")).await?;
        }
    }
    Ok(())
}

/// `/status`: the user's own application status.
pub async fn handle_status(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    let lang = i18n::lang_for(user.language_code.as_deref());

    let text = match deps.storage.application(user.user_id).await {
        Some(app) => {
            let mut args = FluentArgs::new();
            args.set("status", status_label(&lang, app.status));
            i18n::t_args(&lang, "dm-status-line", &args)
        }
        None => i18n::t(&lang, "dm-status-none"),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// `/pending`: the review queue, one message per application (capped).
pub async fn handle_pending(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    let lang = i18n::lang_for(user.language_code.as_deref());
    if !deps.is_reviewer(user.user_id).await {
        bot.send_message(msg.chat.id, i18n::t(&lang, "dm-admin-only")).await?;
        return Ok(());
    }

    let pending = deps.storage.pending_applications().await;
    if pending.is_empty() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "dm-no-pending")).await?;
        return Ok(());
    }

    for application in pending.iter().take(5) {
        bot.send_message(msg.chat.id, render_application(&lang, application))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::application_review_keyboard(&lang, application.user_id))
            .await?;
    }
    Ok(())
}

/// `/admins`: the stored admin list.
pub async fn handle_admins(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = lang_of(msg);
    let admins = deps.storage.list_admins().await;
    if admins.is_empty() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "dm-no-admins")).await?;
        return Ok(());
    }

    let formatted = admins.iter().map(i64::to_string).collect::<Vec<_>>().join("\n");
    let mut args = FluentArgs::new();
    args.set("admins", formatted);
    bot.send_message(msg.chat.id, i18n::t_args(&lang, "admin-list-header", &args))
        .await?;
    Ok(())
}

/// `/promote <user_id>` (owner only).
pub async fn handle_promote(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let Some(target) = check_owner_with_arg(bot, msg, deps).await? else {
        return Ok(());
    };
    let lang = lang_of(msg);
    let mut args = FluentArgs::new();
    args.set("user_id", target);

    match deps.storage.add_admin(target).await {
        Ok(true) => {
            log::info!("User {target} promoted to admin");
            bot.send_message(msg.chat.id, i18n::t_args(&lang, "dm-admin-added", &args))
                .await?;
        }
        Ok(false) => {
            bot.send_message(msg.chat.id, i18n::t_args(&lang, "dm-already-admin", &args))
                .await?;
        }
        Err(err) => {
            log::error!("Failed to promote {target}: {err}");
            bot.send_message(msg.chat.id, i18n::t(&lang, "error-generic")).await?;
        }
    }
    Ok(())
}

/// `/demote <user_id>` (owner only).
pub async fn handle_demote(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let Some(target) = check_owner_with_arg(bot, msg, deps).await? else {
        return Ok(());
    };
    let lang = lang_of(msg);
    let mut args = FluentArgs::new();
    args.set("user_id", target);

    match deps.storage.remove_admin(target).await {
        Ok(true) => {
            log::info!("User {target} demoted");
            bot.send_message(msg.chat.id, i18n::t_args(&lang, "dm-admin-removed", &args))
                .await?;
        }
        Ok(false) => {
            bot.send_message(msg.chat.id, i18n::t_args(&lang, "dm-not-admin", &args))
                .await?;
        }
        Err(err) => {
            log::error!("Failed to demote {target}: {err}");
            bot.send_message(msg.chat.id, i18n::t(&lang, "error-generic")).await?;
        }
    }
    Ok(())
}

/// Owner gate + `<user_id>` argument parsing shared by promote/demote.
async fn check_owner_with_arg(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<Option<i64>> {
    let lang = lang_of(msg);
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(None);
    };
    if user.user_id != deps.settings.telegram.owner_id {
        bot.send_message(msg.chat.id, i18n::t(&lang, "dm-owner-only")).await?;
        return Ok(None);
    }

    let target = msg
        .text()
        .and_then(|text| text.split_whitespace().nth(1))
        .and_then(|raw| raw.parse::<i64>().ok());
    if target.is_none() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "dm-provide-user-id")).await?;
    }
    Ok(target)
}

/// Sends a freshly submitted application to the review chat, or to every
/// stored admin (owner as a last resort) when no review chat is set.
pub async fn notify_reviewers(bot: &Bot, deps: &HandlerDeps, application: &Application) {
    let lang = i18n::fallback_lang();
    let text = render_application(&lang, application);
    let keyboard = keyboards::application_review_keyboard(&lang, application.user_id);

    let recipients = match deps.settings.telegram.application_review_chat {
        Some(chat) => vec![chat],
        None => {
            let admins = deps.storage.list_admins().await;
            if admins.is_empty() {
                vec![deps.settings.telegram.owner_id]
            } else {
                admins
            }
        }
    };

    for chat_id in recipients {
        if let Err(err) = bot
            .send_message(ChatId(chat_id), text.clone())
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard.clone())
            .await
        {
            log::warn!(
                "Failed to deliver application {} to reviewer chat {chat_id}: {err}",
                application.user_id
            );
        }
    }
}

/// Renders an application for review: header plus the Q&A breakdown.
pub fn render_application(lang: &LanguageIdentifier, application: &Application) -> String {
    let mut args = FluentArgs::new();
    args.set("full_name", html::escape(&application.full_name));
    args.set("user_id", application.user_id);
    args.set(
        "created_at",
        application.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    let mut lines = vec![i18n::t_args(lang, "dm-application-item", &args)];
    for answer in &application.answers {
        lines.push(format!(
            "<b>{}</b>\n{}",
            html::escape(&answer.question),
            html::escape(&answer.answer)
        ));
    }
    lines.join("\n\n")
}

/// Localized human label of a status.
pub fn status_label(lang: &LanguageIdentifier, status: ApplicationStatus) -> String {
    i18n::t(lang, &format!("status-{status}"))
}

fn lang_of(msg: &Message) -> LanguageIdentifier {
    i18n::lang_for(msg.from.as_ref().and_then(|u| u.language_code.as_deref()))
}
