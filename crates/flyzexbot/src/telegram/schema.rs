//! Dispatcher schema and handler chain builders.
//!
//! The same handler tree is used by the production dispatcher and by
//! integration tests. Commands that take arguments are matched on their
//! raw text (they would otherwise fail `BotCommands` parsing when the
//! argument is missing, and the usage hint could never be sent).

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use super::bot::Command;
use super::types::{HandlerDeps, HandlerError};
use super::{dm, group, review, Bot};

/// Creates the main dispatcher schema for the Telegram bot.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_promote = deps.clone();
    let deps_demote = deps.clone();
    let deps_add_cup = deps.clone();
    let deps_intake = deps.clone();
    let deps_activity = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Known commands first
        .branch(command_handler(deps_commands))
        // Argument-taking commands (not in the Command enum)
        .branch(promote_handler(deps_promote))
        .branch(demote_handler(deps_demote))
        .branch(add_cup_handler(deps_add_cup))
        // Free text: intake answers in private, XP in groups
        .branch(intake_message_handler(deps_intake))
        .branch(group_activity_handler(deps_activity))
        // Inline buttons
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let result = match cmd {
                    Command::Start => dm::handle_start(&bot, &msg).await,
                    Command::Cancel => dm::handle_cancel(&bot, &msg, &deps).await,
                    Command::Withdraw => dm::handle_withdraw(&bot, &msg, &deps).await,
                    Command::Status => dm::handle_status(&bot, &msg, &deps).await,
                    Command::Pending => dm::handle_pending(&bot, &msg, &deps).await,
                    Command::Admins => dm::handle_admins(&bot, &msg, &deps).await,
                    Command::Xp if !msg.chat.is_private() => group::handle_xp(&bot, &msg, &deps).await,
                    Command::Cups if !msg.chat.is_private() => group::handle_cups(&bot, &msg, &deps).await,
                    // Group-only commands are ignored in private chats
                    Command::Xp | Command::Cups => Ok(()),
                };
                if let Err(e) = result {
                    log::error!("Command handler failed: {e}");
                }
                Ok(())
            }
        })
}

/// Handler for /promote <user_id> (owner only, not in the Command enum)
fn promote_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.chat.is_private() && msg.text().map(|text| text.starts_with("/promote")).unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = dm::handle_promote(&bot, &msg, &deps).await {
                    log::error!("/promote handler failed: {e}");
                }
                Ok(())
            }
        })
}

/// Handler for /demote <user_id> (owner only, not in the Command enum)
fn demote_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.chat.is_private() && msg.text().map(|text| text.starts_with("/demote")).unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = dm::handle_demote(&bot, &msg, &deps).await {
                    log::error!("/demote handler failed: {e}");
                }
                Ok(())
            }
        })
}

/// Handler for /add_cup title | description | podium (group admins only)
fn add_cup_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            is_group_chat(&msg) && msg.text().map(|text| text.starts_with("/add_cup")).unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = group::handle_add_cup(&bot, &msg, &deps).await {
                    log::error!("/add_cup handler failed: {e}");
                }
                Ok(())
            }
        })
}

/// Private free-text messages feed the intake state machine.
fn intake_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private() && is_plain_text(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = dm::handle_intake_message(&bot, &msg, &deps).await {
                    log::error!("Intake handler failed: {e}");
                }
                Ok(())
            }
        })
}

/// Group free-text messages earn XP.
fn group_activity_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_group_chat(&msg) && is_plain_text(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = group::track_activity(&bot, &msg, &deps).await {
                    log::error!("Activity tracker failed: {e}");
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = review::handle_callback(bot, q, deps).await {
                log::error!("Callback handler failed: {e}");
            }
            Ok(())
        }
    })
}

fn is_group_chat(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

fn is_plain_text(msg: &Message) -> bool {
    msg.text().map(|text| !text.starts_with('/')).unwrap_or(false)
}
