//! Group-chat handlers: XP tracking, leaderboards, and the cup archive.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, UserId};
use teloxide::utils::html;

use flyzex_core::i18n;
use flyzex_core::storage::Cup;

use super::types::{HandlerDeps, UserInfo};
use super::Bot;

/// Every non-command group message earns XP. Totals are announced at every
/// fifth reward step so the bot does not talk after each message.
pub async fn track_activity(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    let reward = deps.settings.xp.message_reward;

    let total = match deps.storage.add_xp(msg.chat.id.0, user.user_id, reward).await {
        Ok(total) => total,
        Err(err) => {
            log::error!("Failed to add XP for user {} in chat {}: {err}", user.user_id, msg.chat.id);
            return Ok(());
        }
    };

    if reward > 0 && total % (reward * 5) == 0 {
        let lang = i18n::fallback_lang();
        let mut args = FluentArgs::new();
        args.set("full_name", user.full_name.clone());
        args.set("xp", total);
        bot.send_message(msg.chat.id, i18n::t_args(&lang, "group-xp-updated", &args))
            .await?;
    }
    Ok(())
}

/// `/xp`: the chat's leaderboard, names resolved where possible.
pub async fn handle_xp(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::fallback_lang();
    let leaderboard = deps
        .storage
        .xp_leaderboard(msg.chat.id.0, deps.settings.xp.leaderboard_size)
        .await;
    if leaderboard.is_empty() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "group-no-data")).await?;
        return Ok(());
    }

    let mut lines = vec![i18n::t(&lang, "group-xp-leaderboard-title")];
    for (index, (user_id, xp)) in leaderboard.into_iter().enumerate() {
        let name = resolve_display_name(bot, msg.chat.id, user_id).await;
        lines.push(format!(
            "{}. <b>{}</b> · <code>{xp}</code>",
            index + 1,
            html::escape(&name)
        ));
    }
    bot.send_message(msg.chat.id, lines.join("\n"))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// `/cups`: the chat's cup archive, newest first.
pub async fn handle_cups(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::fallback_lang();
    let cups = deps
        .storage
        .cups(msg.chat.id.0, deps.settings.cups.leaderboard_size)
        .await;
    if cups.is_empty() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "group-no-data")).await?;
        return Ok(());
    }

    let mut blocks = vec![i18n::t(&lang, "group-cup-leaderboard-title")];
    for cup in cups {
        let podium = cup
            .podium
            .iter()
            .map(|slot| html::escape(slot))
            .collect::<Vec<_>>()
            .join("، ");
        blocks.push(format!(
            "<b>{}</b> · {}\n🥇 {}",
            html::escape(&cup.title),
            html::escape(&cup.description),
            podium
        ));
    }
    bot.send_message(msg.chat.id, blocks.join("\n\n"))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// `/add_cup title | description | first,second,third` (guild admins only).
pub async fn handle_add_cup(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::fallback_lang();
    let Some(user) = UserInfo::from_message(msg) else {
        return Ok(());
    };
    if !is_guild_admin(bot, deps, msg.chat.id, user.user_id).await {
        bot.send_message(msg.chat.id, i18n::t(&lang, "dm-admin-only")).await?;
        return Ok(());
    }

    let raw = msg
        .text()
        .and_then(|text| text.split_once(char::is_whitespace))
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();
    if raw.is_empty() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "group-add-cup-usage")).await?;
        return Ok(());
    }

    let Some((title, description, podium)) = parse_cup_args(raw) else {
        bot.send_message(msg.chat.id, i18n::t(&lang, "group-add-cup-format")).await?;
        return Ok(());
    };

    match deps
        .storage
        .add_cup(msg.chat.id.0, Cup::new(title.clone(), description, podium))
        .await
    {
        Ok(()) => {
            let mut args = FluentArgs::new();
            args.set("title", title);
            bot.send_message(msg.chat.id, i18n::t_args(&lang, "group-cup-added", &args))
                .await?;
        }
        Err(err) => {
            log::error!("Failed to record cup in chat {}: {err}", msg.chat.id);
            bot.send_message(msg.chat.id, i18n::t(&lang, "error-generic")).await?;
        }
    }
    Ok(())
}

/// Splits `title | description | first,second,third`.
pub(crate) fn parse_cup_args(raw: &str) -> Option<(String, String, Vec<String>)> {
    let mut parts = raw.splitn(3, '|').map(str::trim);
    let title = parts.next().filter(|s| !s.is_empty())?.to_string();
    let description = parts.next()?.to_string();
    let podium: Vec<String> = parts
        .next()?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if podium.is_empty() {
        return None;
    }
    Some((title, description, podium))
}

/// Telegram chat admins and stored guild admins may record cups.
async fn is_guild_admin(bot: &Bot, deps: &HandlerDeps, chat_id: ChatId, user_id: i64) -> bool {
    if deps.is_reviewer(user_id).await {
        return true;
    }
    let Ok(member_id) = u64::try_from(user_id) else {
        return false;
    };
    match bot.get_chat_member(chat_id, UserId(member_id)).await {
        Ok(member) => member.kind.is_privileged(),
        Err(err) => {
            log::warn!("Failed to fetch chat member {user_id} in {chat_id}: {err}");
            false
        }
    }
}

/// Resolves a leaderboard entry to a display name, falling back to an
/// anonymous label when the member is gone or the lookup fails.
async fn resolve_display_name(bot: &Bot, chat_id: ChatId, user_id: i64) -> String {
    if let Ok(member_id) = u64::try_from(user_id) {
        if let Ok(member) = bot.get_chat_member(chat_id, UserId(member_id)).await {
            return member.user.full_name();
        }
    }
    let mut args = FluentArgs::new();
    args.set("user_id", user_id);
    i18n::t_args(&i18n::fallback_lang(), "leaderboard-anonymous", &args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_cup_line() {
        let (title, description, podium) = parse_cup_args("جام بهاره | لیگ داخلی | آرش, مریم ,بابک").unwrap();
        assert_eq!(title, "جام بهاره");
        assert_eq!(description, "لیگ داخلی");
        assert_eq!(podium, vec!["آرش", "مریم", "بابک"]);
    }

    #[test]
    fn rejects_missing_sections() {
        assert!(parse_cup_args("only a title").is_none());
        assert!(parse_cup_args("title | description").is_none());
        assert!(parse_cup_args("title | description | ,,").is_none());
        assert!(parse_cup_args("| description | a,b").is_none());
    }

    #[test]
    fn empty_podium_slots_are_dropped() {
        let (_, _, podium) = parse_cup_args("t | d | a, ,b,").unwrap();
        assert_eq!(podium, vec!["a", "b"]);
    }
}
