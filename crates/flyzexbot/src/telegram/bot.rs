//! Bot initialization and command definitions.

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

/// Bot commands enum with descriptions
///
/// Commands that take arguments (`/promote`, `/demote`, `/add_cup`) are
/// routed through dedicated text filters in the schema instead, so that a
/// missing argument can be answered with a usage hint rather than being
/// swallowed by the command parser.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "دستورهای ربات:")]
pub enum Command {
    #[command(description = "نمایش پنل شیشه‌ای و شروع درخواست")]
    Start,
    #[command(description = "لغو فرآیند درخواست")]
    Cancel,
    #[command(description = "پس گرفتن درخواست در انتظار")]
    Withdraw,
    #[command(description = "نمایش وضعیت درخواست شما")]
    Status,
    #[command(description = "درخواست‌های در انتظار بررسی (ادمین)")]
    Pending,
    #[command(description = "فهرست ادمین‌ها")]
    Admins,
    #[command(description = "جدول تجربه گروه")]
    Xp,
    #[command(description = "جدول جام‌های گیلد")]
    Cups,
}

/// Creates a Bot instance from the resolved token.
pub fn create_bot(token: &str) -> Bot {
    Bot::new(token)
}

/// Sets up bot commands in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "نمایش پنل شیشه‌ای و شروع درخواست"),
        BotCommand::new("cancel", "لغو فرآیند درخواست"),
        BotCommand::new("withdraw", "پس گرفتن درخواست در انتظار"),
        BotCommand::new("status", "نمایش وضعیت درخواست شما"),
        BotCommand::new("pending", "درخواست‌های در انتظار بررسی (ادمین)"),
        BotCommand::new("admins", "فهرست ادمین‌ها"),
        BotCommand::new("xp", "جدول تجربه گروه"),
        BotCommand::new("cups", "جدول جام‌های گیلد"),
    ])
    .await?;

    Ok(())
}
