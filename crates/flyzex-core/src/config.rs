//! Settings loading for the bot and the dashboard server.
//!
//! Settings live in a YAML file (see `config/settings.example.yaml`) and
//! can be overridden with `FLYZEX_`-prefixed environment variables, e.g.
//! `FLYZEX_WEBAPP__PORT=9000`. The bot token itself never goes into the
//! file: the file names the environment variable that holds it.

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub telegram: TelegramSettings,
    pub intake: IntakeSettings,
    pub xp: XpSettings,
    pub cups: CupSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub webapp: WebAppSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    /// Name of the environment variable holding the bot token.
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,
    /// The bot owner; the only user allowed to promote/demote admins.
    pub owner_id: i64,
    /// Chat that receives completed applications for review. When unset,
    /// each stored admin is messaged directly.
    #[serde(default)]
    pub application_review_chat: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeSettings {
    /// Questions asked, in order, when a user applies.
    pub questions: Vec<String>,
    /// Credential sent to approved applicants.
    pub invite_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XpSettings {
    /// XP granted per group message.
    pub message_reward: i64,
    /// Default leaderboard length (bot command and dashboard).
    pub leaderboard_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CupSettings {
    /// Default cup archive length (bot command and dashboard).
    pub leaderboard_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Path of the persisted JSON document.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file written next to console output.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebAppSettings {
    #[serde(default = "default_webapp_host")]
    pub host: String,
    #[serde(default = "default_webapp_port")]
    pub port: u16,
    /// Directory the static dashboard is served from.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for WebAppSettings {
    fn default() -> Self {
        Self {
            host: default_webapp_host(),
            port: default_webapp_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bot_token_env() -> String {
    "BOT_TOKEN".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_webapp_host() -> String {
    "0.0.0.0".to_string()
}

fn default_webapp_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("webapp/static")
}

impl Settings {
    /// Loads settings from the YAML file merged with `FLYZEX_` env vars.
    pub fn load(path: &Path) -> AppResult<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Yaml::file(path))
                .merge(Env::prefixed("FLYZEX_").split("__")),
        )
    }

    fn from_figment(figment: Figment) -> AppResult<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> AppResult<()> {
        if self.intake.questions.is_empty() {
            return Err(AppError::Validation(
                "intake.questions must contain at least one question".to_string(),
            ));
        }
        if self.intake.invite_code.trim().is_empty() {
            return Err(AppError::Validation("intake.invite_code must not be empty".to_string()));
        }
        if self.xp.message_reward <= 0 {
            return Err(AppError::Validation("xp.message_reward must be positive".to_string()));
        }
        Ok(())
    }

    /// Resolves the bot token from the configured environment variable.
    pub fn bot_token(&self) -> AppResult<SecretString> {
        env::var(&self.telegram.bot_token_env)
            .map(SecretString::from)
            .map_err(|_| AppError::MissingEnv(self.telegram.bot_token_env.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
telegram:
  bot_token_env: FLYZEX_TEST_TOKEN
  owner_id: 1337
intake:
  questions:
    - "Why do you want to join the guild?"
    - "Introduce yourself."
  invite_code: GUILD-2024
xp:
  message_reward: 5
  leaderboard_size: 10
cups:
  leaderboard_size: 5
storage:
  path: data/guild.json
"#;

    #[test]
    fn loads_sample_with_defaults() {
        let settings = Settings::from_figment(Figment::new().merge(Yaml::string(SAMPLE))).unwrap();

        assert_eq!(settings.telegram.owner_id, 1337);
        assert_eq!(settings.telegram.application_review_chat, None);
        assert_eq!(settings.intake.questions.len(), 2);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.webapp.port, 8080);
        assert_eq!(settings.webapp.static_dir, PathBuf::from("webapp/static"));
    }

    #[test]
    fn rejects_empty_question_list() {
        let yaml = SAMPLE.replace(
            "  questions:\n    - \"Why do you want to join the guild?\"\n    - \"Introduce yourself.\"\n",
            "  questions: []\n",
        );
        let err = Settings::from_figment(Figment::new().merge(Yaml::string(&yaml))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn missing_token_env_is_reported() {
        let settings = Settings::from_figment(Figment::new().merge(Yaml::string(SAMPLE))).unwrap();
        std::env::remove_var("FLYZEX_TEST_TOKEN");
        let err = settings.bot_token().unwrap_err();
        assert!(matches!(err, AppError::MissingEnv(name) if name == "FLYZEX_TEST_TOKEN"));
    }
}
