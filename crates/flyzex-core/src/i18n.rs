//! Localized texts for the bot and the dashboard API.
//!
//! Persian is the guild's language and the fallback; English exists for
//! applicants whose Telegram client reports it.

use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "fa",
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("fa", "فارسی"), ("en", "English")];

/// Default language identifier used as a fallback.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| "fa".parse().unwrap());

/// The guild's own language (admin notifications, dashboard errors).
pub fn fallback_lang() -> LanguageIdentifier {
    DEFAULT_LANG.clone()
}

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    match is_language_supported(&normalized) {
        Some(supported) => supported.parse().unwrap_or_else(|_| DEFAULT_LANG.clone()),
        None => DEFAULT_LANG.clone(),
    }
}

/// Resolves the language for a user from the Telegram language code.
pub fn lang_for(telegram_lang_code: Option<&str>) -> LanguageIdentifier {
    telegram_lang_code
        .map(lang_from_code)
        .unwrap_or_else(|| DEFAULT_LANG.clone())
}

/// Checks if a language code is supported by the bot.
/// Returns the normalized language code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    let text = LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let text = LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let fa = lang_from_code("fa");
        let en = lang_from_code("en");

        assert_eq!(t(&fa, "group-no-data"), "هنوز داده‌ای ثبت نشده است.");
        assert_eq!(t(&en, "group-no-data"), "Nothing recorded yet.");
    }

    #[test]
    fn unknown_codes_fall_back_to_persian() {
        let lang = lang_from_code("zz");
        assert_eq!(t(&lang, "group-no-data"), "هنوز داده‌ای ثبت نشده است.");
    }

    #[test]
    fn converts_newlines() {
        let fa = fallback_lang();
        let text = t(&fa, "dm-welcome");
        assert!(text.contains('\n'));
        assert!(!text.contains("\\n"));
    }

    #[test]
    fn interpolates_arguments() {
        let fa = fallback_lang();
        let mut args = FluentArgs::new();
        args.set("user_id", 4242);
        let text = t_args(&fa, "dm-admin-added", &args);
        assert!(text.contains("4242"));
    }

    #[test]
    fn normalizes_regional_codes() {
        assert_eq!(is_language_supported("en-US"), Some("en"));
        assert_eq!(is_language_supported("fa-IR"), Some("fa"));
        assert_eq!(is_language_supported("de"), None);
    }
}
