//! Language type: validated language representation.

use crate::i18n::{LanguageConfig, LanguageRegistry, LanguageStrings};
use anyhow::{bail, Result};

/// A language that has been validated against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ja")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const JAPANESE: Language = Language { code: "ja" };
    pub const KOREAN: Language = Language { code: "ko" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The fallback language for missing translations.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// All enabled languages, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for a Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }

    /// Built-in UI strings for this language.
    pub fn strings(&self) -> &'static LanguageStrings {
        self.config().strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Language::ENGLISH.code(), "en");
        assert_eq!(Language::JAPANESE.name(), "Japanese");
        assert_eq!(Language::KOREAN.native_name(), "한국어");
        assert!(Language::ENGLISH.is_canonical());
        assert!(!Language::KOREAN.is_canonical());
    }

    #[test]
    fn test_from_code_known() {
        let language = Language::from_code("ko").expect("Should succeed");
        assert_eq!(language, Language::KOREAN);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_canonical_returns_english() {
        assert_eq!(Language::canonical(), Language::ENGLISH);
    }

    #[test]
    fn test_all_languages() {
        assert_eq!(
            Language::all(),
            vec![Language::ENGLISH, Language::JAPANESE, Language::KOREAN]
        );
    }

    #[test]
    fn test_strings_match_language() {
        assert_eq!(Language::ENGLISH.strings().gen, "Gen");
        assert_eq!(Language::JAPANESE.strings().gen, "世代");
    }
}
