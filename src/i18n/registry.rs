//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is a `OnceLock` singleton so every part of the game (routing,
//! the translator, name lookup) agrees on which languages exist.

use crate::i18n::strings::{LanguageStrings, ENGLISH_STRINGS, JAPANESE_STRINGS, KOREAN_STRINGS};
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "ja")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Japanese")
    pub name: &'static str,

    /// Native name of the language (e.g., "日本語")
    pub native_name: &'static str,

    /// Whether this is the fallback language for missing translations (only one should be true)
    pub is_canonical: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,

    /// Built-in UI strings
    pub strings: &'static LanguageStrings,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if no canonical language is found or if multiple canonical
    /// languages are defined (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// English (canonical), Japanese and Korean.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
            strings: &ENGLISH_STRINGS,
        },
        LanguageConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
            is_canonical: false,
            enabled: true,
            strings: &JAPANESE_STRINGS,
        },
        LanguageConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
            is_canonical: false,
            enabled: true,
            strings: &KOREAN_STRINGS,
        },
    ]
}
