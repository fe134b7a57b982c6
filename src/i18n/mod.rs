//! Internationalization (i18n) module for multi-language support.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` type
//! - `strings`: Built-in localized strings (labels, type names, game messages)
//! - `translator`: Key lookup with per-language JSON overrides and English fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use squirdle::i18n::{Language, Translator};
//!
//! let japanese = Language::from_code("ja")?;
//! let translator = Translator::load(Path::new("translation"), japanese)?;
//! assert_eq!(translator.t("Weight"), "重さ");
//! ```

mod language;
mod registry;
mod strings;
mod translator;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
pub use translator::Translator;
