//! Translation lookup with English fallback.

use crate::i18n::Language;
use crate::pokedex::PokeType;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

type Table = BTreeMap<String, String>;

/// Resolves UI keys for one language.
///
/// Lookup order: the language's table, the English table, the caller's
/// default, the key itself.
#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    table: Table,
    fallback: Table,
}

fn builtin_table(language: Language) -> Table {
    language
        .strings()
        .entries()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Overlay `translation/<code>.json` on a table, if the file exists.
///
/// Non-string values are skipped; translation files sometimes carry nested
/// objects for other tools.
fn overlay_file(table: &mut Table, dir: &Path, language: Language) -> Result<()> {
    let path = dir.join(format!("{}.json", language.code()));
    if !path.exists() {
        debug!("No translation file at {}", path.display());
        return Ok(());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut skipped = 0;
    for (key, value) in values {
        match value {
            serde_json::Value::String(s) => {
                table.insert(key, s);
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(
            "{}: skipped {} non-string translation values",
            path.display(),
            skipped
        );
    }
    Ok(())
}

impl Translator {
    /// Translator using only the built-in strings.
    pub fn builtin(language: Language) -> Self {
        Self {
            language,
            table: builtin_table(language),
            fallback: builtin_table(Language::canonical()),
        }
    }

    /// Translator with built-in strings overlaid by the JSON files in `dir`.
    pub fn load(dir: &Path, language: Language) -> Result<Self> {
        let mut translator = Self::builtin(language);
        overlay_file(&mut translator.table, dir, language)?;
        if language.is_canonical() {
            translator.fallback = translator.table.clone();
        } else {
            overlay_file(&mut translator.fallback, dir, Language::canonical())?;
        }
        Ok(translator)
    }

    /// Find `key`, reporting which language the text came from.
    pub fn lookup(&self, key: &str) -> Option<(&str, Language)> {
        if let Some(v) = self.table.get(key).filter(|v| !v.is_empty()) {
            return Some((v, self.language));
        }
        self.fallback
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| (v.as_str(), Language::canonical()))
    }

    pub fn t(&self, key: &str) -> String {
        self.t_or(key, key)
    }

    pub fn t_or(&self, key: &str, default: &str) -> String {
        self.lookup(key)
            .map(|(v, _)| v.to_string())
            .unwrap_or_else(|| default.to_string())
    }

    /// Translate and substitute `{placeholder}` values.
    pub fn t_with(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        replacements
            .iter()
            .fold(self.t(key), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }

    pub fn type_name(&self, t: PokeType) -> String {
        self.t(t.as_str())
    }

    /// The language table merged over the fallback, as served to clients.
    pub fn table(&self) -> Table {
        let mut merged = self.fallback.clone();
        merged.extend(
            self.table
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }
}
