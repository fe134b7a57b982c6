//! Reference links to an external wiki, one template per language.
//!
//! A template is a URL with a single `{{_POKEMON_NAME[<lang>]}}` placeholder,
//! e.g. `https://wiki.example.org/{{_POKEMON_NAME[en]}}_(Pokémon)`. It is kept
//! in `translation/<lang>-ref.json` together with `alt`, the manual overrides
//! maintained by `check-ref-link`.

use crate::pokedex::PokedexEntry;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Percent-encode like JavaScript's `encodeURIComponent`.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Reverse of [`encode_component`]. `None` on malformed escapes or invalid UTF-8.
pub fn decode_component(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Splits a template around its name placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    prefix: String,
    lang: String,
    suffix: String,
}

impl LinkBuilder {
    pub fn new(template: &str) -> Self {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{\{_POKEMON_NAME\[([a-z-]+)\]\}\}").unwrap());

        let mut matches = regex.captures_iter(template);
        let Some(first) = matches.next() else {
            return Self {
                prefix: template.to_string(),
                lang: "en".to_string(),
                suffix: String::new(),
            };
        };

        let whole = first.get(0).map(|m| m.range()).unwrap_or(0..0);
        // Only the text up to a second placeholder belongs to the suffix
        let suffix_end = matches
            .next()
            .and_then(|c| c.get(0))
            .map(|m| m.start())
            .unwrap_or(template.len());

        Self {
            prefix: template[..whole.start].to_string(),
            lang: first[1].to_string(),
            suffix: template[whole.end..suffix_end].to_string(),
        }
    }

    /// Language whose name is substituted into the template.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn make(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, encode_component(name), self.suffix)
    }

    /// Link for an entry, in the template's language.
    pub fn make_for(&self, entry: &PokedexEntry) -> Option<String> {
        entry.name.get(&self.lang).map(|name| self.make(name))
    }

    /// Recover the name from a URL built from this template.
    pub fn parse(&self, url: &str) -> Option<String> {
        if url.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        let middle = url.strip_prefix(&self.prefix)?.strip_suffix(&self.suffix)?;
        if middle.is_empty() {
            return None;
        }
        decode_component(middle)
    }
}

/// Contents of `translation/<lang>-ref.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefTemplate {
    pub template: String,
    /// Localized name -> replacement name; empty means no working link is known
    #[serde(default)]
    pub alt: BTreeMap<String, String>,
}

impl RefTemplate {
    pub fn path(translation_dir: &Path, lang: &str) -> PathBuf {
        translation_dir.join(format!("{}-ref.json", lang))
    }

    /// Read a ref file from an exact path.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Ref template for `lang`, falling back to the English one.
    /// `Ok(None)` when neither file exists.
    pub fn load(translation_dir: &Path, lang: &str) -> Result<Option<Self>> {
        for candidate in [lang, "en"] {
            let path = Self::path(translation_dir, candidate);
            if path.exists() {
                return Self::read(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn builder(&self) -> LinkBuilder {
        LinkBuilder::new(&self.template)
    }

    /// Link for an entry, honoring `alt` overrides.
    pub fn link_for(&self, entry: &PokedexEntry) -> Option<String> {
        let builder = self.builder();
        let name = entry.name.get(builder.lang())?;
        match self.alt.get(name) {
            Some(alt) if alt.is_empty() => None,
            Some(alt) => Some(builder.make(alt)),
            None => Some(builder.make(name)),
        }
    }
}
