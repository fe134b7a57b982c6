//! Pokédex dataset: CSV source rows, the YAML record set and the in-memory index.
//!
//! `pokedex.csv` is the authoring format. `convert-pokedex` validates it row by
//! row and writes `pokedex.yaml`, which is what the game server loads. Both
//! paths end in [`check_pokedex`], so a dataset that loads is always well formed.

use crate::i18n::Translator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Language codes every entry carries a name for.
pub const NAME_LANGS: [&str; 3] = ["en", "ja", "ko"];

/// Highest generation the dataset schema accepts.
pub const MAX_GENERATION: u8 = 9;

#[derive(Debug, Error)]
pub enum PokedexError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pokedex YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("pokedex CSV has no header line")]
    EmptyCsv,

    #[error("pokedex CSV header is missing column `{0}`")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid {field} `{value}`")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("{name}: generation {generation} is outside 1..={max}", max = MAX_GENERATION)]
    GenerationOutOfRange { name: String, generation: u8 },

    #[error("{name}: expected 1 or 2 types, found {count}")]
    TypeCount { name: String, count: usize },

    #[error("{name}: {field} must be positive, found {value}")]
    NonPositive {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("LANG: ({lang}) has duplicate: ({name})")]
    DuplicateName { lang: &'static str, name: String },

    #[error("unknown type `{0}`")]
    UnknownType(String),
}

// ==================== Types ====================

/// The 18 elemental types, serialized by their English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PokeType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dark,
    Dragon,
    Steel,
    Fairy,
}

impl PokeType {
    pub const ALL: [PokeType; 18] = [
        PokeType::Normal,
        PokeType::Fire,
        PokeType::Water,
        PokeType::Grass,
        PokeType::Electric,
        PokeType::Ice,
        PokeType::Fighting,
        PokeType::Poison,
        PokeType::Ground,
        PokeType::Flying,
        PokeType::Psychic,
        PokeType::Bug,
        PokeType::Rock,
        PokeType::Ghost,
        PokeType::Dark,
        PokeType::Dragon,
        PokeType::Steel,
        PokeType::Fairy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PokeType::Normal => "Normal",
            PokeType::Fire => "Fire",
            PokeType::Water => "Water",
            PokeType::Grass => "Grass",
            PokeType::Electric => "Electric",
            PokeType::Ice => "Ice",
            PokeType::Fighting => "Fighting",
            PokeType::Poison => "Poison",
            PokeType::Ground => "Ground",
            PokeType::Flying => "Flying",
            PokeType::Psychic => "Psychic",
            PokeType::Bug => "Bug",
            PokeType::Rock => "Rock",
            PokeType::Ghost => "Ghost",
            PokeType::Dark => "Dark",
            PokeType::Dragon => "Dragon",
            PokeType::Steel => "Steel",
            PokeType::Fairy => "Fairy",
        }
    }

    /// Position in [`PokeType::ALL`], used to index per-language name tables.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PokeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PokeType {
    type Err = PokedexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PokeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PokedexError::UnknownType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub ja: String,
    pub ko: String,
}

impl LocalizedName {
    pub fn get(&self, lang: &str) -> Option<&str> {
        match lang {
            "en" => Some(&self.en),
            "ja" => Some(&self.ja),
            "ko" => Some(&self.ko),
            _ => None,
        }
    }

    /// Name in `lang`, falling back to English for unknown or empty entries.
    pub fn localized(&self, lang: &str) -> &str {
        match self.get(lang) {
            Some(name) if !name.is_empty() => name,
            _ => &self.en,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Height {
    pub m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub kg: f64,
}

/// One creature as stored in `pokedex.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokedexEntry {
    pub name: LocalizedName,
    pub generation: u8,
    #[serde(rename = "type")]
    pub types: Vec<PokeType>,
    pub height: Height,
    pub weight: Weight,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<PokedexEntry>,
}

impl PokedexEntry {
    /// English name, the identity of an entry.
    pub fn key(&self) -> &str {
        &self.name.en
    }

    pub fn type1(&self) -> PokeType {
        self.types[0]
    }

    pub fn type2(&self) -> Option<PokeType> {
        self.types.get(1).copied()
    }
}

// ==================== CSV ====================

/// Columns `pokedex.csv` must provide, in any order.
pub const CSV_COLUMNS: [&str; 8] = [
    "name",
    "generation",
    "type_1",
    "type_2",
    "height_m",
    "weight_kg",
    "name_ja",
    "name_ko",
];

/// One data row of `pokedex.csv`, still as raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub name: String,
    pub generation: String,
    pub type_1: String,
    pub type_2: String,
    pub height_m: String,
    pub weight_kg: String,
    pub name_ja: String,
    pub name_ko: String,
}

static GENERATION_REGEX: OnceLock<Regex> = OnceLock::new();
static MEASURE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Split `pokedex.csv` into rows keyed by the header.
///
/// Cells are trimmed; the file carries no quoting. Missing trailing cells
/// read as empty strings and are rejected later by [`CsvRow::validate`] when
/// the column needs a value.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, PokedexError> {
    let mut lines = text.trim_end().lines();
    let header: Vec<&str> = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or(PokedexError::EmptyCsv)?
        .trim()
        .split(',')
        .map(str::trim)
        .collect();

    let mut positions = [0usize; CSV_COLUMNS.len()];
    for (slot, column) in positions.iter_mut().zip(CSV_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| *h == column)
            .ok_or(PokedexError::MissingColumn(column))?;
    }

    let rows = lines
        .enumerate()
        .map(|(i, raw)| {
            let cells: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
            let cell = |idx: usize| cells.get(positions[idx]).copied().unwrap_or("").to_string();
            CsvRow {
                line: i + 2,
                name: cell(0),
                generation: cell(1),
                type_1: cell(2),
                type_2: cell(3),
                height_m: cell(4),
                weight_kg: cell(5),
                name_ja: cell(6),
                name_ko: cell(7),
            }
        })
        .collect();

    Ok(rows)
}

impl CsvRow {
    /// Check the raw cells against the source format.
    pub fn validate(&self) -> Result<(), PokedexError> {
        let generation = GENERATION_REGEX.get_or_init(|| Regex::new(r"^\d$").unwrap());
        let measure = MEASURE_REGEX.get_or_init(|| Regex::new(r"^\d+\.\d$").unwrap());

        let invalid = |field: &'static str, value: &str| PokedexError::InvalidField {
            line: self.line,
            field,
            value: value.to_string(),
        };

        if !generation.is_match(&self.generation) {
            return Err(invalid("generation", &self.generation));
        }
        if self.type_1.parse::<PokeType>().is_err() {
            return Err(invalid("type_1", &self.type_1));
        }
        if !self.type_2.is_empty() && self.type_2.parse::<PokeType>().is_err() {
            return Err(invalid("type_2", &self.type_2));
        }
        if !measure.is_match(&self.height_m) {
            return Err(invalid("height_m", &self.height_m));
        }
        if !measure.is_match(&self.weight_kg) {
            return Err(invalid("weight_kg", &self.weight_kg));
        }
        Ok(())
    }

    /// Validate and convert into a dataset entry.
    pub fn into_entry(self) -> Result<PokedexEntry, PokedexError> {
        self.validate()?;

        let invalid = |field: &'static str, value: &str| PokedexError::InvalidField {
            line: self.line,
            field,
            value: value.to_string(),
        };

        let mut types = vec![self.type_1.parse()?];
        if !self.type_2.is_empty() {
            types.push(self.type_2.parse()?);
        }

        let generation = self
            .generation
            .parse()
            .map_err(|_| invalid("generation", &self.generation))?;
        let height = self
            .height_m
            .parse()
            .map_err(|_| invalid("height_m", &self.height_m))?;
        let weight = self
            .weight_kg
            .parse()
            .map_err(|_| invalid("weight_kg", &self.weight_kg))?;

        Ok(PokedexEntry {
            name: LocalizedName {
                en: self.name,
                ja: self.name_ja,
                ko: self.name_ko,
            },
            generation,
            types,
            height: Height { m: height },
            weight: Weight { kg: weight },
            forms: Vec::new(),
        })
    }
}

/// Convert the whole CSV into checked entries.
pub fn entries_from_csv(text: &str) -> Result<Vec<PokedexEntry>, PokedexError> {
    let entries = parse_csv(text)?
        .into_iter()
        .map(CsvRow::into_entry)
        .collect::<Result<Vec<_>, _>>()?;
    check_pokedex(entries)
}

// ==================== Schema ====================

fn check_entry(entry: &PokedexEntry) -> Result<(), PokedexError> {
    let name = entry.name.en.clone();

    if !(1..=MAX_GENERATION).contains(&entry.generation) {
        return Err(PokedexError::GenerationOutOfRange {
            name,
            generation: entry.generation,
        });
    }
    if entry.types.is_empty() || entry.types.len() > 2 {
        return Err(PokedexError::TypeCount {
            name,
            count: entry.types.len(),
        });
    }
    // NaN fails the comparison as well
    if !(entry.height.m > 0.0) {
        return Err(PokedexError::NonPositive {
            name,
            field: "height",
            value: entry.height.m,
        });
    }
    if !(entry.weight.kg > 0.0) {
        return Err(PokedexError::NonPositive {
            name,
            field: "weight",
            value: entry.weight.kg,
        });
    }
    Ok(())
}

/// Validate every entry (forms included) and require unique names per language.
pub fn check_pokedex(entries: Vec<PokedexEntry>) -> Result<Vec<PokedexEntry>, PokedexError> {
    let mut seen: HashMap<&'static str, HashSet<String>> = HashMap::new();

    let mut stack: Vec<&PokedexEntry> = entries.iter().rev().collect();
    while let Some(entry) = stack.pop() {
        check_entry(entry)?;

        for lang in NAME_LANGS {
            // Missing translations are left empty
            let name = entry.name.get(lang).unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            if !seen.entry(lang).or_default().insert(name.to_string()) {
                return Err(PokedexError::DuplicateName {
                    lang,
                    name: name.to_string(),
                });
            }
        }

        stack.extend(entry.forms.iter().rev());
    }

    Ok(entries)
}

// ==================== YAML ====================

/// Read and check `pokedex.yaml`.
pub fn load_yaml(path: &Path) -> Result<Vec<PokedexEntry>, PokedexError> {
    let text = std::fs::read_to_string(path).map_err(|source| PokedexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<PokedexEntry> = serde_yaml::from_str(&text)?;
    check_pokedex(entries)
}

pub fn write_yaml(path: &Path, entries: &[PokedexEntry]) -> Result<(), PokedexError> {
    let text = serde_yaml::to_string(entries)?;
    std::fs::write(path, text).map_err(|source| PokedexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ==================== Index ====================

/// An entry reachable by name in the game, either a base entry or a form.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: PokedexEntry,
    /// Names of the base entry when this is an alternate form
    pub base: Option<LocalizedName>,
}

/// Game-facing index over the dataset, keyed by English name.
#[derive(Debug, Clone, Default)]
pub struct Pokedex {
    entries: BTreeMap<String, IndexedEntry>,
    by_name: HashMap<&'static str, HashMap<String, String>>,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Pokedex {
    /// Check and index entries built in memory.
    pub fn from_entries(entries: Vec<PokedexEntry>) -> Result<Self, PokedexError> {
        Ok(Self::index(check_pokedex(entries)?))
    }

    fn index(entries: Vec<PokedexEntry>) -> Self {
        let mut pokedex = Pokedex::default();

        for mut entry in entries {
            let forms = std::mem::take(&mut entry.forms);
            let base = entry.name.clone();
            pokedex.insert(IndexedEntry { entry, base: None });

            for form in forms {
                pokedex.insert(IndexedEntry {
                    entry: form,
                    base: Some(base.clone()),
                });
            }
        }

        pokedex
    }

    fn insert(&mut self, indexed: IndexedEntry) {
        let key = indexed.entry.key().to_string();
        for lang in NAME_LANGS {
            if let Some(name) = indexed.entry.name.get(lang).filter(|n| !n.is_empty()) {
                self.by_name
                    .entry(lang)
                    .or_default()
                    .insert(normalize_name(name), key.clone());
            }
        }
        self.entries.insert(key, indexed);
    }

    /// Load and index `pokedex.yaml`.
    pub fn load(path: &Path) -> Result<Self, PokedexError> {
        Ok(Self::index(load_yaml(path)?))
    }

    pub fn get(&self, key: &str) -> Option<&IndexedEntry> {
        self.entries.get(key)
    }

    /// Resolve a name typed by a player in `lang`. Case and surrounding
    /// whitespace are ignored.
    pub fn find_by_name(&self, lang: &str, name: &str) -> Option<&IndexedEntry> {
        self.by_name
            .get(lang)
            .and_then(|names| names.get(&normalize_name(name)))
            .and_then(|key| self.entries.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_generation(&self) -> u8 {
        self.iter().map(|e| e.entry.generation).max().unwrap_or(1)
    }

    /// Entries whose generation lies in `min_gen..=max_gen`.
    pub fn candidates(&self, min_gen: u8, max_gen: u8) -> Vec<&IndexedEntry> {
        self.iter()
            .filter(|e| (min_gen..=max_gen).contains(&e.entry.generation))
            .collect()
    }
}

/// Localized multi-line summary of an entry, shown once a guess is made.
pub fn info(entry: &PokedexEntry, translator: &Translator) -> String {
    let mut lines = vec![format!("{}: {}", translator.t("Gen"), entry.generation)];

    match entry.type2() {
        Some(type2) => {
            lines.push(format!(
                "{} 1: {}",
                translator.t("Type"),
                translator.type_name(entry.type1())
            ));
            lines.push(format!(
                "{} 2: {}",
                translator.t("Type"),
                translator.type_name(type2)
            ));
        }
        None => lines.push(format!(
            "{}: {}",
            translator.t("Type"),
            translator.type_name(entry.type1())
        )),
    }

    lines.push(format!("{}: {} m", translator.t("Height"), entry.height.m));
    lines.push(format!("{}: {} kg", translator.t("Weight"), entry.weight.kg));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    const CSV: &str = "name,generation,type_1,type_2,height_m,weight_kg,name_ja,name_ko\n\
Bulbasaur,1,Grass,Poison,0.7,6.9,フシギダネ,이상해씨\n\
Charmander,1,Fire,,0.6,8.5,ヒトカゲ,파이리\n";

    fn entry(en: &str, generation: u8, types: &[PokeType]) -> PokedexEntry {
        PokedexEntry {
            name: LocalizedName {
                en: en.to_string(),
                ja: format!("{}-ja", en),
                ko: format!("{}-ko", en),
            },
            generation,
            types: types.to_vec(),
            height: Height { m: 1.0 },
            weight: Weight { kg: 10.0 },
            forms: Vec::new(),
        }
    }

    // ==================== CSV Tests ====================

    #[test]
    fn test_parse_csv_rows() {
        let rows = parse_csv(CSV).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].name, "Bulbasaur");
        assert_eq!(rows[1].type_2, "");
        assert_eq!(rows[1].name_ko, "파이리");
    }

    #[test]
    fn test_parse_csv_reordered_columns() {
        let csv = "name_ko,name,name_ja,generation,type_2,type_1,weight_kg,height_m\n\
이상해씨,Bulbasaur,フシギダネ,1,Poison,Grass,6.9,0.7\n";
        let entries = entries_from_csv(csv).unwrap();
        assert_eq!(entries[0].types, vec![PokeType::Grass, PokeType::Poison]);
        assert_eq!(entries[0].height.m, 0.7);
        assert_eq!(entries[0].name.ja, "フシギダネ");
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let err = parse_csv("name,generation\nBulbasaur,1\n").unwrap_err();
        assert!(matches!(err, PokedexError::MissingColumn("type_1")));
    }

    #[test]
    fn test_parse_csv_empty() {
        assert!(matches!(parse_csv("").unwrap_err(), PokedexError::EmptyCsv));
    }

    #[test]
    fn test_single_type_has_no_second_slot() {
        let entries = entries_from_csv(CSV).unwrap();
        assert_eq!(entries[1].types, vec![PokeType::Fire]);
        assert_eq!(entries[1].type2(), None);
    }

    #[test]
    fn test_validate_rejects_two_digit_generation() {
        let csv = CSV.replace("Bulbasaur,1,", "Bulbasaur,10,");
        let err = entries_from_csv(&csv).unwrap_err();
        assert!(matches!(
            err,
            PokedexError::InvalidField { line: 2, field: "generation", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_type() {
        let csv = CSV.replace("Fire,,", "Shadow,,");
        let err = entries_from_csv(&csv).unwrap_err();
        assert!(matches!(
            err,
            PokedexError::InvalidField { line: 3, field: "type_1", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_integer_measure() {
        let csv = CSV.replace("0.6,8.5", "1,8.5");
        let err = entries_from_csv(&csv).unwrap_err();
        assert!(matches!(
            err,
            PokedexError::InvalidField { field: "height_m", .. }
        ));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let csv = format!("{}Squirtle,1\n", CSV);
        let err = entries_from_csv(&csv).unwrap_err();
        assert!(matches!(err, PokedexError::InvalidField { line: 4, .. }));
    }

    // ==================== Schema Tests ====================

    #[test]
    fn test_check_rejects_duplicate_name() {
        let mut dup = entry("Pikachu", 1, &[PokeType::Electric]);
        dup.name.en = "Raichu".to_string();
        let entries = vec![entry("Pikachu", 1, &[PokeType::Electric]), dup];

        let err = check_pokedex(entries).unwrap_err();
        assert_eq!(err.to_string(), "LANG: (ja) has duplicate: (Pikachu-ja)");
    }

    #[test]
    fn test_check_rejects_duplicate_inside_forms() {
        let mut base = entry("Rotom", 4, &[PokeType::Electric, PokeType::Ghost]);
        base.forms.push(entry("Rotom", 4, &[PokeType::Electric, PokeType::Fire]));

        assert!(matches!(
            check_pokedex(vec![base]).unwrap_err(),
            PokedexError::DuplicateName { lang: "en", .. }
        ));
    }

    #[test]
    fn test_check_rejects_generation_zero() {
        let err = check_pokedex(vec![entry("Missingno", 0, &[PokeType::Normal])]).unwrap_err();
        assert!(matches!(err, PokedexError::GenerationOutOfRange { generation: 0, .. }));
    }

    #[test]
    fn test_check_rejects_three_types() {
        let bad = entry(
            "Chimera",
            1,
            &[PokeType::Fire, PokeType::Water, PokeType::Grass],
        );
        assert!(matches!(
            check_pokedex(vec![bad]).unwrap_err(),
            PokedexError::TypeCount { count: 3, .. }
        ));
    }

    #[test]
    fn test_check_rejects_zero_weight() {
        let mut bad = entry("Gastly", 1, &[PokeType::Ghost, PokeType::Poison]);
        bad.weight.kg = 0.0;
        assert!(matches!(
            check_pokedex(vec![bad]).unwrap_err(),
            PokedexError::NonPositive { field: "weight", .. }
        ));
    }

    #[test]
    fn test_check_rejects_generation_above_nine() {
        let err = check_pokedex(vec![entry("Futuremon", 10, &[PokeType::Normal])]).unwrap_err();
        assert!(matches!(err, PokedexError::GenerationOutOfRange { generation: 10, .. }));
        assert!(check_pokedex(vec![entry("Sprigatito", 9, &[PokeType::Grass])]).is_ok());
    }

    #[test]
    fn test_check_rejects_non_positive_height() {
        for m in [0.0, -0.5, f64::NAN] {
            let mut bad = entry("Flatmon", 1, &[PokeType::Normal]);
            bad.height.m = m;
            assert!(matches!(
                check_pokedex(vec![bad]).unwrap_err(),
                PokedexError::NonPositive { field: "height", .. }
            ));
        }
    }

    #[test]
    fn test_check_allows_missing_translations() {
        let mut first = entry("Sneasel", 2, &[PokeType::Dark, PokeType::Ice]);
        let mut second = entry("Weavile", 4, &[PokeType::Dark, PokeType::Ice]);
        first.name.ko = String::new();
        second.name.ko = String::new();
        assert!(check_pokedex(vec![first, second]).is_ok());
    }

    // ==================== YAML Tests ====================

    #[test]
    fn test_yaml_field_names() {
        let yaml = serde_yaml::to_string(&entries_from_csv(CSV).unwrap()).unwrap();
        assert!(yaml.contains("type:"));
        assert!(yaml.contains("m: 0.7"));
        assert!(yaml.contains("kg: 6.9"));
        assert!(!yaml.contains("forms"));
    }

    #[test]
    fn test_load_yaml_with_forms() {
        let yaml = r#"
- name: { en: Vulpix, ja: ロコン, ko: 식스테일 }
  generation: 1
  type: [Fire]
  height: { m: 0.6 }
  weight: { kg: 9.9 }
  forms:
    - name: { en: Alolan Vulpix, ja: ロコン(アローラ), ko: 식스테일(알로라) }
      generation: 7
      type: [Ice]
      height: { m: 0.6 }
      weight: { kg: 9.9 }
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokedex.yaml");
        std::fs::write(&path, yaml).unwrap();

        let pokedex = Pokedex::load(&path).unwrap();
        assert_eq!(pokedex.len(), 2);
        assert_eq!(pokedex.max_generation(), 7);

        let form = pokedex.get("Alolan Vulpix").unwrap();
        assert_eq!(form.base.as_ref().unwrap().ja, "ロコン");
        assert!(pokedex.get("Vulpix").unwrap().base.is_none());
    }

    #[test]
    fn test_load_yaml_missing_file() {
        let err = load_yaml(Path::new("/nonexistent/pokedex.yaml")).unwrap_err();
        assert!(matches!(err, PokedexError::Io { .. }));
    }

    // ==================== Index Tests ====================

    #[test]
    fn test_from_entries_rejects_typeless_entry() {
        let err = Pokedex::from_entries(vec![entry("Blank", 1, &[])]).unwrap_err();
        assert!(matches!(err, PokedexError::TypeCount { count: 0, .. }));
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let pokedex = Pokedex::from_entries(entries_from_csv(CSV).unwrap()).unwrap();
        assert_eq!(
            pokedex.find_by_name("en", "  bulbasaur ").unwrap().entry.key(),
            "Bulbasaur"
        );
        assert_eq!(
            pokedex.find_by_name("ko", "파이리").unwrap().entry.key(),
            "Charmander"
        );
        assert!(pokedex.find_by_name("ja", "Bulbasaur").is_none());
        assert!(pokedex.find_by_name("fr", "Bulbasaur").is_none());
    }

    #[test]
    fn test_candidates_filter_by_generation() {
        let pokedex = Pokedex::from_entries(vec![
            entry("Pikachu", 1, &[PokeType::Electric]),
            entry("Pichu", 2, &[PokeType::Electric]),
            entry("Pachirisu", 4, &[PokeType::Electric]),
        ])
        .unwrap();
        let keys: Vec<_> = pokedex
            .candidates(2, 4)
            .iter()
            .map(|e| e.entry.key().to_string())
            .collect();
        assert_eq!(keys, vec!["Pachirisu", "Pichu"]);
    }

    #[test]
    fn test_info_dual_type() {
        let entries = entries_from_csv(CSV).unwrap();
        let translator = Translator::builtin(Language::ENGLISH);
        assert_eq!(
            info(&entries[0], &translator),
            "Gen: 1\nType 1: Grass\nType 2: Poison\nHeight: 0.7 m\nWeight: 6.9 kg"
        );
    }

    #[test]
    fn test_info_single_type_japanese() {
        let entries = entries_from_csv(CSV).unwrap();
        let translator = Translator::builtin(Language::JAPANESE);
        let text = info(&entries[1], &translator);
        assert!(text.contains("ほのお"));
        assert!(!text.contains(" 1:"));
    }

    #[test]
    fn test_poketype_roundtrip_names() {
        for t in PokeType::ALL {
            assert_eq!(t.as_str().parse::<PokeType>().unwrap(), t);
            assert_eq!(PokeType::ALL[t.index()], t);
        }
        assert!("fire".parse::<PokeType>().is_err());
    }
}
