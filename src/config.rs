use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Default upstream list of dated answers imported by `normalize-fake-daily`.
pub const DEFAULT_FAKE_DAILY_URL: &str =
    "https://raw.githubusercontent.com/Fireblend/squirdle/main/fake-daily.csv";

#[derive(Debug, Clone)]
pub struct Config {
    // Language
    pub language: String,
    pub starting_date: Option<NaiveDate>,

    // Data files
    pub pokedex_file: PathBuf,
    pub pokedex_csv: PathBuf,
    pub translation_dir: PathBuf,
    pub generated_dir: PathBuf,

    // Server
    pub port: u16,

    // Game rules
    pub min_generation: u8,
    pub max_generation: Option<u8>,
    pub max_attempts: usize,

    // Tooling
    pub ref_check_concurrency: usize,
    pub fake_daily_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Language
            language: std::env::var("SQ_LANG").unwrap_or_else(|_| "en".to_string()),
            starting_date: match std::env::var("SQ_STARTDATE") {
                Ok(v) => Some(
                    NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                        .with_context(|| format!("SQ_STARTDATE is not a YYYY-MM-DD date: {}", v))?,
                ),
                Err(_) => None,
            },

            // Data files
            pokedex_file: path_var("POKEDEX_FILE", "pokedex.yaml"),
            pokedex_csv: path_var("POKEDEX_CSV", "pokedex.csv"),
            translation_dir: path_var("TRANSLATION_DIR", "translation"),
            generated_dir: path_var("GENERATED_DIR", "generated"),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Game rules
            min_generation: std::env::var("SQ_MIN_GEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            max_generation: std::env::var("SQ_MAX_GEN")
                .ok()
                .and_then(|v| v.parse().ok()),
            max_attempts: std::env::var("MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(8),

            // Tooling
            ref_check_concurrency: std::env::var("REF_CHECK_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(50),
            fake_daily_url: std::env::var("FAKE_DAILY_URL")
                .unwrap_or_else(|_| DEFAULT_FAKE_DAILY_URL.to_string()),
        })
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    std::env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
