//! Daily puzzle sequence: one secret per calendar day from a starting date.
//!
//! Sequences live in `generated/<lang>/daily.json`:
//!
//! ```json
//! { "startingDate": "2022-03-01", "endDate": "2024-12-01", "names": ["Pikachu", "..."] }
//! ```

use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DAILY_FILE: &str = "daily.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySchedule {
    pub starting_date: NaiveDate,
    /// Older files were written without it; see `fix-daily`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub names: Vec<String>,
}

/// The answer for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPuzzle {
    /// 1-based puzzle number
    pub number: usize,
    pub date: NaiveDate,
    pub name: String,
}

impl DailySchedule {
    pub fn new(starting_date: NaiveDate, names: Vec<String>) -> Self {
        let mut schedule = Self {
            starting_date,
            end_date: None,
            names,
        };
        schedule.end_date = Some(schedule.computed_end_date());
        schedule
    }

    /// First day without a puzzle: `starting_date + names.len()` days.
    pub fn computed_end_date(&self) -> NaiveDate {
        self.starting_date
            .checked_add_days(Days::new(self.names.len() as u64))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Puzzle for `date`, or `None` before the start or once names run out.
    pub fn answer_for(&self, date: NaiveDate) -> Option<DailyPuzzle> {
        let offset = (date - self.starting_date).num_days();
        let index = usize::try_from(offset).ok()?;
        self.names.get(index).map(|name| DailyPuzzle {
            number: index + 1,
            date,
            name: name.clone(),
        })
    }

    pub fn path(generated_dir: &Path, lang: &str) -> PathBuf {
        generated_dir.join(lang).join(DAILY_FILE)
    }

    /// Read the sequence for `lang`; `Ok(None)` when none was generated.
    pub fn load(generated_dir: &Path, lang: &str) -> Result<Option<Self>> {
        let path = Self::path(generated_dir, lang);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let schedule = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(schedule))
    }

    /// Write the sequence for `lang`, creating the directory as needed.
    pub fn save(&self, generated_dir: &Path, lang: &str) -> Result<PathBuf> {
        let path = Self::path(generated_dir, lang);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// First column of `pokedex.csv`, header skipped.
pub fn names_from_csv(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .filter_map(|line| line.trim().split(',').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build and save a daily sequence.
///
/// Without explicit `names`, every name in `pokedex_csv` is used in a fresh
/// random order.
pub fn make_daily<R: Rng + ?Sized>(
    generated_dir: &Path,
    pokedex_csv: &Path,
    lang: &str,
    starting_date: NaiveDate,
    names: Option<Vec<String>>,
    rng: &mut R,
) -> Result<DailySchedule> {
    let names = match names {
        Some(names) => names,
        None => {
            let text = std::fs::read_to_string(pokedex_csv)
                .with_context(|| format!("Failed to read {}", pokedex_csv.display()))?;
            let mut names = names_from_csv(&text);
            names.shuffle(rng);
            names
        }
    };

    if names.is_empty() {
        bail!("No names to schedule for {}", lang);
    }

    let schedule = DailySchedule::new(starting_date, names);
    let path = schedule.save(generated_dir, lang)?;
    info!(
        "Wrote {} daily puzzles for {} ({} to {}) to {}",
        schedule.names.len(),
        lang,
        schedule.starting_date,
        schedule.computed_end_date(),
        path.display()
    );
    Ok(schedule)
}

/// Recompute `endDate` of an existing sequence.
pub fn fix_daily(generated_dir: &Path, lang: &str) -> Result<DailySchedule> {
    let mut schedule = DailySchedule::load(generated_dir, lang)?
        .with_context(|| format!("No {} for {}", DAILY_FILE, lang))?;
    schedule.end_date = Some(schedule.computed_end_date());
    schedule.save(generated_dir, lang)?;
    info!("Fixed {}: endDate = {}", lang, schedule.computed_end_date());
    Ok(schedule)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .with_context(|| format!("Unrecognized date: {}", s))
}

/// Parse a `date,name` CSV (header skipped) into a start date and names.
pub fn parse_fake_daily(text: &str) -> Result<(NaiveDate, Vec<String>)> {
    let rows: Vec<Vec<&str>> = text
        .trim()
        .lines()
        .skip(1)
        .map(|line| line.trim().split(',').map(str::trim).collect())
        .collect();

    let first = rows.first().context("Fake daily CSV has no rows")?;
    let starting_date = parse_date(first[0])?;

    let names = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.get(1)
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string())
                .with_context(|| format!("Fake daily CSV row {} has no name", i + 2))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((starting_date, names))
}

/// Download the fake daily CSV.
pub async fn fetch_fake_daily(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    with_retry_if(
        &RetryConfig::remote_file(),
        "Fake daily download",
        || async {
            let response = client.get(url).send().await?;
            let text = response.error_for_status()?.text().await?;
            Ok::<_, reqwest::Error>(text)
        },
        |e: &reqwest::Error| e.status().map(|s| s.is_server_error()).unwrap_or(true),
    )
    .await
    .with_context(|| format!("Failed to download {}", url))
}

/// Import the upstream dated answer list as the English sequence.
pub async fn normalize_fake_daily(generated_dir: &Path, url: &str) -> Result<DailySchedule> {
    let text = fetch_fake_daily(url).await?;
    let (starting_date, names) = parse_fake_daily(&text)?;
    let schedule = DailySchedule::new(starting_date, names);
    schedule.save(generated_dir, "en")?;
    info!(
        "Imported {} daily puzzles starting {}",
        schedule.names.len(),
        starting_date
    );
    Ok(schedule)
}
