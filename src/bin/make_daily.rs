//! Generate the daily puzzle sequence for one language.
//!
//! Usage:
//!   SQ_LANG=en SQ_STARTDATE=2022-03-01 cargo run --bin make-daily
//!   SQ_LANG=ko SQ_STARTDATE=2022-03-01 cargo run --bin make-daily -- Pikachu Eevee
//!
//! Names given as arguments are scheduled in order; otherwise every name in
//! POKEDEX_CSV is shuffled.

use anyhow::{bail, Result};
use squirdle::config::Config;
use squirdle::daily;
use squirdle::i18n::Language;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    squirdle::init_logging("make_daily")?;

    if std::env::var("SQ_LANG").is_err() {
        bail!("SQ_LANG is required, e.g. SQ_LANG=en SQ_STARTDATE=2022-03-01 make-daily");
    }
    let config = Config::from_env()?;
    let Some(starting_date) = config.starting_date else {
        bail!(
            "SQ_STARTDATE is required, e.g. SQ_LANG={} SQ_STARTDATE=2022-03-01 make-daily",
            config.language
        );
    };
    let language = Language::from_code(&config.language)?;

    let names: Vec<String> = std::env::args().skip(1).collect();
    let names = (!names.is_empty()).then_some(names);

    daily::make_daily(
        &config.generated_dir,
        &config.pokedex_csv,
        language.code(),
        starting_date,
        names,
        &mut rand::thread_rng(),
    )?;
    Ok(())
}
