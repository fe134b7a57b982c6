//! Verify every reference link for one language and maintain its `alt` table.
//!
//! Usage:
//!   SQ_LANG=en cargo run --bin check-ref-link
//!   SQ_LANG=en cargo run --bin check-ref-link -- "Mr. Mime" "Type: Null"
//!
//! Arguments restrict the check to the given localized names. Results are
//! cached in `generated/<lang>/check-ref.json`, so an interrupted run resumes.

use anyhow::Result;
use squirdle::config::Config;
use squirdle::i18n::Language;
use squirdle::refcheck;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    squirdle::init_logging("check_ref_link")?;

    let config = Config::from_env()?;
    let language = Language::from_code(&config.language)?;

    let cases: Vec<String> = std::env::args().skip(1).collect();
    let cases = (!cases.is_empty()).then_some(cases);
    if let Some(cases) = &cases {
        info!("Checking {} names only", cases.len());
    }

    let summary = refcheck::check_ref(&config, language.code(), cases).await?;
    info!(
        "✓ Checked {} pages for {}, {} without a working link",
        summary.fetched,
        language.code(),
        summary.invalid
    );
    Ok(())
}
