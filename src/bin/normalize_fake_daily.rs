//! Import the upstream `date,name` answer list as the English daily sequence.
//!
//! Optional environment variables:
//! - FAKE_DAILY_URL (defaults to the upstream Squirdle repository)
//! - GENERATED_DIR (defaults to generated)

use anyhow::Result;
use squirdle::config::Config;
use squirdle::daily;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    squirdle::init_logging("normalize_fake_daily")?;

    let config = Config::from_env()?;
    info!("Downloading {}", config.fake_daily_url);

    let schedule = daily::normalize_fake_daily(&config.generated_dir, &config.fake_daily_url).await?;
    info!(
        "✓ English sequence: {} to {}",
        schedule.starting_date,
        schedule.computed_end_date()
    );
    Ok(())
}
