//! Recompute `endDate` in every language's generated daily sequence.

use anyhow::Result;
use squirdle::config::Config;
use squirdle::daily::{self, DailySchedule};
use squirdle::i18n::Language;
use tracing::{info, warn};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    squirdle::init_logging("fix_daily")?;

    let config = Config::from_env()?;

    let mut fixed = 0;
    for language in Language::all() {
        let path = DailySchedule::path(&config.generated_dir, language.code());
        if !path.exists() {
            warn!("Skipping {}: {} not found", language.code(), path.display());
            continue;
        }
        daily::fix_daily(&config.generated_dir, language.code())?;
        fixed += 1;
    }

    info!("✓ Fixed {} daily sequences", fixed);
    Ok(())
}
