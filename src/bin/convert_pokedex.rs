//! Convert `pokedex.csv` into the validated `pokedex.yaml` the game loads.
//!
//! Optional environment variables:
//! - POKEDEX_CSV (defaults to pokedex.csv)
//! - POKEDEX_FILE (defaults to pokedex.yaml)

use anyhow::{Context, Result};
use squirdle::config::Config;
use squirdle::pokedex;
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    squirdle::init_logging("convert_pokedex")?;

    let config = Config::from_env()?;

    let text = std::fs::read_to_string(&config.pokedex_csv)
        .with_context(|| format!("Failed to read {}", config.pokedex_csv.display()))?;
    let entries = pokedex::entries_from_csv(&text)?;
    pokedex::write_yaml(&config.pokedex_file, &entries)?;

    info!(
        "✓ Converted {} Pokémon from {} to {}",
        entries.len(),
        config.pokedex_csv.display(),
        config.pokedex_file.display()
    );
    Ok(())
}
