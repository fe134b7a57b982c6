use anyhow::Result;
use squirdle::config::Config;
use squirdle::server::{self, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    squirdle::init_logging("squirdle")?;

    info!("Starting Squirdle");

    let config = Config::from_env()?;
    info!(
        "Dataset: {}, translations: {}, generated: {}",
        config.pokedex_file.display(),
        config.translation_dir.display(),
        config.generated_dir.display()
    );

    let state = Arc::new(AppState::load(config)?);
    server::serve(state).await
}
