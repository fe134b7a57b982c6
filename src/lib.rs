//! Squirdle: a Pokémon name guessing game.
//!
//! The library holds the dataset loader, the guess comparator, game sessions,
//! the daily puzzle sequence and the content tooling used by the binaries in
//! `src/bin`. The `squirdle` binary serves the game over HTTP.

pub mod compare;
pub mod config;
pub mod daily;
pub mod game;
pub mod i18n;
pub mod link;
pub mod pokedex;
pub mod refcheck;
pub mod retry;
pub mod server;

/// Install the `tracing` subscriber shared by every binary.
///
/// The library and `target`, the binary's crate name, log at `info` on top
/// of whatever `RUST_LOG` asks for.
pub fn init_logging(target: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("squirdle=info".parse()?)
                .add_directive(format!("{}=info", target).parse()?),
        )
        .init();
    Ok(())
}
