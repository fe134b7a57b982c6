//! A single game session: the secret, the guesses so far and the outcome.

use crate::compare::{compare, GuessFeedback};
use crate::daily::DailySchedule;
use crate::i18n::Language;
use crate::pokedex::Pokedex;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown Pokémon: {0}")]
    UnknownPokemon(String),

    #[error("already guessed: {0}")]
    AlreadyGuessed(String),

    #[error("the game is already over")]
    Finished,

    #[error("invalid generation range {min}..={max}")]
    InvalidGenerationRange { min: u8, max: u8 },

    #[error("no Pokémon in generations {min}..={max}")]
    NoCandidates { min: u8, max: u8 },

    #[error("no daily puzzle for {0}")]
    NoPuzzle(NaiveDate),

    #[error("daily answer {0} is not in the pokedex")]
    UnknownSecret(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GameMode {
    Daily { number: usize, date: NaiveDate },
    Free { min_gen: u8, max_gen: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessRecord {
    /// English key of the guessed entry
    pub key: String,
    pub feedback: GuessFeedback,
}

#[derive(Debug, Clone)]
pub struct Game {
    mode: GameMode,
    secret: String,
    guesses: Vec<GuessRecord>,
    max_attempts: usize,
}

impl Game {
    /// Today's puzzle from a daily sequence.
    pub fn daily(
        pokedex: &Pokedex,
        schedule: &DailySchedule,
        date: NaiveDate,
        max_attempts: usize,
    ) -> Result<Self, GameError> {
        let puzzle = schedule.answer_for(date).ok_or(GameError::NoPuzzle(date))?;
        if pokedex.get(&puzzle.name).is_none() {
            return Err(GameError::UnknownSecret(puzzle.name));
        }

        Ok(Self {
            mode: GameMode::Daily {
                number: puzzle.number,
                date,
            },
            secret: puzzle.name,
            guesses: Vec::new(),
            max_attempts,
        })
    }

    /// A random secret from generations `min_gen..=max_gen`.
    ///
    /// The upper bound is clamped to the newest generation in the dataset.
    pub fn free<R: Rng + ?Sized>(
        pokedex: &Pokedex,
        min_gen: u8,
        max_gen: u8,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let max_gen = max_gen.min(pokedex.max_generation());
        if min_gen == 0 || min_gen > max_gen {
            return Err(GameError::InvalidGenerationRange {
                min: min_gen,
                max: max_gen,
            });
        }

        let secret = pokedex
            .candidates(min_gen, max_gen)
            .choose(rng)
            .map(|e| e.entry.key().to_string())
            .ok_or(GameError::NoCandidates {
                min: min_gen,
                max: max_gen,
            })?;

        Ok(Self {
            mode: GameMode::Free { min_gen, max_gen },
            secret,
            guesses: Vec::new(),
            max_attempts,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// English key of the secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn attempts_left(&self) -> usize {
        self.max_attempts.saturating_sub(self.guesses.len())
    }

    pub fn status(&self) -> GameStatus {
        if self.guesses.iter().any(|g| g.feedback.is_correct()) {
            GameStatus::Won
        } else if self.attempts_left() == 0 {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status() != GameStatus::InProgress
    }

    /// Guess a Pokémon by its name in `language`.
    pub fn guess(
        &mut self,
        pokedex: &Pokedex,
        language: Language,
        input: &str,
    ) -> Result<&GuessRecord, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }

        let guessed = pokedex
            .find_by_name(language.code(), input)
            .ok_or_else(|| GameError::UnknownPokemon(input.trim().to_string()))?;
        let key = guessed.entry.key().to_string();

        if self.guesses.iter().any(|g| g.key == key) {
            return Err(GameError::AlreadyGuessed(input.trim().to_string()));
        }

        let secret = pokedex
            .get(&self.secret)
            .ok_or_else(|| GameError::UnknownSecret(self.secret.clone()))?;

        self.guesses.push(GuessRecord {
            key,
            feedback: compare(&secret.entry, &guessed.entry),
        });
        Ok(&self.guesses[self.guesses.len() - 1])
    }

    /// Spoiler-free summary: title line plus one emoji row per guess.
    pub fn share_text(&self, title: &str, mode_label: &str) -> String {
        let mode = match self.mode {
            GameMode::Daily { number, .. } => format!("{} #{}", mode_label, number),
            GameMode::Free { .. } => mode_label.to_string(),
        };
        let score = match self.status() {
            GameStatus::Won => self.guesses.len().to_string(),
            _ => "X".to_string(),
        };

        let mut lines = vec![format!("{} {} {}/{}", title, mode, score, self.max_attempts)];
        lines.extend(self.guesses.iter().map(|g| g.feedback.emoji_row()));
        lines.join("\n")
    }
}
