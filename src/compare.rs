//! Guess evaluation: the per-attribute diff between a secret and a guess.

use crate::pokedex::{PokeType, PokedexEntry};
use serde::{Deserialize, Serialize};

/// Feedback for an ordered attribute (generation, height, weight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hint {
    Correct,
    /// The secret's value is greater than the guess
    Higher,
    /// The secret's value is smaller than the guess
    Lower,
}

impl Hint {
    fn of<T: PartialOrd>(secret: T, guess: T) -> Hint {
        if secret == guess {
            Hint::Correct
        } else if secret > guess {
            Hint::Higher
        } else {
            Hint::Lower
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Hint::Correct => "🟩",
            Hint::Higher => "🔼",
            Hint::Lower => "🔽",
        }
    }
}

/// Feedback for one type slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    Correct,
    /// The guessed type is the secret's type in the other slot
    WrongPosition,
    Absent,
}

impl TypeHint {
    fn of(slot: Option<PokeType>, same: Option<PokeType>, other: Option<PokeType>) -> TypeHint {
        if slot == same {
            TypeHint::Correct
        } else if slot.is_some() && slot == other {
            TypeHint::WrongPosition
        } else {
            TypeHint::Absent
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TypeHint::Correct => "🟩",
            TypeHint::WrongPosition => "🟨",
            TypeHint::Absent => "🟥",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessFeedback {
    pub generation: Hint,
    pub type1: TypeHint,
    pub type2: TypeHint,
    pub height: Hint,
    pub weight: Hint,
    /// The guess is the secret itself
    pub correct: bool,
}

impl GuessFeedback {
    pub fn is_correct(&self) -> bool {
        self.correct
    }

    /// One share line, attributes in display order.
    pub fn emoji_row(&self) -> String {
        [
            self.generation.emoji(),
            self.type1.emoji(),
            self.type2.emoji(),
            self.height.emoji(),
            self.weight.emoji(),
        ]
        .concat()
    }
}

/// Compare a guess against the secret.
pub fn compare(secret: &PokedexEntry, guess: &PokedexEntry) -> GuessFeedback {
    let (s1, s2) = (Some(secret.type1()), secret.type2());
    let (g1, g2) = (Some(guess.type1()), guess.type2());

    GuessFeedback {
        generation: Hint::of(secret.generation, guess.generation),
        type1: TypeHint::of(g1, s1, s2),
        type2: TypeHint::of(g2, s2, s1),
        height: Hint::of(secret.height.m, guess.height.m),
        weight: Hint::of(secret.weight.kg, guess.weight.kg),
        correct: secret.key() == guess.key(),
    }
}
