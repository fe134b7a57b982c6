use crate::pokedex::PokeType;

/// Built-in localized strings for a language.
///
/// These are the base translation tables. `translation/<lang>.json` files can
/// override or extend them at runtime; see [`crate::i18n::Translator`].
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Attribute Labels ====================
    /// Label for the generation attribute
    pub gen: &'static str,

    /// Label for the type attributes ("Type 1", "Type 2" are built from it)
    pub type_label: &'static str,

    /// Label for height
    pub height: &'static str,

    /// Label for weight
    pub weight: &'static str,

    // ==================== Modes ====================
    pub daily: &'static str,
    pub free: &'static str,

    // ==================== Game Messages ====================
    /// Placeholders: {name}
    pub unknown_pokemon: &'static str,

    /// Placeholders: {name}
    pub already_guessed: &'static str,

    pub game_won: &'static str,

    /// Placeholders: {answer}
    pub game_lost: &'static str,

    pub no_daily: &'static str,

    // ==================== Types ====================
    /// Type names in [`PokeType::ALL`] order
    pub types: [&'static str; 18],
}

impl LanguageStrings {
    /// Name of an elemental type in this language.
    pub fn type_name(&self, t: PokeType) -> &'static str {
        self.types[t.index()]
    }

    /// Flatten into `(key, text)` pairs. Keys are the English source strings,
    /// the same keys translation JSON files use.
    pub fn entries(&self) -> Vec<(&'static str, &'static str)> {
        let mut entries = vec![
            ("Gen", self.gen),
            ("Type", self.type_label),
            ("Height", self.height),
            ("Weight", self.weight),
            ("Daily", self.daily),
            ("Free", self.free),
            ("Unknown Pokémon", self.unknown_pokemon),
            ("Already guessed", self.already_guessed),
            ("You won!", self.game_won),
            ("Game over", self.game_lost),
            ("No daily puzzle", self.no_daily),
        ];
        entries.extend(
            PokeType::ALL
                .iter()
                .map(|t| (t.as_str(), self.type_name(*t))),
        );
        entries
    }
}

// ==================== English Strings ====================

/// English language strings (canonical)
pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    gen: "Gen",
    type_label: "Type",
    height: "Height",
    weight: "Weight",

    daily: "Daily",
    free: "Free",

    unknown_pokemon: "{name} is not a valid Pokémon",
    already_guessed: "You already guessed {name}",
    game_won: "You got it!",
    game_lost: "Game over! The answer was {answer}",
    no_daily: "There is no daily puzzle for today",

    types: [
        "Normal", "Fire", "Water", "Grass", "Electric", "Ice", "Fighting", "Poison", "Ground",
        "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dark", "Dragon", "Steel", "Fairy",
    ],
};

// ==================== Japanese Strings ====================

pub const JAPANESE_STRINGS: LanguageStrings = LanguageStrings {
    gen: "世代",
    type_label: "タイプ",
    height: "高さ",
    weight: "重さ",

    daily: "デイリー",
    free: "フリー",

    unknown_pokemon: "{name} はポケモンの名前ではありません",
    already_guessed: "{name} はもう答えました",
    game_won: "正解！",
    game_lost: "ゲームオーバー！正解は {answer} でした",
    no_daily: "今日のデイリーはありません",

    types: [
        "ノーマル", "ほのお", "みず", "くさ", "でんき", "こおり", "かくとう", "どく", "じめん",
        "ひこう", "エスパー", "むし", "いわ", "ゴースト", "あく", "ドラゴン", "はがね", "フェアリー",
    ],
};

// ==================== Korean Strings ====================

pub const KOREAN_STRINGS: LanguageStrings = LanguageStrings {
    gen: "세대",
    type_label: "타입",
    height: "키",
    weight: "몸무게",

    daily: "데일리",
    free: "프리",

    unknown_pokemon: "{name}은(는) 포켓몬 이름이 아닙니다",
    already_guessed: "{name}은(는) 이미 입력했습니다",
    game_won: "정답입니다!",
    game_lost: "게임 오버! 정답은 {answer}입니다",
    no_daily: "오늘의 데일리 퍼즐이 없습니다",

    types: [
        "노말", "불꽃", "물", "풀", "전기", "얼음", "격투", "독", "땅", "비행", "에스퍼", "벌레",
        "바위", "고스트", "악", "드래곤", "강철", "페어리",
    ],
};
