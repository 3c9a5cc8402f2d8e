//! Preference records sent alongside generation requests.
//!
//! Every option is a closed enum; unknown values fail deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("card count must be between {min} and {max} in steps of {step}, got {0}", min = CardCount::MIN, max = CardCount::MAX, step = CardCount::STEP)]
    InvalidCardCount(u32),
}

//=========================================================================================
// Summary Preferences
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Bullets,
    #[default]
    Paragraph,
    Takeaways,
    Notes,
}

impl SummaryStyle {
    fn instruction(self) -> &'static str {
        match self {
            Self::Bullets => "as bullet points covering the key concepts",
            Self::Paragraph => "as flowing prose paragraphs",
            Self::Takeaways => "as a numbered list of key takeaways",
            Self::Notes => "as structured study notes with short headings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTone {
    Simple,
    #[default]
    Professional,
    Conversational,
}

impl SummaryTone {
    fn instruction(self) -> &'static str {
        match self {
            Self::Simple => "simple, plain language a beginner can follow",
            Self::Professional => "a professional, precise tone",
            Self::Conversational => "a friendly, conversational tone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    fn instruction(self) -> &'static str {
        match self {
            Self::Short => "short (1-3 sentences)",
            Self::Medium => "medium (about one paragraph)",
            Self::Long => "long (a detailed, thorough summary)",
        }
    }
}

/// How a summary should read. Missing fields take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPreferences {
    pub style: SummaryStyle,
    pub tone: SummaryTone,
    pub length: SummaryLength,
}

impl SummaryPreferences {
    /// The sentence appended to the summary system instruction.
    pub fn instruction(&self) -> String {
        format!(
            "Write the summary {}, using {}. Length: {}.",
            self.style.instruction(),
            self.tone.instruction(),
            self.length.instruction()
        )
    }
}

//=========================================================================================
// Flashcard Preferences
//=========================================================================================

/// Number of cards to request: 5 to 25 in steps of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CardCount(u32);

impl CardCount {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 25;
    pub const STEP: u32 = 5;

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CardCount {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for CardCount {
    type Error = PreferenceError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) && value % Self::STEP == 0 {
            Ok(Self(value))
        } else {
            Err(PreferenceError::InvalidCardCount(value))
        }
    }
}

impl From<CardCount> for u32 {
    fn from(count: CardCount) -> Self {
        count.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashcardFormat {
    #[default]
    Qa,
    Cloze,
    Terminology,
}

impl FlashcardFormat {
    fn instruction(self) -> &'static str {
        match self {
            Self::Qa => "Write each card as a direct question with a concise answer.",
            Self::Cloze => "Write each card as a cloze deletion: the question is a sentence from the material with the key term replaced by \"____\", and the answer is the missing term.",
            Self::Terminology => "Write each card as a term in the question field and its definition in the answer field.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    fn instruction(self) -> &'static str {
        match self {
            Self::Easy => "Keep the cards easy: focus on basic facts and definitions.",
            Self::Medium => "Pitch the cards at medium difficulty: mix recall with some understanding.",
            Self::Hard => "Make the cards hard: test deeper understanding and how the ideas connect.",
        }
    }
}

/// Shape of a generated deck. Missing fields take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashcardPreferences {
    pub count: CardCount,
    pub format: FlashcardFormat,
    pub difficulty: Difficulty,
}

impl FlashcardPreferences {
    /// The sentences appended to the flashcard system instruction.
    pub fn instruction(&self) -> String {
        format!(
            "Generate exactly {} flashcards. {} {}",
            self.count.get(),
            self.format.instruction(),
            self.difficulty.instruction()
        )
    }
}
