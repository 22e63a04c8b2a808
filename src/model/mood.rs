//! Mood ratings
//!
//! A mood is a 1-5 rating. The numeric value is the only stored field;
//! emoji, label and color are looked up from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest valid mood value
pub const MIN_MOOD: u8 = 1;
/// Highest valid mood value
pub const MAX_MOOD: u8 = 5;

/// A discrete 1-5 affect rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub const AWFUL: Mood = Mood(1);
    pub const BAD: Mood = Mood(2);
    pub const OKAY: Mood = Mood(3);
    pub const GOOD: Mood = Mood(4);
    pub const GREAT: Mood = Mood(5);

    /// Create a mood, rejecting values outside 1..=5
    pub fn new(value: u8) -> Result<Self, InvalidMood> {
        if (MIN_MOOD..=MAX_MOOD).contains(&value) {
            Ok(Mood(value))
        } else {
            Err(InvalidMood(value))
        }
    }

    /// All moods from worst to best
    pub fn all() -> [Mood; 5] {
        [Mood::AWFUL, Mood::BAD, Mood::OKAY, Mood::GOOD, Mood::GREAT]
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn emoji(self) -> &'static str {
        match self.0 {
            1 => "😢",
            2 => "😕",
            3 => "😐",
            4 => "🙂",
            _ => "😄",
        }
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Awful",
            2 => "Bad",
            3 => "Okay",
            4 => "Good",
            _ => "Great",
        }
    }

    /// Hex color used by the mood picker and charts
    pub fn color(self) -> &'static str {
        match self.0 {
            1 => "#E57373",
            2 => "#FFB74D",
            3 => "#FFF176",
            4 => "#81C784",
            _ => "#64B5F6",
        }
    }
}

impl TryFrom<u8> for Mood {
    type Error = InvalidMood;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Mood::new(value)
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood.0
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

/// Returned when a mood value is outside 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Mood must be between 1 and 5, got {0}")]
pub struct InvalidMood(pub u8);
