//! Mood trend classification
//!
//! Fits an ordinary least squares line through the most recent moods and
//! classifies the slope.

use crate::model::JournalEntry;
use serde::{Deserialize, Serialize};

/// Number of most recent mood-bearing entries considered
pub const TREND_WINDOW: usize = 10;
/// Fewer mood points than this always yields `Stable`
pub const MIN_TREND_POINTS: usize = 3;
/// Slope magnitude above which the trend is not `Stable`
pub const TREND_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    #[default]
    Stable,
}

impl MoodTrend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_THRESHOLD {
            MoodTrend::Improving
        } else if slope < -TREND_THRESHOLD {
            MoodTrend::Declining
        } else {
            MoodTrend::Stable
        }
    }
}

impl std::fmt::Display for MoodTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoodTrend::Improving => write!(f, "improving"),
            MoodTrend::Declining => write!(f, "declining"),
            MoodTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Slope of the least squares line through `(i, values[i])`.
///
/// Returns `None` for fewer than two points.
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..n).map(|i| (i as f64).powi(2)).sum();

    let denominator = n_f * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    Some((n_f * sum_xy - sum_x * sum_y) / denominator)
}

/// Mood values of the most recent `TREND_WINDOW` entries with a mood,
/// oldest first
pub fn recent_moods(entries: &[JournalEntry]) -> Vec<f64> {
    let mut with_mood: Vec<&JournalEntry> = entries.iter().filter(|e| e.mood.is_some()).collect();
    // Newest first; stable so same-instant entries keep input order
    with_mood.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut values: Vec<f64> = with_mood
        .iter()
        .take(TREND_WINDOW)
        .filter_map(|e| e.mood.map(|m| m.value() as f64))
        .collect();
    values.reverse();
    values
}

/// Classify the recent mood direction
pub fn mood_trend(entries: &[JournalEntry]) -> MoodTrend {
    let values = recent_moods(entries);
    if values.len() < MIN_TREND_POINTS {
        return MoodTrend::Stable;
    }
    linear_slope(&values)
        .map(MoodTrend::from_slope)
        .unwrap_or_default()
}
