//! Journal Statistics
//!
//! Pure functions over an owner's entries. No I/O and no failure modes:
//! empty or sparse input yields zero, empty or `Stable` results.
//!
//! - **streaks**: current and longest runs of consecutive writing days
//! - **aggregates**: mood average, tag counts, per-month counts and moods
//! - **trend**: least squares mood trend over the last ten moods
//!
//! Calendar days are computed in a caller-supplied time zone.
//! [`JournalStats::compute`] uses the device's local zone.

pub mod aggregates;
pub mod streaks;
pub mod trend;

pub use aggregates::{
    entries_by_month, month_key, mood_average, mood_by_month, mood_distribution, top_tags,
    MonthCount, MonthMood, MoodCount, TagCount,
};
pub use streaks::{current_streak, entry_days, longest_streak};
pub use trend::{linear_slope, mood_trend, recent_moods, MoodTrend};

use crate::model::JournalEntry;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Read-only statistics snapshot for one user's entries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JournalStats {
    pub total_entries: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub mood_average: f64,
    pub top_tags: Vec<TagCount>,
    pub entries_by_month: Vec<MonthCount>,
    pub mood_by_month: Vec<MonthMood>,
    pub mood_distribution: Vec<MoodCount>,
    pub mood_trend: MoodTrend,
}

impl JournalStats {
    /// Compute statistics using local calendar days
    pub fn compute(entries: &[JournalEntry]) -> Self {
        Self::compute_in(entries, &Local)
    }

    /// Compute statistics using calendar days in `tz`
    pub fn compute_in<Tz: TimeZone>(entries: &[JournalEntry], tz: &Tz) -> Self {
        Self {
            total_entries: entries.len(),
            current_streak: current_streak(entries, tz),
            longest_streak: longest_streak(entries, tz),
            mood_average: mood_average(entries),
            top_tags: top_tags(entries),
            entries_by_month: entries_by_month(entries, tz),
            mood_by_month: mood_by_month(entries, tz),
            mood_distribution: mood_distribution(entries),
            mood_trend: mood_trend(entries),
        }
    }
}

impl std::fmt::Display for JournalStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "entries={}, current_streak={}, longest_streak={}, mood_avg={:.2}, trend={}",
            self.total_entries,
            self.current_streak,
            self.longest_streak,
            self.mood_average,
            self.mood_trend
        )
    }
}
