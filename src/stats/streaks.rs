//! Writing streaks
//!
//! A streak is a run of consecutive calendar days with at least one entry.
//! Days are taken in the supplied time zone; the time of day is discarded.

use crate::model::JournalEntry;
use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeSet;

/// Distinct calendar days that have at least one entry, ascending
pub fn entry_days<Tz: TimeZone>(entries: &[JournalEntry], tz: &Tz) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .map(|e| e.created_at.with_timezone(tz).date_naive())
        .collect()
}

/// Consecutive days ending at the newest entry's day
pub fn current_streak<Tz: TimeZone>(entries: &[JournalEntry], tz: &Tz) -> u32 {
    let days = entry_days(entries, tz);
    let Some(&newest) = days.last() else {
        return 0;
    };

    let mut streak = 1;
    let mut day = newest;
    while let Some(prev) = day.pred_opt() {
        if !days.contains(&prev) {
            break;
        }
        streak += 1;
        day = prev;
    }
    streak
}

/// Longest run of consecutive days anywhere in the history
pub fn longest_streak<Tz: TimeZone>(entries: &[JournalEntry], tz: &Tz) -> u32 {
    let days = entry_days(entries, tz);

    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in days {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use chrono::{Duration, FixedOffset, Utc};

    fn entry_at(ts: chrono::DateTime<Utc>) -> JournalEntry {
        JournalEntry::from_new(NewEntry::new("u1", "entry"), ts)
    }

    fn days_ago(base: chrono::DateTime<Utc>, days: &[i64]) -> Vec<JournalEntry> {
        days.iter().map(|&d| entry_at(base - Duration::days(d))).collect()
    }

    fn base() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(current_streak(&[], &Utc), 0);
        assert_eq!(longest_streak(&[], &Utc), 0);
    }

    #[test]
    fn test_three_consecutive_days() {
        let entries = days_ago(base(), &[0, 1, 2]);
        assert_eq!(current_streak(&entries, &Utc), 3);
        assert_eq!(longest_streak(&entries, &Utc), 3);
    }

    #[test]
    fn test_gap_breaks_streak() {
        let entries = days_ago(base(), &[0, 1, 5]);
        assert_eq!(current_streak(&entries, &Utc), 2);
        assert_eq!(longest_streak(&entries, &Utc), 2);
    }

    #[test]
    fn test_same_day_counts_once() {
        let b = base();
        let entries = vec![
            entry_at(b),
            entry_at(b - Duration::hours(3)),
            entry_at(b - Duration::days(1)),
        ];
        assert_eq!(current_streak(&entries, &Utc), 2);
    }

    #[test]
    fn test_past_streak_longer_than_current() {
        let entries = days_ago(base(), &[0, 10, 11, 12, 13]);
        assert_eq!(current_streak(&entries, &Utc), 1);
        assert_eq!(longest_streak(&entries, &Utc), 4);
    }

    #[test]
    fn test_unordered_input() {
        let entries = days_ago(base(), &[2, 0, 1]);
        assert_eq!(current_streak(&entries, &Utc), 3);
    }

    #[test]
    fn test_day_boundary_follows_time_zone() {
        // 23:30 and 00:30 UTC on consecutive days fall on the same day at UTC-2
        let late = Utc.with_ymd_and_hms(2024, 6, 14, 23, 30, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 6, 15, 0, 30, 0).unwrap();
        let entries = vec![entry_at(early), entry_at(late)];

        assert_eq!(current_streak(&entries, &Utc), 2);

        let minus_two = FixedOffset::west_opt(2 * 3600).unwrap();
        assert_eq!(current_streak(&entries, &minus_two), 1);
        assert_eq!(entry_days(&entries, &minus_two).len(), 1);
    }
}
