//! Mood, tag and per-month aggregates

use crate::model::{JournalEntry, Mood};
use chrono::{Datelike, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How often a tag appears across entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Number of entries written in a month (`YYYY-MM`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

/// Mean mood for a month (`YYYY-MM`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthMood {
    pub month: String,
    pub average: f64,
}

/// Number of entries rated with a mood value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodCount {
    pub mood: Mood,
    pub count: usize,
}

/// Mean mood over entries that have one; 0 when none do
pub fn mood_average(entries: &[JournalEntry]) -> f64 {
    let values: Vec<f64> = entries
        .iter()
        .filter_map(|e| e.mood.map(|m| m.value() as f64))
        .collect();
    mean(&values).unwrap_or(0.0)
}

/// Tag frequencies, most frequent first.
///
/// Ties keep the order in which tags were first seen. Tags are compared
/// as stored (case-sensitive).
pub fn top_tags(entries: &[JournalEntry]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tag in entries.iter().flat_map(|e| e.tags.iter()) {
        match index.get(tag.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Month key `YYYY-MM` of an entry's creation time in `tz`
pub fn month_key<Tz: TimeZone>(entry: &JournalEntry, tz: &Tz) -> String {
    let date = entry.created_at.with_timezone(tz).date_naive();
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Entry count per month, ascending by month
pub fn entries_by_month<Tz: TimeZone>(entries: &[JournalEntry], tz: &Tz) -> Vec<MonthCount> {
    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for entry in entries {
        *months.entry(month_key(entry, tz)).or_insert(0) += 1;
    }
    months
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}

/// Mean mood per month, ascending by month.
///
/// Months in which no entry has a mood are left out.
pub fn mood_by_month<Tz: TimeZone>(entries: &[JournalEntry], tz: &Tz) -> Vec<MonthMood> {
    let mut months: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for entry in entries {
        if let Some(mood) = entry.mood {
            months
                .entry(month_key(entry, tz))
                .or_default()
                .push(mood.value() as f64);
        }
    }
    months
        .into_iter()
        .filter_map(|(month, values)| mean(&values).map(|average| MonthMood { month, average }))
        .collect()
}

/// Count of entries per mood value, worst to best, zeros included
pub fn mood_distribution(entries: &[JournalEntry]) -> Vec<MoodCount> {
    Mood::all()
        .into_iter()
        .map(|mood| MoodCount {
            mood,
            count: entries.iter().filter(|e| e.mood == Some(mood)).count(),
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
