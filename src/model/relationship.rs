//! People the user writes about

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of relationship
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Romantic,
    Friendship,
    Family,
    Other,
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "romantic" => Ok(RelationshipType::Romantic),
            "friendship" | "friend" => Ok(RelationshipType::Friendship),
            "family" => Ok(RelationshipType::Family),
            "other" => Ok(RelationshipType::Other),
            _ => Err(format!("Unknown relationship type: {}", s)),
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipType::Romantic => write!(f, "romantic"),
            RelationshipType::Friendship => write!(f, "friendship"),
            RelationshipType::Family => write!(f, "family"),
            RelationshipType::Other => write!(f, "other"),
        }
    }
}

/// Current state of a relationship
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Active,
    Ended,
    Complicated,
}

impl std::str::FromStr for RelationshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(RelationshipStatus::Active),
            "ended" => Ok(RelationshipStatus::Ended),
            "complicated" => Ok(RelationshipStatus::Complicated),
            _ => Err(format!("Unknown relationship status: {}", s)),
        }
    }
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipStatus::Active => write!(f, "active"),
            RelationshipStatus::Ended => write!(f, "ended"),
            RelationshipStatus::Complicated => write!(f, "complicated"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    pub status: RelationshipStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        kind: RelationshipType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            kind,
            status: RelationshipStatus::Active,
            start_date: None,
            end_date: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set start date
    pub fn started(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Builder: set notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn apply(&mut self, patch: RelationshipPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.updated_at = self.updated_at.max(now);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Relationship name cannot be empty".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err("End date cannot be before start date".to_string());
            }
        }
        Ok(())
    }
}

/// Partial update for a relationship; `Some(None)` clears a date
#[derive(Debug, Clone, Default)]
pub struct RelationshipPatch {
    pub name: Option<String>,
    pub kind: Option<RelationshipType>,
    pub status: Option<RelationshipStatus>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_and_status() {
        assert_eq!("Family".parse::<RelationshipType>().unwrap(), RelationshipType::Family);
        assert_eq!("friend".parse::<RelationshipType>().unwrap(), RelationshipType::Friendship);
        assert!("coworker".parse::<RelationshipType>().is_err());
        assert_eq!("ended".parse::<RelationshipStatus>().unwrap(), RelationshipStatus::Ended);
    }

    #[test]
    fn test_date_order_validation() {
        let now = Utc::now();
        let mut rel = Relationship::new("u1", "Sam", RelationshipType::Friendship, now)
            .started(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert!(rel.validate().is_ok());

        rel.apply(
            RelationshipPatch {
                end_date: Some(NaiveDate::from_ymd_opt(2022, 1, 1)),
                ..Default::default()
            },
            now,
        );
        assert!(rel.validate().is_err());
    }

    #[test]
    fn test_type_field_name() {
        let rel = Relationship::new("u1", "Alex", RelationshipType::Romantic, Utc::now());
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "romantic");
        assert_eq!(json["status"], "active");
    }
}
