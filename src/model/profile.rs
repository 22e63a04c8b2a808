//! User profile and app preferences

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub daily_reminder: bool,
    #[serde(default)]
    pub reminder_time: Option<NaiveTime>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_ai_companion")]
    pub ai_companion_enabled: bool,
}

fn default_ai_companion() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            daily_reminder: false,
            reminder_time: None,
            theme: Theme::default(),
            ai_companion_enabled: default_ai_companion(),
        }
    }
}

impl Preferences {
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(daily_reminder) = patch.daily_reminder {
            self.daily_reminder = daily_reminder;
        }
        if let Some(reminder_time) = patch.reminder_time {
            self.reminder_time = reminder_time;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(enabled) = patch.ai_companion_enabled {
            self.ai_companion_enabled = enabled;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub preferences: Preferences,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let user_id = user_id.into();
        Self {
            display_name: user_id.clone(),
            user_id,
            email: None,
            created_at: now,
            onboarding_completed: false,
            preferences: Preferences::default(),
        }
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(done) = patch.onboarding_completed {
            self.onboarding_completed = done;
        }
        if let Some(prefs) = patch.preferences {
            self.preferences.apply(prefs);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("Display name cannot be empty".to_string());
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("Invalid email address: {}", email));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<Option<String>>,
    pub onboarding_completed: Option<bool>,
    pub preferences: Option<PreferencesPatch>,
}

#[derive(Debug, Clone, Default)]
pub struct PreferencesPatch {
    pub daily_reminder: Option<bool>,
    pub reminder_time: Option<Option<NaiveTime>>,
    pub theme: Option<Theme>,
    pub ai_companion_enabled: Option<bool>,
}
