//! User profile and reminder preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub preferences: ProfilePreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: UserId, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
            avatar_url: None,
            preferences: ProfilePreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for UserProfile {
    fn owner(&self) -> UserId {
        self.id
    }
}

impl Displayable for UserProfile {
    fn display_label(&self) -> String {
        match &self.full_name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfilePreferences {
    pub default_currency: String,
    pub reminder_enabled: bool,
    pub reminder_days: u32,
}

impl Default for ProfilePreferences {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.into(),
            reminder_enabled: true,
            reminder_days: DEFAULT_REMINDER_DAYS,
        }
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub reminder_enabled: Option<bool>,
    #[serde(default)]
    pub reminder_days: Option<u32>,
}
