//! Shared traits, identifiers, and parse errors for tracker primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency every voucher is denominated in.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Reminder lead time applied when a voucher or profile does not specify one.
pub const DEFAULT_REMINDER_DAYS: u32 = 7;

/// Identity of an authenticated user. Every owned row carries one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Exposes a stable identifier for entities held by the store.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Rows scoped to a single user.
pub trait Owned {
    fn owner(&self) -> UserId;

    fn is_owned_by(&self, user: UserId) -> bool {
        self.owner() == user
    }
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Returned when a textual value does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// Normalises free-text form input: trims and maps blank strings to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_whitespace_only_values() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" note ".into())), Some("note".into()));
    }

    #[test]
    fn user_id_serializes_as_plain_uuid() {
        let id = UserId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
