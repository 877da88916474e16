//! Payment cards registered by a user.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: Uuid,
    pub user_id: UserId,
    pub bank: String,
    pub last4: String,
    pub variant: CardVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        user_id: UserId,
        bank: impl Into<String>,
        last4: impl Into<String>,
        variant: CardVariant,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            bank: bank.into(),
            last4: last4.into(),
            variant,
            card_name: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Identifiable for Card {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Card {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

impl Displayable for Card {
    fn display_label(&self) -> String {
        format!("{} ****{}", self.bank, self.last4)
    }
}

/// Returns `true` when `value` is exactly four ASCII digits.
pub fn is_valid_last4(value: &str) -> bool {
    value.len() == 4 && value.chars().all(|c| c.is_ascii_digit())
}

/// Product tier of a payment card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    #[default]
    Select,
    Platinum,
    Classic,
    Gold,
}

impl CardVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            CardVariant::Select => "select",
            CardVariant::Platinum => "platinum",
            CardVariant::Classic => "classic",
            CardVariant::Gold => "gold",
        }
    }
}

impl FromStr for CardVariant {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "select" => Ok(CardVariant::Select),
            "platinum" => Ok(CardVariant::Platinum),
            "classic" => Ok(CardVariant::Classic),
            "gold" => Ok(CardVariant::Gold),
            _ => Err(ParseEnumError::new("card variant", value)),
        }
    }
}

impl fmt::Display for CardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CardVariant::Select => "Select",
            CardVariant::Platinum => "Platinum",
            CardVariant::Classic => "Classic",
            CardVariant::Gold => "Gold",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_masks_card_number() {
        let card = Card::new(UserId::new(), "HDFC Bank", "4242", CardVariant::Select, Utc::now());
        assert_eq!(card.display_label(), "HDFC Bank ****4242");
        assert!(card.is_active);
    }

    #[test]
    fn last4_requires_four_digits() {
        assert!(is_valid_last4("0123"));
        assert!(!is_valid_last4("123"));
        assert!(!is_valid_last4("12a4"));
        assert!(!is_valid_last4("12345"));
    }

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("Platinum".parse::<CardVariant>(), Ok(CardVariant::Platinum));
        assert!("diamond".parse::<CardVariant>().is_err());
    }
}
