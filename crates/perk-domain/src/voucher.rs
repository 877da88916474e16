//! Domain models for recurring card vouchers.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, period::VoucherPeriod};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voucher {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Copy of the owning card's user, kept for ownership filtering.
    pub user_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cycle_type: CycleType,
    pub category: VoucherCategory,
    pub value: f64,
    pub currency: String,
    pub status: VoucherStatus,
    pub reminder_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        card_id: Uuid,
        name: impl Into<String>,
        cycle_type: CycleType,
        category: VoucherCategory,
        value: f64,
        reminder_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            user_id,
            name: name.into(),
            description: None,
            cycle_type,
            category,
            value,
            currency: DEFAULT_CURRENCY.to_string(),
            status: VoucherStatus::Pending,
            reminder_days,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Identifiable for Voucher {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Voucher {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

impl NamedEntity for Voucher {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Voucher {
    fn display_label(&self) -> String {
        format!("{} ({}, {})", self.name, self.cycle_type, self.status)
    }
}

/// A voucher joined with its periods, as returned by store selects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherWithPeriods {
    #[serde(flatten)]
    pub voucher: Voucher,
    #[serde(default)]
    pub periods: Vec<VoucherPeriod>,
}

impl VoucherWithPeriods {
    pub fn new(voucher: Voucher, periods: Vec<VoucherPeriod>) -> Self {
        Self { voucher, periods }
    }

    pub fn period_statuses(&self) -> Vec<VoucherStatus> {
        self.periods.iter().map(|period| period.status).collect()
    }
}

/// Recurrence pattern of a voucher's benefit periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CycleType {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "half-yearly")]
    HalfYearly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl CycleType {
    pub const ALL: [CycleType; 4] = [
        CycleType::Monthly,
        CycleType::Quarterly,
        CycleType::HalfYearly,
        CycleType::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CycleType::Monthly => "monthly",
            CycleType::Quarterly => "quarterly",
            CycleType::HalfYearly => "half-yearly",
            CycleType::Yearly => "yearly",
        }
    }

    /// Number of periods generated for one calendar year.
    pub fn period_count(self) -> usize {
        match self {
            CycleType::Monthly => 12,
            CycleType::Quarterly => 4,
            CycleType::HalfYearly => 2,
            CycleType::Yearly => 1,
        }
    }
}

impl FromStr for CycleType {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "monthly" => Ok(CycleType::Monthly),
            "quarterly" => Ok(CycleType::Quarterly),
            "half-yearly" => Ok(CycleType::HalfYearly),
            "yearly" => Ok(CycleType::Yearly),
            _ => Err(ParseEnumError::new("cycle type", value)),
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CycleType::Monthly => "Monthly",
            CycleType::Quarterly => "Quarterly",
            CycleType::HalfYearly => "Half-Yearly",
            CycleType::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

/// Lifecycle state shared by periods and, through aggregation, vouchers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    #[default]
    Pending,
    Redeemed,
    Sold,
    Paused,
    Expired,
}

impl VoucherStatus {
    pub const ALL: [VoucherStatus; 5] = [
        VoucherStatus::Pending,
        VoucherStatus::Redeemed,
        VoucherStatus::Sold,
        VoucherStatus::Paused,
        VoucherStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoucherStatus::Pending => "pending",
            VoucherStatus::Redeemed => "redeemed",
            VoucherStatus::Sold => "sold",
            VoucherStatus::Paused => "paused",
            VoucherStatus::Expired => "expired",
        }
    }
}

impl FromStr for VoucherStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(VoucherStatus::Pending),
            "redeemed" => Ok(VoucherStatus::Redeemed),
            "sold" => Ok(VoucherStatus::Sold),
            "paused" => Ok(VoucherStatus::Paused),
            "expired" => Ok(VoucherStatus::Expired),
            _ => Err(ParseEnumError::new("voucher status", value)),
        }
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoucherStatus::Pending => "Pending",
            VoucherStatus::Redeemed => "Redeemed",
            VoucherStatus::Sold => "Sold",
            VoucherStatus::Paused => "Paused",
            VoucherStatus::Expired => "Expired",
        };
        f.write_str(label)
    }
}

/// Kind of benefit a voucher represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoucherCategory {
    LoungeAccess,
    OttSubscription,
    Fitness,
    Dining,
    Shopping,
    Health,
    Travel,
    Golf,
    Concierge,
    Insurance,
    Entertainment,
    #[default]
    Other,
}

impl VoucherCategory {
    pub const ALL: [VoucherCategory; 12] = [
        VoucherCategory::LoungeAccess,
        VoucherCategory::OttSubscription,
        VoucherCategory::Fitness,
        VoucherCategory::Dining,
        VoucherCategory::Shopping,
        VoucherCategory::Health,
        VoucherCategory::Travel,
        VoucherCategory::Golf,
        VoucherCategory::Concierge,
        VoucherCategory::Insurance,
        VoucherCategory::Entertainment,
        VoucherCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoucherCategory::LoungeAccess => "lounge_access",
            VoucherCategory::OttSubscription => "ott_subscription",
            VoucherCategory::Fitness => "fitness",
            VoucherCategory::Dining => "dining",
            VoucherCategory::Shopping => "shopping",
            VoucherCategory::Health => "health",
            VoucherCategory::Travel => "travel",
            VoucherCategory::Golf => "golf",
            VoucherCategory::Concierge => "concierge",
            VoucherCategory::Insurance => "insurance",
            VoucherCategory::Entertainment => "entertainment",
            VoucherCategory::Other => "other",
        }
    }
}

impl FromStr for VoucherCategory {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        VoucherCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| ParseEnumError::new("voucher category", value))
    }
}

impl fmt::Display for VoucherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoucherCategory::LoungeAccess => "Airport Lounge Access",
            VoucherCategory::OttSubscription => "OTT Subscriptions",
            VoucherCategory::Fitness => "Fitness & Wellness",
            VoucherCategory::Dining => "Dining & Restaurants",
            VoucherCategory::Shopping => "Shopping Offers",
            VoucherCategory::Health => "Health & Medical",
            VoucherCategory::Travel => "Travel Benefits",
            VoucherCategory::Golf => "Golf Privileges",
            VoucherCategory::Concierge => "Concierge Services",
            VoucherCategory::Insurance => "Insurance Coverage",
            VoucherCategory::Entertainment => "Entertainment",
            VoucherCategory::Other => "Other Benefits",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_type_round_trips_through_wire_names() {
        for cycle in CycleType::ALL {
            assert_eq!(cycle.as_str().parse::<CycleType>(), Ok(cycle));
            let json = serde_json::to_string(&cycle).unwrap();
            assert_eq!(json, format!("\"{}\"", cycle.as_str()));
        }
        assert!("weekly".parse::<CycleType>().is_err());
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        let err = "lost".parse::<VoucherStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized voucher status `lost`");
        assert_eq!("sold".parse::<VoucherStatus>(), Ok(VoucherStatus::Sold));
    }

    #[test]
    fn category_uses_snake_case_keys() {
        assert_eq!(
            "ott_subscription".parse::<VoucherCategory>(),
            Ok(VoucherCategory::OttSubscription)
        );
        assert_eq!(VoucherCategory::LoungeAccess.to_string(), "Airport Lounge Access");
    }

    #[test]
    fn new_voucher_starts_pending_in_rupees() {
        let voucher = Voucher::new(
            UserId::new(),
            Uuid::new_v4(),
            "Lounge",
            CycleType::Quarterly,
            VoucherCategory::LoungeAccess,
            1200.0,
            DEFAULT_REMINDER_DAYS,
            Utc::now(),
        );
        assert_eq!(voucher.status, VoucherStatus::Pending);
        assert_eq!(voucher.currency, "INR");
    }
}
