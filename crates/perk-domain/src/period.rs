//! Voucher periods, the period generator, and typed status transitions.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::*,
    voucher::{CycleType, VoucherStatus},
};

const MONTH_KEYS: [(&str, &str); 12] = [
    ("jan", "Jan"),
    ("feb", "Feb"),
    ("mar", "Mar"),
    ("apr", "Apr"),
    ("may", "May"),
    ("jun", "Jun"),
    ("jul", "Jul"),
    ("aug", "Aug"),
    ("sep", "Sep"),
    ("oct", "Oct"),
    ("nov", "Nov"),
    ("dec", "Dec"),
];

const YEARLY_KEY: &str = "yearly";

/// One generated period: a key unique within its voucher plus a display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodSlot {
    pub key: String,
    pub label: String,
}

impl PeriodSlot {
    fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

impl CycleType {
    /// Ordered period slots covering the calendar `year`.
    pub fn slots(self, year: i32) -> Vec<PeriodSlot> {
        match self {
            CycleType::Monthly => MONTH_KEYS
                .iter()
                .map(|(key, short)| PeriodSlot::new(*key, format!("{short} {year}")))
                .collect(),
            CycleType::Quarterly => (1..=4)
                .map(|n| PeriodSlot::new(format!("q{n}"), format!("Q{n} {year}")))
                .collect(),
            CycleType::HalfYearly => (1..=2)
                .map(|n| PeriodSlot::new(format!("h{n}"), format!("H{n} {year}")))
                .collect(),
            CycleType::Yearly => vec![PeriodSlot::new(YEARLY_KEY, year.to_string())],
        }
    }
}

/// Generates period slots from a raw cycle name.
///
/// Unknown names produce an empty list rather than an error; callers that need
/// strict validation parse a [`CycleType`] first.
pub fn generate_periods(cycle_type: &str, year: i32) -> Vec<PeriodSlot> {
    cycle_type
        .parse::<CycleType>()
        .map(|cycle| cycle.slots(year))
        .unwrap_or_default()
}

/// First and last calendar day (inclusive) covered by `key` in `year`.
pub fn period_window(key: &str, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let (first_month, months) = if key == YEARLY_KEY {
        (1, 12)
    } else if let Some(index) = MONTH_KEYS.iter().position(|(k, _)| *k == key) {
        (index as u32 + 1, 1)
    } else if let Some(n) = numbered(key, 'q', 4) {
        ((n - 1) * 3 + 1, 3)
    } else if let Some(n) = numbered(key, 'h', 2) {
        ((n - 1) * 6 + 1, 6)
    } else {
        return None;
    };
    let start = NaiveDate::from_ymd_opt(year, first_month, 1)?;
    let after_month = first_month + months;
    let next_start = if after_month > 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, after_month, 1)?
    };
    Some((start, next_start - Duration::days(1)))
}

fn numbered(key: &str, prefix: char, max: u32) -> Option<u32> {
    let n: u32 = key.strip_prefix(prefix)?.parse().ok()?;
    (1..=max).contains(&n).then_some(n)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherPeriod {
    pub id: Uuid,
    pub voucher_id: Uuid,
    /// Period key such as `q1`, `jan` or `yearly`.
    pub period: String,
    pub label: String,
    pub status: VoucherStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VoucherPeriod {
    /// Builds a fresh `pending` period for `voucher_id` from a generated slot.
    pub fn pending(voucher_id: Uuid, slot: PeriodSlot, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            voucher_id,
            period: slot.key,
            label: slot.label,
            status: VoucherStatus::Pending,
            redeemed_at: None,
            sold_at: None,
            sold_to: None,
            sold_amount: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status update, stamping only the fields its transition owns.
    pub fn apply(&mut self, update: &PeriodUpdate, now: DateTime<Utc>) {
        match &update.transition {
            PeriodTransition::Redeemed => {
                self.redeemed_at = Some(now);
            }
            PeriodTransition::Sold {
                sold_to,
                sold_amount,
            } => {
                self.sold_at = Some(now);
                self.sold_to = non_blank(sold_to.clone());
                self.sold_amount = *sold_amount;
            }
            PeriodTransition::Pending | PeriodTransition::Paused | PeriodTransition::Expired => {}
        }
        if let Some(notes) = non_blank(update.notes.clone()) {
            self.notes = Some(notes);
        }
        self.status = update.transition.status();
        self.updated_at = now;
    }

    /// Calendar window of this period, given the year its voucher was created in.
    pub fn window(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        period_window(&self.period, year)
    }
}

impl Identifiable for VoucherPeriod {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for VoucherPeriod {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.label, self.status)
    }
}

/// Target state of a period update. Sale details only exist on `Sold`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PeriodTransition {
    Pending,
    Redeemed,
    Sold {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sold_to: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sold_amount: Option<f64>,
    },
    Paused,
    Expired,
}

impl PeriodTransition {
    pub fn status(&self) -> VoucherStatus {
        match self {
            PeriodTransition::Pending => VoucherStatus::Pending,
            PeriodTransition::Redeemed => VoucherStatus::Redeemed,
            PeriodTransition::Sold { .. } => VoucherStatus::Sold,
            PeriodTransition::Paused => VoucherStatus::Paused,
            PeriodTransition::Expired => VoucherStatus::Expired,
        }
    }

    /// Transition carrying no sale details for `status`.
    pub fn bare(status: VoucherStatus) -> Self {
        match status {
            VoucherStatus::Pending => PeriodTransition::Pending,
            VoucherStatus::Redeemed => PeriodTransition::Redeemed,
            VoucherStatus::Sold => PeriodTransition::Sold {
                sold_to: None,
                sold_amount: None,
            },
            VoucherStatus::Paused => PeriodTransition::Paused,
            VoucherStatus::Expired => PeriodTransition::Expired,
        }
    }
}

/// A transition plus optional notes that overwrite the period's notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodUpdate {
    #[serde(flatten)]
    pub transition: PeriodTransition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PeriodUpdate {
    pub fn new(transition: PeriodTransition) -> Self {
        Self {
            transition,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl From<PeriodTransition> for PeriodUpdate {
    fn from(transition: PeriodTransition) -> Self {
        Self::new(transition)
    }
}

/// Year a voucher's periods were generated for.
pub fn generation_year(created_at: DateTime<Utc>) -> i32 {
    created_at.year()
}
