//! In-memory tables shared by the store implementations.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use perk_domain::{
    Card, Owned, UserId, UserProfile, Voucher, VoucherPeriod, VoucherStatus, VoucherWithPeriods,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

pub const DATASET_SCHEMA_VERSION: u32 = 1;

/// All tracker tables. Row-level ownership is enforced by every accessor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackerDataset {
    #[serde(default = "TrackerDataset::schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub vouchers: Vec<Voucher>,
    #[serde(default)]
    pub periods: Vec<VoucherPeriod>,
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
}

impl TrackerDataset {
    pub fn new() -> Self {
        Self {
            schema_version: DATASET_SCHEMA_VERSION,
            ..Self::default()
        }
    }

    fn schema_version() -> u32 {
        DATASET_SCHEMA_VERSION
    }

    // -- cards -----------------------------------------------------------

    pub fn insert_card(&mut self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        if self.cards.iter().any(|existing| existing.id == card.id) {
            return Err(CoreError::Storage(format!("card {} already exists", card.id)));
        }
        let mut row = card.clone();
        row.user_id = owner;
        self.cards.push(row.clone());
        Ok(row)
    }

    pub fn cards_for(&self, owner: UserId) -> Vec<Card> {
        let mut rows: Vec<Card> = self
            .cards
            .iter()
            .filter(|card| card.is_owned_by(owner))
            .cloned()
            .collect();
        rows.sort_by_key(|card| Reverse(card.created_at));
        rows
    }

    pub fn card(&self, owner: UserId, card_id: Uuid) -> Option<&Card> {
        self.cards
            .iter()
            .find(|card| card.id == card_id && card.is_owned_by(owner))
    }

    pub fn update_card(&mut self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        let row = self
            .cards
            .iter_mut()
            .find(|existing| existing.id == card.id && existing.is_owned_by(owner))
            .ok_or_else(|| CoreError::not_found("card", card.id))?;
        let created_at = row.created_at;
        *row = card.clone();
        row.user_id = owner;
        row.created_at = created_at;
        Ok(row.clone())
    }

    pub fn delete_card(&mut self, owner: UserId, card_id: Uuid) -> bool {
        if self.card(owner, card_id).is_none() {
            return false;
        }
        let voucher_ids: Vec<Uuid> = self
            .vouchers
            .iter()
            .filter(|voucher| voucher.card_id == card_id)
            .map(|voucher| voucher.id)
            .collect();
        self.periods
            .retain(|period| !voucher_ids.contains(&period.voucher_id));
        self.vouchers.retain(|voucher| voucher.card_id != card_id);
        self.cards.retain(|card| card.id != card_id);
        true
    }

    // -- vouchers --------------------------------------------------------

    pub fn insert_voucher_with_periods(
        &mut self,
        owner: UserId,
        voucher: &Voucher,
        periods: &[VoucherPeriod],
    ) -> Result<VoucherWithPeriods, CoreError> {
        if self.card(owner, voucher.card_id).is_none() {
            return Err(CoreError::not_found("card", voucher.card_id));
        }
        if self.vouchers.iter().any(|existing| existing.id == voucher.id) {
            return Err(CoreError::Storage(format!(
                "voucher {} already exists",
                voucher.id
            )));
        }
        if let Some(stray) = periods.iter().find(|p| p.voucher_id != voucher.id) {
            return Err(CoreError::Validation(format!(
                "period {} does not belong to voucher {}",
                stray.id, voucher.id
            )));
        }
        // Everything is checked before the first push so a rejected insert leaves no rows.
        let mut row = voucher.clone();
        row.user_id = owner;
        self.vouchers.push(row.clone());
        self.periods.extend(periods.iter().cloned());
        Ok(VoucherWithPeriods::new(row, periods.to_vec()))
    }

    pub fn vouchers_for(&self, owner: UserId) -> Vec<VoucherWithPeriods> {
        let mut rows: Vec<VoucherWithPeriods> = self
            .vouchers
            .iter()
            .filter(|voucher| voucher.is_owned_by(owner))
            .map(|voucher| VoucherWithPeriods::new(voucher.clone(), self.periods_of(voucher.id)))
            .collect();
        rows.sort_by_key(|row| Reverse(row.voucher.created_at));
        rows
    }

    pub fn voucher(&self, owner: UserId, voucher_id: Uuid) -> Option<&Voucher> {
        self.vouchers
            .iter()
            .find(|voucher| voucher.id == voucher_id && voucher.is_owned_by(owner))
    }

    pub fn update_voucher_status(
        &mut self,
        owner: UserId,
        voucher_id: Uuid,
        status: VoucherStatus,
        now: DateTime<Utc>,
    ) -> Result<Voucher, CoreError> {
        let row = self
            .vouchers
            .iter_mut()
            .find(|voucher| voucher.id == voucher_id && voucher.is_owned_by(owner))
            .ok_or_else(|| CoreError::not_found("voucher", voucher_id))?;
        row.status = status;
        row.touch(now);
        Ok(row.clone())
    }

    pub fn delete_voucher(&mut self, owner: UserId, voucher_id: Uuid) -> bool {
        if self.voucher(owner, voucher_id).is_none() {
            return false;
        }
        self.periods.retain(|period| period.voucher_id != voucher_id);
        self.vouchers.retain(|voucher| voucher.id != voucher_id);
        true
    }

    // -- periods ---------------------------------------------------------

    pub fn period(&self, owner: UserId, period_id: Uuid) -> Option<&VoucherPeriod> {
        let period = self.periods.iter().find(|period| period.id == period_id)?;
        self.voucher(owner, period.voucher_id).map(|_| period)
    }

    pub fn periods_for(&self, owner: UserId, voucher_id: Uuid) -> Vec<VoucherPeriod> {
        if self.voucher(owner, voucher_id).is_none() {
            return Vec::new();
        }
        self.periods_of(voucher_id)
    }

    pub fn update_period(
        &mut self,
        owner: UserId,
        period: &VoucherPeriod,
    ) -> Result<VoucherPeriod, CoreError> {
        let stored = self
            .period(owner, period.id)
            .ok_or_else(|| CoreError::not_found("period", period.id))?;
        if stored.voucher_id != period.voucher_id || stored.period != period.period {
            return Err(CoreError::Validation(format!(
                "period {} cannot move between vouchers or change its key",
                period.id
            )));
        }
        let row = self
            .periods
            .iter_mut()
            .find(|existing| existing.id == period.id)
            .ok_or_else(|| CoreError::not_found("period", period.id))?;
        *row = period.clone();
        Ok(row.clone())
    }

    fn periods_of(&self, voucher_id: Uuid) -> Vec<VoucherPeriod> {
        self.periods
            .iter()
            .filter(|period| period.voucher_id == voucher_id)
            .cloned()
            .collect()
    }

    // -- profiles --------------------------------------------------------

    pub fn profile(&self, owner: UserId) -> Option<&UserProfile> {
        self.profiles.iter().find(|profile| profile.is_owned_by(owner))
    }

    pub fn upsert_profile(&mut self, owner: UserId, profile: &UserProfile) -> UserProfile {
        let mut row = profile.clone();
        row.id = owner;
        match self.profiles.iter_mut().find(|p| p.is_owned_by(owner)) {
            Some(existing) => *existing = row.clone(),
            None => self.profiles.push(row.clone()),
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use perk_domain::{CardVariant, CycleType, VoucherCategory};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
    }

    fn seeded(owner: UserId) -> (TrackerDataset, Card, VoucherWithPeriods) {
        let mut dataset = TrackerDataset::new();
        let card = dataset
            .insert_card(owner, &Card::new(owner, "Axis Bank", "1111", CardVariant::Gold, now()))
            .unwrap();
        let voucher = Voucher::new(
            owner,
            card.id,
            "Gym",
            CycleType::HalfYearly,
            VoucherCategory::Fitness,
            800.0,
            7,
            now(),
        );
        let periods: Vec<_> = CycleType::HalfYearly
            .slots(2025)
            .into_iter()
            .map(|slot| VoucherPeriod::pending(voucher.id, slot, now()))
            .collect();
        let stored = dataset
            .insert_voucher_with_periods(owner, &voucher, &periods)
            .unwrap();
        (dataset, card, stored)
    }

    #[test]
    fn insert_stamps_caller_as_owner() {
        let owner = UserId::new();
        let spoofed = Card::new(UserId::new(), "SBI", "9999", CardVariant::Classic, now());
        let mut dataset = TrackerDataset::new();
        let stored = dataset.insert_card(owner, &spoofed).unwrap();
        assert_eq!(stored.user_id, owner);
        assert!(dataset.card(owner, spoofed.id).is_some());
    }

    #[test]
    fn foreign_rows_are_invisible() {
        let owner = UserId::new();
        let stranger = UserId::new();
        let (mut dataset, card, stored) = seeded(owner);
        assert!(dataset.card(stranger, card.id).is_none());
        assert!(dataset.vouchers_for(stranger).is_empty());
        assert!(dataset.period(stranger, stored.periods[0].id).is_none());
        assert!(!dataset.delete_voucher(stranger, stored.voucher.id));
        assert_eq!(dataset.vouchers.len(), 1);
    }

    #[test]
    fn voucher_insert_rejects_foreign_card_without_writing() {
        let owner = UserId::new();
        let (mut dataset, card, _) = seeded(owner);
        let stranger = UserId::new();
        let voucher = Voucher::new(
            stranger,
            card.id,
            "Steal",
            CycleType::Yearly,
            VoucherCategory::Other,
            1.0,
            7,
            now(),
        );
        let slot = CycleType::Yearly.slots(2025).remove(0);
        let period = VoucherPeriod::pending(voucher.id, slot, now());
        let err = dataset
            .insert_voucher_with_periods(stranger, &voucher, &[period])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(dataset.vouchers.len(), 1);
        assert_eq!(dataset.periods.len(), 2);
    }

    #[test]
    fn deleting_card_cascades_to_vouchers_and_periods() {
        let owner = UserId::new();
        let (mut dataset, card, _) = seeded(owner);
        assert!(dataset.delete_card(owner, card.id));
        assert!(dataset.cards.is_empty());
        assert!(dataset.vouchers.is_empty());
        assert!(dataset.periods.is_empty());
    }

    #[test]
    fn period_update_cannot_change_key() {
        let owner = UserId::new();
        let (mut dataset, _, stored) = seeded(owner);
        let mut moved = stored.periods[0].clone();
        moved.period = "h3".into();
        assert!(matches!(
            dataset.update_period(owner, &moved),
            Err(CoreError::Validation(_))
        ));
    }
}
