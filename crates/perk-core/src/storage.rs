use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use perk_domain::{
    generation_year, Card, UserId, UserProfile, Voucher, VoucherPeriod, VoucherStatus,
    VoucherWithPeriods,
};
use uuid::Uuid;

use crate::{dataset::TrackerDataset, CoreError};

/// Row-oriented persistence for cards, vouchers, periods and profiles.
///
/// Every method is scoped to `owner`: rows belonging to other users behave as
/// if they did not exist, and inserts stamp `owner` regardless of the owner
/// field carried by the row.
pub trait TrackerStore: Send + Sync {
    fn insert_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError>;
    fn list_cards(&self, owner: UserId) -> Result<Vec<Card>, CoreError>;
    fn get_card(&self, owner: UserId, card_id: Uuid) -> Result<Option<Card>, CoreError>;
    fn update_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError>;
    /// Removes the card together with its vouchers and their periods.
    fn delete_card(&self, owner: UserId, card_id: Uuid) -> Result<bool, CoreError>;

    /// Commits a voucher and all of its periods as one unit: either every row
    /// is stored or none is.
    fn insert_voucher_with_periods(
        &self,
        owner: UserId,
        voucher: &Voucher,
        periods: &[VoucherPeriod],
    ) -> Result<VoucherWithPeriods, CoreError>;
    fn list_vouchers(&self, owner: UserId) -> Result<Vec<VoucherWithPeriods>, CoreError>;
    fn get_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<Option<Voucher>, CoreError>;
    fn update_voucher_status(
        &self,
        owner: UserId,
        voucher_id: Uuid,
        status: VoucherStatus,
        now: DateTime<Utc>,
    ) -> Result<Voucher, CoreError>;
    /// Removes the voucher and its periods.
    fn delete_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<bool, CoreError>;

    fn get_period(
        &self,
        owner: UserId,
        period_id: Uuid,
    ) -> Result<Option<VoucherPeriod>, CoreError>;
    fn list_periods(
        &self,
        owner: UserId,
        voucher_id: Uuid,
    ) -> Result<Vec<VoucherPeriod>, CoreError>;
    fn update_period(
        &self,
        owner: UserId,
        period: &VoucherPeriod,
    ) -> Result<VoucherPeriod, CoreError>;

    fn get_profile(&self, owner: UserId) -> Result<Option<UserProfile>, CoreError>;
    fn upsert_profile(
        &self,
        owner: UserId,
        profile: &UserProfile,
    ) -> Result<UserProfile, CoreError>;
}

/// Detects dangling references and period sets that drifted from the generator.
pub fn dataset_warnings(dataset: &TrackerDataset) -> Vec<String> {
    let cards: HashMap<_, _> = dataset.cards.iter().map(|c| (c.id, c)).collect();
    let voucher_ids: HashSet<_> = dataset.vouchers.iter().map(|v| v.id).collect();
    let mut warnings = Vec::new();

    for voucher in &dataset.vouchers {
        match cards.get(&voucher.card_id) {
            None => warnings.push(format!(
                "voucher {} references unknown card {}",
                voucher.id, voucher.card_id
            )),
            Some(card) if card.user_id != voucher.user_id => warnings.push(format!(
                "voucher {} owner {} differs from card owner {}",
                voucher.id, voucher.user_id, card.user_id
            )),
            Some(_) => {}
        }

        let keys: Vec<&str> = dataset
            .periods
            .iter()
            .filter(|p| p.voucher_id == voucher.id)
            .map(|p| p.period.as_str())
            .collect();
        let unique: BTreeSet<&str> = keys.iter().copied().collect();
        if unique.len() != keys.len() {
            warnings.push(format!("voucher {} has duplicate period keys", voucher.id));
        }
        let expected_slots = voucher.cycle_type.slots(generation_year(voucher.created_at));
        let expected: BTreeSet<&str> = expected_slots.iter().map(|s| s.key.as_str()).collect();
        if unique != expected {
            warnings.push(format!(
                "voucher {} periods {:?} do not match {} cycle {:?}",
                voucher.id, unique, voucher.cycle_type, expected
            ));
        }
    }

    for period in &dataset.periods {
        if !voucher_ids.contains(&period.voucher_id) {
            warnings.push(format!(
                "period {} references unknown voucher {}",
                period.id, period.voucher_id
            ));
        }
    }
    warnings
}
