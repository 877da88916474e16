//! Process-local [`TrackerStore`] backed by a [`TrackerDataset`].

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use perk_domain::{
    Card, UserId, UserProfile, Voucher, VoucherPeriod, VoucherStatus, VoucherWithPeriods,
};
use uuid::Uuid;

use crate::{dataset::TrackerDataset, storage::TrackerStore, CoreError};

#[derive(Debug, Default)]
pub struct MemoryTrackerStore {
    inner: RwLock<TrackerDataset>,
}

impl MemoryTrackerStore {
    pub fn new() -> Self {
        Self::with_dataset(TrackerDataset::new())
    }

    pub fn with_dataset(dataset: TrackerDataset) -> Self {
        Self {
            inner: RwLock::new(dataset),
        }
    }

    /// Copy of every table, regardless of owner.
    pub fn snapshot(&self) -> Result<TrackerDataset, CoreError> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TrackerDataset>, CoreError> {
        self.inner
            .read()
            .map_err(|_| CoreError::Storage("tracker store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TrackerDataset>, CoreError> {
        self.inner
            .write()
            .map_err(|_| CoreError::Storage("tracker store lock poisoned".into()))
    }
}

impl TrackerStore for MemoryTrackerStore {
    fn insert_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        self.write()?.insert_card(owner, card)
    }

    fn list_cards(&self, owner: UserId) -> Result<Vec<Card>, CoreError> {
        Ok(self.read()?.cards_for(owner))
    }

    fn get_card(&self, owner: UserId, card_id: Uuid) -> Result<Option<Card>, CoreError> {
        Ok(self.read()?.card(owner, card_id).cloned())
    }

    fn update_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        self.write()?.update_card(owner, card)
    }

    fn delete_card(&self, owner: UserId, card_id: Uuid) -> Result<bool, CoreError> {
        Ok(self.write()?.delete_card(owner, card_id))
    }

    fn insert_voucher_with_periods(
        &self,
        owner: UserId,
        voucher: &Voucher,
        periods: &[VoucherPeriod],
    ) -> Result<VoucherWithPeriods, CoreError> {
        self.write()?.insert_voucher_with_periods(owner, voucher, periods)
    }

    fn list_vouchers(&self, owner: UserId) -> Result<Vec<VoucherWithPeriods>, CoreError> {
        Ok(self.read()?.vouchers_for(owner))
    }

    fn get_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<Option<Voucher>, CoreError> {
        Ok(self.read()?.voucher(owner, voucher_id).cloned())
    }

    fn update_voucher_status(
        &self,
        owner: UserId,
        voucher_id: Uuid,
        status: VoucherStatus,
        now: DateTime<Utc>,
    ) -> Result<Voucher, CoreError> {
        self.write()?.update_voucher_status(owner, voucher_id, status, now)
    }

    fn delete_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<bool, CoreError> {
        Ok(self.write()?.delete_voucher(owner, voucher_id))
    }

    fn get_period(
        &self,
        owner: UserId,
        period_id: Uuid,
    ) -> Result<Option<VoucherPeriod>, CoreError> {
        Ok(self.read()?.period(owner, period_id).cloned())
    }

    fn list_periods(
        &self,
        owner: UserId,
        voucher_id: Uuid,
    ) -> Result<Vec<VoucherPeriod>, CoreError> {
        Ok(self.read()?.periods_for(owner, voucher_id))
    }

    fn update_period(
        &self,
        owner: UserId,
        period: &VoucherPeriod,
    ) -> Result<VoucherPeriod, CoreError> {
        self.write()?.update_period(owner, period)
    }

    fn get_profile(&self, owner: UserId) -> Result<Option<UserProfile>, CoreError> {
        Ok(self.read()?.profile(owner).cloned())
    }

    fn upsert_profile(
        &self,
        owner: UserId,
        profile: &UserProfile,
    ) -> Result<UserProfile, CoreError> {
        Ok(self.write()?.upsert_profile(owner, profile))
    }
}
