#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::{DateTime, TimeZone, Utc};
use perk_core::CoreError;
use perk_tracker::{
    Card, FixedClock, MemoryTrackerStore, TrackerStore, UserId, UserProfile, Voucher,
    VoucherPeriod, VoucherStatus, VoucherWithPeriods,
};
use uuid::Uuid;

pub fn at(year: i32, month: u32, day: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap())
}

/// Memory store that counts every call, shared through an `Arc` counter.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryTrackerStore,
    pub calls: Arc<AtomicUsize>,
}

impl CountingStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl TrackerStore for CountingStore {
    fn insert_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        self.hit();
        self.inner.insert_card(owner, card)
    }

    fn list_cards(&self, owner: UserId) -> Result<Vec<Card>, CoreError> {
        self.hit();
        self.inner.list_cards(owner)
    }

    fn get_card(&self, owner: UserId, card_id: Uuid) -> Result<Option<Card>, CoreError> {
        self.hit();
        self.inner.get_card(owner, card_id)
    }

    fn update_card(&self, owner: UserId, card: &Card) -> Result<Card, CoreError> {
        self.hit();
        self.inner.update_card(owner, card)
    }

    fn delete_card(&self, owner: UserId, card_id: Uuid) -> Result<bool, CoreError> {
        self.hit();
        self.inner.delete_card(owner, card_id)
    }

    fn insert_voucher_with_periods(
        &self,
        owner: UserId,
        voucher: &Voucher,
        periods: &[VoucherPeriod],
    ) -> Result<VoucherWithPeriods, CoreError> {
        self.hit();
        self.inner.insert_voucher_with_periods(owner, voucher, periods)
    }

    fn list_vouchers(&self, owner: UserId) -> Result<Vec<VoucherWithPeriods>, CoreError> {
        self.hit();
        self.inner.list_vouchers(owner)
    }

    fn get_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<Option<Voucher>, CoreError> {
        self.hit();
        self.inner.get_voucher(owner, voucher_id)
    }

    fn update_voucher_status(
        &self,
        owner: UserId,
        voucher_id: Uuid,
        status: VoucherStatus,
        now: DateTime<Utc>,
    ) -> Result<Voucher, CoreError> {
        self.hit();
        self.inner.update_voucher_status(owner, voucher_id, status, now)
    }

    fn delete_voucher(&self, owner: UserId, voucher_id: Uuid) -> Result<bool, CoreError> {
        self.hit();
        self.inner.delete_voucher(owner, voucher_id)
    }

    fn get_period(
        &self,
        owner: UserId,
        period_id: Uuid,
    ) -> Result<Option<VoucherPeriod>, CoreError> {
        self.hit();
        self.inner.get_period(owner, period_id)
    }

    fn list_periods(
        &self,
        owner: UserId,
        voucher_id: Uuid,
    ) -> Result<Vec<VoucherPeriod>, CoreError> {
        self.hit();
        self.inner.list_periods(owner, voucher_id)
    }

    fn update_period(
        &self,
        owner: UserId,
        period: &VoucherPeriod,
    ) -> Result<VoucherPeriod, CoreError> {
        self.hit();
        self.inner.update_period(owner, period)
    }

    fn get_profile(&self, owner: UserId) -> Result<Option<UserProfile>, CoreError> {
        self.hit();
        self.inner.get_profile(owner)
    }

    fn upsert_profile(
        &self,
        owner: UserId,
        profile: &UserProfile,
    ) -> Result<UserProfile, CoreError> {
        self.hit();
        self.inner.upsert_profile(owner, profile)
    }
}
