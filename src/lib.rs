#![doc(test(attr(deny(warnings))))]

//! Perk Tracker keeps track of recurring credit card benefits: the cards a
//! user holds, the vouchers each card grants and the status of every
//! redemption period.

pub mod errors;
pub mod tracker;
pub mod utils;

pub use errors::{Result, TrackerError};
pub use perk_config::{Config, ConfigManager};
pub use perk_core::{
    AuthProvider, CardForm, Clock, DashboardStats, FixedClock, MemoryTrackerStore, NewVoucher,
    PeriodStatusChange, StaticAuth, SystemClock, TrackerStore,
};
pub use perk_domain::{
    Card, CardVariant, CycleType, PeriodTransition, PeriodUpdate, ProfileUpdate, UserId,
    UserProfile, Voucher, VoucherCategory, VoucherPeriod, VoucherStatus, VoucherWithPeriods,
};
pub use perk_storage_json::{JsonTrackerStore, StoragePaths};
pub use tracker::Tracker;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    init_with(&Config::default());
}

/// Like [`init`], additionally applying `config.log_filter`.
pub fn init_with(config: &Config) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(config.log_filter.as_deref());
        tracing::info!("Perk Tracker tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
