//! Session-scoped entry point over the tracker services.
//!
//! Every call resolves the signed-in user through the [`AuthProvider`] before
//! the store is consulted; services below receive that user explicitly.

use perk_config::Config;
use perk_core::{
    require_user, AuthProvider, CardForm, CardService, Clock, CoreError, DashboardStats,
    NewVoucher, PeriodStatusChange, ProfileService, StatsService, SystemClock, TrackerStore,
    VoucherService,
};
use perk_domain::{
    Card, PeriodUpdate, ProfileUpdate, UserId, UserProfile, VoucherPeriod, VoucherWithPeriods,
};
use perk_storage_json::{JsonTrackerStore, StoragePaths};
use tracing::info;
use uuid::Uuid;

use crate::errors::Result;

pub struct Tracker {
    store: Box<dyn TrackerStore>,
    auth: Box<dyn AuthProvider>,
    clock: Box<dyn Clock>,
    config: Config,
}

impl Tracker {
    pub fn new(
        store: Box<dyn TrackerStore>,
        auth: Box<dyn AuthProvider>,
        config: Config,
    ) -> Self {
        Self::with_clock(store, auth, Box::new(SystemClock), config)
    }

    pub fn with_clock(
        store: Box<dyn TrackerStore>,
        auth: Box<dyn AuthProvider>,
        clock: Box<dyn Clock>,
        config: Config,
    ) -> Self {
        Self {
            store,
            auth,
            clock,
            config,
        }
    }

    /// Opens the JSON store under the configured data root.
    pub fn open(config: Config, auth: Box<dyn AuthProvider>) -> Result<Self> {
        let root = config.resolve_data_root();
        let store = JsonTrackerStore::new(StoragePaths::under(root.clone()))?;
        info!(root = %root.display(), "tracker store opened");
        Ok(Self::new(Box::new(store), auth, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_user(&self) -> Result<UserId> {
        Ok(require_user(self.auth.as_ref())?)
    }

    pub fn add_card(&self, form: CardForm) -> Result<Card> {
        let owner = self.current_user()?;
        Ok(CardService::create(self.store.as_ref(), self.clock.as_ref(), owner, form)?)
    }

    pub fn update_card(&self, card_id: Uuid, form: CardForm) -> Result<Card> {
        let owner = self.current_user()?;
        Ok(CardService::update(
            self.store.as_ref(),
            self.clock.as_ref(),
            owner,
            card_id,
            form,
        )?)
    }

    pub fn delete_card(&self, card_id: Uuid) -> Result<()> {
        let owner = self.current_user()?;
        Ok(CardService::delete(self.store.as_ref(), owner, card_id)?)
    }

    pub fn cards(&self) -> Result<Vec<Card>> {
        let owner = self.current_user()?;
        Ok(CardService::list(self.store.as_ref(), owner)?)
    }

    /// Creates a voucher; a missing reminder falls back to the configured default.
    pub fn create_voucher(&self, mut input: NewVoucher) -> Result<VoucherWithPeriods> {
        let owner = self.current_user()?;
        input
            .reminder_days
            .get_or_insert(self.config.default_reminder_days);
        Ok(VoucherService::create(
            self.store.as_ref(),
            self.clock.as_ref(),
            owner,
            input,
        )?)
    }

    pub fn update_period_status(
        &self,
        period_id: Uuid,
        update: PeriodUpdate,
    ) -> Result<PeriodStatusChange> {
        let owner = self.current_user()?;
        Ok(VoucherService::update_period_status(
            self.store.as_ref(),
            self.clock.as_ref(),
            owner,
            period_id,
            update,
        )?)
    }

    /// Same as [`Tracker::update_period_status`] for raw form values.
    pub fn set_period_status(
        &self,
        period_id: Uuid,
        status: &str,
        sold_to: Option<String>,
        sold_amount: Option<f64>,
        notes: Option<String>,
    ) -> Result<PeriodStatusChange> {
        let owner = self.current_user()?;
        let update = VoucherService::parse_update(status, sold_to, sold_amount, notes)?;
        Ok(VoucherService::update_period_status(
            self.store.as_ref(),
            self.clock.as_ref(),
            owner,
            period_id,
            update,
        )?)
    }

    pub fn delete_voucher(&self, voucher_id: Uuid) -> Result<()> {
        let owner = self.current_user()?;
        Ok(VoucherService::delete(self.store.as_ref(), owner, voucher_id)?)
    }

    pub fn vouchers(&self) -> Result<Vec<VoucherWithPeriods>> {
        let owner = self.current_user()?;
        Ok(VoucherService::list(self.store.as_ref(), owner)?)
    }

    /// Periods of one voucher; a voucher the user does not own is not found.
    pub fn periods(&self, voucher_id: Uuid) -> Result<Vec<VoucherPeriod>> {
        let owner = self.current_user()?;
        if self.store.get_voucher(owner, voucher_id)?.is_none() {
            return Err(CoreError::not_found("voucher", voucher_id).into());
        }
        Ok(self.store.list_periods(owner, voucher_id)?)
    }

    pub fn search(&self, query: &str) -> Result<Vec<VoucherWithPeriods>> {
        let owner = self.current_user()?;
        let vouchers = VoucherService::list(self.store.as_ref(), owner)?;
        let cards = CardService::list(self.store.as_ref(), owner)?;
        Ok(VoucherService::search(&vouchers, &cards, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Dashboard totals. Expirations are counted against today's date and
    /// stay at zero while reminders are disabled.
    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let owner = self.current_user()?;
        let cards = CardService::list(self.store.as_ref(), owner)?;
        let vouchers = VoucherService::list(self.store.as_ref(), owner)?;
        let mut stats = StatsService::summarize(&cards, &vouchers);
        if self.config.reminders_enabled {
            stats.upcoming_expirations =
                StatsService::upcoming_expirations(&vouchers, self.clock.today());
        }
        Ok(stats)
    }

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        let owner = self.current_user()?;
        Ok(ProfileService::get(self.store.as_ref(), owner)?)
    }

    pub fn save_profile(&self, email: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let owner = self.current_user()?;
        Ok(ProfileService::upsert(
            self.store.as_ref(),
            self.clock.as_ref(),
            owner,
            email,
            update,
        )?)
    }
}
