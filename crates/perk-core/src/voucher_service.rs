//! Voucher creation, period status transitions and removal.

use perk_domain::{
    non_blank, Card, CycleType, PeriodTransition, PeriodUpdate, UserId, Voucher, VoucherCategory,
    VoucherPeriod, VoucherStatus, VoucherWithPeriods, DEFAULT_REMINDER_DAYS,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{aggregation::resolve_voucher_status, storage::TrackerStore, time::Clock, CoreError};

/// Longest reminder lead time accepted for vouchers and profiles.
pub const MAX_REMINDER_DAYS: u32 = 365;

/// Voucher creation input as submitted by a user.
#[derive(Debug, Clone, Default)]
pub struct NewVoucher {
    pub card_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// One of `monthly`, `quarterly`, `half-yearly`, `yearly`.
    pub cycle_type: String,
    /// Category key such as `lounge_access`.
    pub category: String,
    pub value: f64,
    pub reminder_days: Option<u32>,
    pub notes: Option<String>,
}

/// Result of a period transition and the voucher synchronisation that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStatusChange {
    pub period: VoucherPeriod,
    pub voucher_status: VoucherStatus,
    /// `true` when the voucher's status was rewritten by this change.
    pub voucher_synced: bool,
}

pub struct VoucherService;

impl VoucherService {
    /// Creates a voucher and its generated periods in a single store commit.
    pub fn create(
        store: &dyn TrackerStore,
        clock: &dyn Clock,
        owner: UserId,
        input: NewVoucher,
    ) -> Result<VoucherWithPeriods, CoreError> {
        let (cycle_type, category) = Self::validate(&input)?;
        if store.get_card(owner, input.card_id)?.is_none() {
            return Err(CoreError::not_found("card", input.card_id));
        }

        let now = clock.now();
        let mut voucher = Voucher::new(
            owner,
            input.card_id,
            input.name.trim(),
            cycle_type,
            category,
            input.value,
            input.reminder_days.unwrap_or(DEFAULT_REMINDER_DAYS),
            now,
        );
        voucher.description = non_blank(input.description);
        voucher.notes = non_blank(input.notes);
        let periods: Vec<VoucherPeriod> = cycle_type
            .slots(clock.current_year())
            .into_iter()
            .map(|slot| VoucherPeriod::pending(voucher.id, slot, now))
            .collect();

        let created = store.insert_voucher_with_periods(owner, &voucher, &periods)?;
        info!(
            voucher = %created.voucher.id,
            cycle = cycle_type.as_str(),
            periods = created.periods.len(),
            "voucher created"
        );
        Ok(created)
    }

    /// Moves one period to a new status, then re-synchronises its voucher.
    pub fn update_period_status(
        store: &dyn TrackerStore,
        clock: &dyn Clock,
        owner: UserId,
        period_id: Uuid,
        update: PeriodUpdate,
    ) -> Result<PeriodStatusChange, CoreError> {
        Self::validate_update(&update)?;
        let mut period = store
            .get_period(owner, period_id)?
            .ok_or_else(|| CoreError::not_found("period", period_id))?;
        period.apply(&update, clock.now());
        let period = store.update_period(owner, &period)?;
        debug!(period = %period.id, status = period.status.as_str(), "period updated");

        let (voucher_status, voucher_synced) =
            Self::sync_voucher_status(store, clock, owner, period.voucher_id)?;
        Ok(PeriodStatusChange {
            period,
            voucher_status,
            voucher_synced,
        })
    }

    /// Re-reads every period of the voucher and adopts their status when they all agree.
    ///
    /// Returns the voucher's resulting status and whether it was rewritten.
    pub fn sync_voucher_status(
        store: &dyn TrackerStore,
        clock: &dyn Clock,
        owner: UserId,
        voucher_id: Uuid,
    ) -> Result<(VoucherStatus, bool), CoreError> {
        let voucher = store
            .get_voucher(owner, voucher_id)?
            .ok_or_else(|| CoreError::not_found("voucher", voucher_id))?;
        let periods = store.list_periods(owner, voucher_id)?;
        let next =
            resolve_voucher_status(voucher.status, periods.iter().map(|period| period.status));
        if next == voucher.status {
            debug!(voucher = %voucher_id, status = next.as_str(), "voucher status unchanged");
            return Ok((next, false));
        }
        store.update_voucher_status(owner, voucher_id, next, clock.now())?;
        info!(voucher = %voucher_id, status = next.as_str(), "voucher status synchronised");
        Ok((next, true))
    }

    /// Builds a [`PeriodUpdate`] from loosely typed form values.
    ///
    /// Sale details are only accepted together with the `sold` status.
    pub fn parse_update(
        status: &str,
        sold_to: Option<String>,
        sold_amount: Option<f64>,
        notes: Option<String>,
    ) -> Result<PeriodUpdate, CoreError> {
        let status: VoucherStatus = status.trim().parse()?;
        let transition = match status {
            VoucherStatus::Sold => PeriodTransition::Sold {
                sold_to,
                sold_amount,
            },
            other => {
                if sold_to.is_some() || sold_amount.is_some() {
                    return Err(CoreError::Validation(format!(
                        "sale details are only valid for sold periods, not `{}`",
                        other.as_str()
                    )));
                }
                PeriodTransition::bare(other)
            }
        };
        Ok(PeriodUpdate { transition, notes })
    }

    pub fn delete(
        store: &dyn TrackerStore,
        owner: UserId,
        voucher_id: Uuid,
    ) -> Result<(), CoreError> {
        if !store.delete_voucher(owner, voucher_id)? {
            return Err(CoreError::not_found("voucher", voucher_id));
        }
        info!(voucher = %voucher_id, "voucher deleted");
        Ok(())
    }

    /// Vouchers with their periods, newest first.
    pub fn list(
        store: &dyn TrackerStore,
        owner: UserId,
    ) -> Result<Vec<VoucherWithPeriods>, CoreError> {
        store.list_vouchers(owner)
    }

    /// Case-insensitive match on the voucher name or the owning card's bank.
    pub fn search<'a>(
        vouchers: &'a [VoucherWithPeriods],
        cards: &[Card],
        query: &str,
    ) -> Vec<&'a VoucherWithPeriods> {
        let needle = query.trim().to_lowercase();
        vouchers
            .iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry.voucher.name.to_lowercase().contains(&needle)
                    || cards
                        .iter()
                        .find(|card| card.id == entry.voucher.card_id)
                        .is_some_and(|card| card.bank.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn validate(input: &NewVoucher) -> Result<(CycleType, VoucherCategory), CoreError> {
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation("voucher name is required".into()));
        }
        let cycle_type: CycleType = input.cycle_type.trim().parse()?;
        let category: VoucherCategory = input.category.trim().parse()?;
        if !input.value.is_finite() || input.value < 0.0 {
            return Err(CoreError::Validation(format!(
                "voucher value must be a non-negative number, got {}",
                input.value
            )));
        }
        if let Some(days) = input.reminder_days {
            if days > MAX_REMINDER_DAYS {
                return Err(CoreError::Validation(format!(
                    "reminder days must be at most {MAX_REMINDER_DAYS}, got {days}"
                )));
            }
        }
        Ok((cycle_type, category))
    }

    fn validate_update(update: &PeriodUpdate) -> Result<(), CoreError> {
        if let PeriodTransition::Sold {
            sold_amount: Some(amount),
            ..
        } = update.transition
        {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CoreError::Validation(format!(
                    "sale amount must be a non-negative number, got {amount}"
                )));
            }
        }
        Ok(())
    }
}
