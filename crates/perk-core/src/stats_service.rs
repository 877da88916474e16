//! Dashboard statistics folded from a user's cards and vouchers.

use chrono::NaiveDate;
use perk_domain::{generation_year, Card, VoucherStatus, VoucherWithPeriods};
use serde::{Deserialize, Serialize};

/// Voucher count per aggregate status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub redeemed: usize,
    pub sold: usize,
    pub paused: usize,
    pub expired: usize,
}

impl StatusCounts {
    pub fn get(&self, status: VoucherStatus) -> usize {
        match status {
            VoucherStatus::Pending => self.pending,
            VoucherStatus::Redeemed => self.redeemed,
            VoucherStatus::Sold => self.sold,
            VoucherStatus::Paused => self.paused,
            VoucherStatus::Expired => self.expired,
        }
    }

    fn increment(&mut self, status: VoucherStatus) {
        let slot = match status {
            VoucherStatus::Pending => &mut self.pending,
            VoucherStatus::Redeemed => &mut self.redeemed,
            VoucherStatus::Sold => &mut self.sold,
            VoucherStatus::Paused => &mut self.paused,
            VoucherStatus::Expired => &mut self.expired,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        VoucherStatus::ALL.iter().map(|status| self.get(*status)).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_cards: usize,
    pub active_cards: usize,
    pub total_vouchers: usize,
    pub vouchers_by_status: StatusCounts,
    /// Periods currently in `redeemed`.
    pub total_redeemed: usize,
    /// Periods currently in `sold`.
    pub total_sold: usize,
    pub estimated_value_redeemed: f64,
    pub estimated_value_sold: f64,
    pub upcoming_expirations: usize,
}

pub struct StatsService;

impl StatsService {
    /// Folds cards and vouchers into dashboard totals.
    ///
    /// Values accumulate per period: a voucher with three redeemed periods
    /// contributes its value three times. Sold periods count their sale amount,
    /// falling back to the voucher value when no positive amount was recorded.
    pub fn summarize(cards: &[Card], vouchers: &[VoucherWithPeriods]) -> DashboardStats {
        let mut stats = DashboardStats {
            total_cards: cards.len(),
            active_cards: cards.iter().filter(|card| card.is_active).count(),
            total_vouchers: vouchers.len(),
            ..DashboardStats::default()
        };

        for entry in vouchers {
            let voucher = &entry.voucher;
            stats.vouchers_by_status.increment(voucher.status);
            for period in &entry.periods {
                match period.status {
                    VoucherStatus::Redeemed => {
                        stats.total_redeemed += 1;
                        stats.estimated_value_redeemed += voucher.value;
                    }
                    VoucherStatus::Sold => {
                        stats.total_sold += 1;
                        stats.estimated_value_sold += period
                            .sold_amount
                            .filter(|amount| *amount > 0.0)
                            .unwrap_or(voucher.value);
                    }
                    VoucherStatus::Pending | VoucherStatus::Paused | VoucherStatus::Expired => {}
                }
            }
        }
        stats
    }

    /// Counts pending periods that end within their voucher's reminder window of `today`.
    pub fn upcoming_expirations(vouchers: &[VoucherWithPeriods], today: NaiveDate) -> usize {
        vouchers
            .iter()
            .map(|entry| {
                let year = generation_year(entry.voucher.created_at);
                let lead = i64::from(entry.voucher.reminder_days);
                entry
                    .periods
                    .iter()
                    .filter(|period| period.status == VoucherStatus::Pending)
                    .filter_map(|period| period.window(year))
                    .filter(|(_, end)| {
                        let remaining = (*end - today).num_days();
                        (0..=lead).contains(&remaining)
                    })
                    .count()
            })
            .sum()
    }
}
