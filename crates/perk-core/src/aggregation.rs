//! Voucher-level status synchronisation from period statuses.
//!
//! A voucher only follows its periods when all of them agree. Mixed period
//! sets leave the voucher at its last synchronised status; no "partially
//! redeemed" state exists.

use perk_domain::VoucherStatus;

/// Returns the status shared by every entry, or `None` for empty or mixed input.
pub fn aggregate_status<I>(statuses: I) -> Option<VoucherStatus>
where
    I: IntoIterator<Item = VoucherStatus>,
{
    let mut iter = statuses.into_iter();
    let first = iter.next()?;
    iter.all(|status| status == first).then_some(first)
}

/// Applies [`aggregate_status`] on top of the voucher's `current` status.
pub fn resolve_voucher_status<I>(current: VoucherStatus, statuses: I) -> VoucherStatus
where
    I: IntoIterator<Item = VoucherStatus>,
{
    aggregate_status(statuses).unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoucherStatus::*;

    #[test]
    fn uniform_periods_set_voucher_status() {
        assert_eq!(aggregate_status([Redeemed, Redeemed, Redeemed]), Some(Redeemed));
        assert_eq!(aggregate_status([Expired]), Some(Expired));
    }

    #[test]
    fn mixed_periods_leave_status_unchanged() {
        assert_eq!(aggregate_status([Redeemed, Sold]), None);
        assert_eq!(resolve_voucher_status(Pending, [Redeemed, Sold]), Pending);
        assert_eq!(resolve_voucher_status(Paused, [Redeemed, Pending]), Paused);
    }

    #[test]
    fn empty_period_list_is_a_no_op() {
        assert_eq!(aggregate_status(Vec::<VoucherStatus>::new()), None);
        assert_eq!(resolve_voucher_status(Sold, Vec::<VoucherStatus>::new()), Sold);
    }
}
