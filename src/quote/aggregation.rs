//! Combine per-person premiums into person and grand totals

use super::{HospitalCashAllocator, PremiumLedger, QuoteSummary, WaiverPremium};
use crate::error::CalcError;
use crate::money::saturating_sum;

/// Fold the waiver into the ledger and total the pass
///
/// A waiver on a listed person is added to that person's total; a waiver on
/// an outside assignee only appears in the grand total.
pub fn aggregate(
    mut ledger: PremiumLedger,
    waiver: Option<&WaiverPremium>,
    allocator: &HospitalCashAllocator,
) -> Result<(PremiumLedger, QuoteSummary), CalcError> {
    allocator.check()?;

    for result in ledger.iter_mut() {
        result.waiver = match waiver {
            Some(w) if w.person_id.as_deref() == Some(result.person_id.as_str()) => w.premium,
            _ => 0,
        };
        result.total = result.computed_total();
    }

    let outside_waiver = match waiver {
        Some(w) if w.person_id.is_none() => w.premium,
        _ => 0,
    };

    let base_main = saturating_sum(ledger.iter().map(|r| r.main_base));
    let extra = saturating_sum(ledger.iter().map(|r| r.extra));
    let riders = saturating_sum(ledger.iter().map(|r| r.riders_total()));
    let waiver_premium = waiver.map(|w| w.premium).unwrap_or(0);
    let total = saturating_sum(ledger.iter().map(|r| r.total)).saturating_add(outside_waiver);

    let summary = QuoteSummary {
        base_main,
        extra,
        total_riders: riders.saturating_add(waiver_premium),
        total,
    };
    Ok((ledger, summary))
}
