//! Spread annual totals over the payment frequency

use serde::{Deserialize, Serialize};

use crate::assumptions::FrequencyLoading;
use crate::money::{ceil_thousand, floor_thousand, round_thousand, Amount};
use crate::policy::PaymentFrequency;

/// Installment breakdown for one frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBreakdown {
    pub frequency: PaymentFrequency,
    pub periods: u32,

    /// Main + extra premium per installment, each floored separately
    pub main_per_period: Amount,
    /// Loaded rider premium per installment
    pub riders_per_period: Amount,
    pub per_period: Amount,

    /// `per_period * periods`
    pub annual_equivalent: Amount,
    /// Annual total before proration
    pub annual_total: Amount,

    /// `annual_equivalent - annual_total`
    pub variance: i64,
    /// Variance attributable to the rider loading
    pub rider_variance: i64,
}

/// Prorate annual amounts into installments
///
/// Main and extra premium are split evenly and floored to 1,000 each. Rider
/// premium is loaded first, then split and rounded to the nearest 1,000, but
/// never below the unloaded share raised to 1,000, so installments always
/// collect at least the annual rider premium.
pub fn prorate(
    annual_main: Amount,
    annual_extra: Amount,
    annual_riders: Amount,
    frequency: PaymentFrequency,
    loading: &FrequencyLoading,
) -> FrequencyBreakdown {
    let periods = frequency.periods();
    let annual_total = annual_main
        .saturating_add(annual_extra)
        .saturating_add(annual_riders);

    if frequency == PaymentFrequency::Annual {
        return FrequencyBreakdown {
            frequency,
            periods,
            main_per_period: annual_main.saturating_add(annual_extra),
            riders_per_period: annual_riders,
            per_period: annual_total,
            annual_equivalent: annual_total,
            annual_total,
            variance: 0,
            rider_variance: 0,
        };
    }

    let n = periods as f64;
    let main_per_period =
        floor_thousand(annual_main as f64 / n).saturating_add(floor_thousand(annual_extra as f64 / n));
    let loaded = round_thousand(annual_riders as f64 * loading.factor(frequency) / n);
    let riders_per_period = loaded.max(ceil_thousand(annual_riders as f64 / n));
    let per_period = main_per_period.saturating_add(riders_per_period);
    let annual_equivalent = per_period.saturating_mul(periods as Amount);

    FrequencyBreakdown {
        frequency,
        periods,
        main_per_period,
        riders_per_period,
        per_period,
        annual_equivalent,
        annual_total,
        variance: signed_difference(annual_equivalent, annual_total),
        rider_variance: signed_difference(
            riders_per_period.saturating_mul(periods as Amount),
            annual_riders,
        ),
    }
}

fn signed_difference(a: Amount, b: Amount) -> i64 {
    if a >= b {
        i64::try_from(a - b).unwrap_or(i64::MAX)
    } else {
        i64::try_from(b - a).map_or(i64::MIN, |d| -d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annual_pass_through() {
        let b = prorate(2_000_000, 300_000, 450_000, PaymentFrequency::Annual, &FrequencyLoading::default());
        assert_eq!(b.per_period, 2_750_000);
        assert_eq!(b.annual_equivalent, 2_750_000);
        assert_eq!(b.variance, 0);
    }

    #[test]
    fn test_quarterly_example() {
        let b = prorate(2_000_000, 0, 450_000, PaymentFrequency::Quarterly, &FrequencyLoading::default());
        assert_eq!(b.main_per_period, 500_000);
        assert_eq!(b.riders_per_period, 117_000);
        assert_eq!(b.rider_variance, 18_000);
        assert_eq!(b.per_period, 617_000);
        assert_eq!(b.annual_equivalent, 2_468_000);
        assert_eq!(b.variance, 18_000);
    }

    #[test]
    fn test_semi_annual() {
        let b = prorate(2_001_000, 0, 1_000_000, PaymentFrequency::SemiAnnual, &FrequencyLoading::default());
        // 1,000,500 floors to 1,000,000
        assert_eq!(b.main_per_period, 1_000_000);
        assert_eq!(b.riders_per_period, 510_000);
        assert_eq!(b.annual_equivalent, 3_020_000);
        assert_eq!(b.variance, 19_000);
    }

    #[test]
    fn test_loaded_variance_non_negative() {
        let loading = FrequencyLoading::default();
        for riders in (1_000..=5_000_000).step_by(37_000) {
            for frequency in [PaymentFrequency::SemiAnnual, PaymentFrequency::Quarterly] {
                let b = prorate(0, 0, riders, frequency, &loading);
                assert!(b.variance >= 0, "{riders} {frequency:?}");
                assert!(b.rider_variance >= 0, "{riders} {frequency:?}");
                assert_eq!(b.annual_equivalent % 1000, 0);
            }
        }
    }

    #[test]
    fn test_small_rider_totals_never_under_collect() {
        let loading = FrequencyLoading::default();
        for riders in [5_000, 9_000, 13_000] {
            for frequency in [PaymentFrequency::SemiAnnual, PaymentFrequency::Quarterly] {
                let b = prorate(0, 0, riders, frequency, &loading);
                assert!(b.rider_variance >= 0, "{riders} {frequency:?}");
                assert!(b.annual_equivalent >= riders, "{riders} {frequency:?}");
            }
        }

        // 3,380 loaded would round down to 3,000 and collect only 12,000
        let b = prorate(0, 0, 13_000, PaymentFrequency::Quarterly, &loading);
        assert_eq!(b.riders_per_period, 4_000);
        assert_eq!(b.annual_equivalent, 16_000);
        assert_eq!(b.rider_variance, 3_000);
    }

    #[test]
    fn test_main_and_extra_floor_separately() {
        let b = prorate(1_002_000, 2_000, 0, PaymentFrequency::Quarterly, &FrequencyLoading::default());
        // 250,500 and 500 floor to 250,000 and 0, not 251,000 combined
        assert_eq!(b.main_per_period, 250_000);
        assert_eq!(b.annual_equivalent, 1_000_000);
        assert_eq!(b.variance, -4_000);
    }

    #[test]
    fn test_oversized_amounts_saturate() {
        let b = prorate(u64::MAX, u64::MAX, 0, PaymentFrequency::Annual, &FrequencyLoading::default());
        assert_eq!(b.annual_total, u64::MAX);
        assert_eq!(b.variance, 0);
    }
}
