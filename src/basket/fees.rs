//! Processing fees for a basket and how they are shared between payments.
//!
//! A basket can hold both one-off and recurring donations, which are charged
//! as two separate payments: a one-off charge and a subscription. When the
//! donor chooses to cover the processing fees, the fee is worked out on the
//! whole basket and then split between the two payments in proportion to
//! their subtotals.

use serde::Serialize;

use crate::money::Pence;

/// The percentage part of the processing fee, in tenths of a percent (1.2%).
const FEE_RATE_PER_MILLE: Pence = 12;

/// The fixed part of the processing fee.
const FEE_FIXED_PENCE: Pence = 20;

/// The subtotals, fees and totals for the one-off and recurring parts of a basket.
///
/// Invariants: `one_off_fees + recurring_fees == fees` and
/// `total == one_off_total + recurring_total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeeSplit {
    /// The sum of the one-off items.
    pub one_off_subtotal: Pence,
    /// The sum of the monthly items.
    pub recurring_subtotal: Pence,
    /// The fee on the whole basket, or zero when fees are not covered.
    pub fees: Pence,
    /// The part of `fees` charged with the one-off payment.
    pub one_off_fees: Pence,
    /// The part of `fees` charged with each monthly payment.
    pub recurring_fees: Pence,
    /// What is charged today for the one-off items.
    pub one_off_total: Pence,
    /// What is charged each month for the recurring items.
    pub recurring_total: Pence,
    /// Both subtotals plus `fees`.
    pub total: Pence,
}

impl FeeSplit {
    /// The combined subtotal before fees.
    pub fn subtotal(&self) -> Pence {
        self.one_off_subtotal + self.recurring_subtotal
    }
}

/// Work out the processing fee for a basket and split it between the one-off
/// and recurring payments.
///
/// When `cover_fees` is false every fee is zero. Otherwise the fee is 1.2% of
/// the combined subtotal, rounded to the nearest penny, plus 20p. A basket
/// with only one kind of payment puts the whole fee on that payment. A mixed
/// basket gives the one-off payment its rounded proportional share and the
/// recurring payment whatever is left, so the two shares always add up to the
/// fee exactly.
///
/// Negative subtotals are treated as zero.
pub fn split_fees(one_off_subtotal: Pence, recurring_subtotal: Pence, cover_fees: bool) -> FeeSplit {
    let one_off_subtotal = one_off_subtotal.max(0);
    let recurring_subtotal = recurring_subtotal.max(0);
    let subtotal = one_off_subtotal.saturating_add(recurring_subtotal);

    let fees = if cover_fees {
        scale_rounded(subtotal, FEE_RATE_PER_MILLE, 1000) + FEE_FIXED_PENCE
    } else {
        0
    };

    let (one_off_fees, recurring_fees) = if recurring_subtotal == 0 {
        (fees, 0)
    } else if one_off_subtotal == 0 {
        (0, fees)
    } else {
        let one_off_fees = scale_rounded(fees, one_off_subtotal, subtotal);
        (one_off_fees, fees - one_off_fees)
    };

    let one_off_total = one_off_subtotal.saturating_add(one_off_fees);
    let recurring_total = recurring_subtotal.saturating_add(recurring_fees);

    FeeSplit {
        one_off_subtotal,
        recurring_subtotal,
        fees,
        one_off_fees,
        recurring_fees,
        one_off_total,
        recurring_total,
        total: one_off_total.saturating_add(recurring_total),
    }
}

/// `value * numerator / denominator` rounded half away from zero, for
/// non-negative inputs and a positive denominator.
///
/// The product is taken in `i128` so it cannot overflow, results beyond
/// `Pence::MAX` saturate.
pub(crate) fn scale_rounded(value: Pence, numerator: Pence, denominator: Pence) -> Pence {
    let product = i128::from(value) * i128::from(numerator);
    let denominator = i128::from(denominator);
    let rounded = (2 * product + denominator) / (2 * denominator);

    Pence::try_from(rounded).unwrap_or(Pence::MAX)
}

#[cfg(test)]
mod tests {
    use crate::money::MAX_AMOUNT_PENCE;

    use super::{FeeSplit, scale_rounded, split_fees};

    #[test]
    fn no_fees_when_not_covering() {
        let got = split_fees(1234, 5678, false);

        assert_eq!(
            got,
            FeeSplit {
                one_off_subtotal: 1234,
                recurring_subtotal: 5678,
                fees: 0,
                one_off_fees: 0,
                recurring_fees: 0,
                one_off_total: 1234,
                recurring_total: 5678,
                total: 6912,
            }
        );
    }

    #[test]
    fn empty_basket_still_pays_fixed_fee() {
        let got = split_fees(0, 0, true);

        assert_eq!(got.fees, 20);
        assert_eq!(got.one_off_fees, 20);
        assert_eq!(got.recurring_fees, 0);
        assert_eq!(got.total, 20);
    }

    #[test]
    fn one_off_only_takes_all_fees() {
        let got = split_fees(1000, 0, true);

        assert_eq!(got.fees, 32);
        assert_eq!(got.one_off_fees, 32);
        assert_eq!(got.recurring_fees, 0);
        assert_eq!(got.one_off_total, 1032);
        assert_eq!(got.total, 1032);
    }

    #[test]
    fn recurring_only_takes_all_fees() {
        let got = split_fees(0, 500, true);

        assert_eq!(got.fees, 26);
        assert_eq!(got.one_off_fees, 0);
        assert_eq!(got.recurring_fees, 26);
        assert_eq!(got.recurring_total, 526);
    }

    #[test]
    fn equal_subtotals_split_evenly() {
        let got = split_fees(1000, 1000, true);

        assert_eq!(got.fees, 44);
        assert_eq!(got.one_off_fees, 22);
        assert_eq!(got.recurring_fees, 22);
        assert_eq!(got.total, 2044);
    }

    #[test]
    fn recurring_side_absorbs_rounding_remainder() {
        // fees = round(3000 * 0.012) + 20 = 56, one-off share = round(56 / 3) = 19
        let got = split_fees(1000, 2000, true);

        assert_eq!(got.fees, 56);
        assert_eq!(got.one_off_fees, 19);
        assert_eq!(got.recurring_fees, 37);
    }

    #[test]
    fn fee_percentage_rounds_half_up() {
        // 1.2% of 125 is 1.5p, which rounds to 2p.
        assert_eq!(split_fees(125, 0, true).fees, 22);
        // 1.2% of 120 is 1.44p, which rounds to 1p.
        assert_eq!(split_fees(120, 0, true).fees, 21);
    }

    #[test]
    fn negative_subtotals_are_clamped() {
        assert_eq!(split_fees(-500, 1000, false), split_fees(0, 1000, false));
    }

    #[test]
    fn largest_item_amount_has_exact_fee() {
        // 1.2% of £1,000,000 is £12,000, plus 20p.
        assert_eq!(split_fees(MAX_AMOUNT_PENCE, 0, true).fees, 1_200_020);
    }

    #[test]
    fn huge_subtotals_do_not_overflow() {
        let got = split_fees(i64::MAX / 2, i64::MAX / 2, true);

        assert!(got.fees > 0);
        assert_eq!(got.one_off_fees + got.recurring_fees, got.fees);
        assert_eq!(got.total, i64::MAX);
    }

    #[test]
    fn scale_rounded_rounds_half_away_from_zero() {
        assert_eq!(scale_rounded(5, 1, 10), 1);
        assert_eq!(scale_rounded(4, 1, 10), 0);
        assert_eq!(scale_rounded(15, 1, 10), 2);
        assert_eq!(scale_rounded(i64::MAX, 12, 1000), 110_680_464_442_257_310);
    }
}
