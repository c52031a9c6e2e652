//! Deterministic fixed-point ETB arithmetic.
//!
//! Pure functions, no I/O. Every named output is rounded to 2 decimal
//! places, half-up, so results are reproducible across platforms.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{MoneyError, Result};

/// Rounds to 2 decimal places, half-up.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Gross pricing of a coin top-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopUpPricing {
    /// Net amount the platform keeps (equals the package target).
    pub base_etb: Decimal,
    /// VAT collected on the base.
    pub vat_etb: Decimal,
    /// What the customer pays, grossed up for the gateway cut.
    pub total_etb: Decimal,
}

/// Computes how much the customer pays so the platform nets `target_net`
/// before gateway fees, while collecting VAT on the base:
///
/// ```text
/// base  = target_net
/// vat   = base * vat_rate
/// total = (base + vat + gw_fixed) / (1 - gw_rate)
/// ```
///
/// Fails when `gw_rate >= 1` (the denominator would vanish or flip sign).
pub fn gross_topup_price(
    target_net: Decimal,
    vat_rate: Decimal,
    gw_rate: Decimal,
    gw_fixed: Decimal,
) -> Result<TopUpPricing> {
    let denominator = Decimal::ONE - gw_rate;
    if denominator <= Decimal::ZERO {
        return Err(MoneyError::GatewayRateNotBelowOne(gw_rate).into());
    }

    let base = target_net;
    let vat_amount = base * vat_rate;
    let total = (base + vat_amount + gw_fixed) / denominator;

    Ok(TopUpPricing {
        base_etb: round2(base),
        vat_etb: round2(vat_amount),
        total_etb: round2(total),
    })
}

/// Split of a gift's reference value between platform and creator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiftSplit {
    /// Platform's share of the gift value, before VAT withholding.
    pub commission_gross: Decimal,
    /// Output tax withheld on the commission revenue.
    pub vat_on_commission: Decimal,
    /// Platform revenue after VAT.
    pub commission_net: Decimal,
    /// What the recipient creator is credited.
    pub creator_payout: Decimal,
}

/// Splits a gift value into platform commission and creator payout.
///
/// Commission is a percentage of the gift value; VAT applies to the
/// commission portion only and is withheld from platform revenue, never
/// deducted from the creator payout.
pub fn split_gift(value: Decimal, commission_rate: Decimal, vat_rate: Decimal) -> GiftSplit {
    let commission_gross = round2(value * commission_rate);
    let vat_on_commission = round2(commission_gross * vat_rate);
    let commission_net = commission_gross - vat_on_commission;
    let creator_payout = value - commission_gross;

    GiftSplit {
        commission_gross,
        vat_on_commission,
        commission_net,
        creator_payout: round2(creator_payout),
    }
}

/// `true` when the value has at most 2 fractional digits.
pub fn is_two_dp(value: Decimal) -> bool {
    round2(value) == value
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn gross_topup_with_gateway_and_vat() {
        let pricing =
            gross_topup_price(dec!(100), dec!(0.15), dec!(0.03), dec!(2.00)).unwrap();
        assert_eq!(pricing.base_etb, dec!(100.00));
        assert_eq!(pricing.vat_etb, dec!(15.00));
        // (100 + 15 + 2) / 0.97 = 120.6185... -> 120.62
        assert_eq!(pricing.total_etb, dec!(120.62));
    }

    #[test]
    fn gross_topup_zero_gateway() {
        let pricing = gross_topup_price(dec!(100), dec!(0.15), dec!(0), dec!(0)).unwrap();
        assert_eq!(pricing.base_etb, dec!(100.00));
        assert_eq!(pricing.vat_etb, dec!(15.00));
        assert_eq!(pricing.total_etb, dec!(115.00));
    }

    #[test]
    fn gross_topup_rejects_full_gateway_rate() {
        assert!(gross_topup_price(dec!(100), dec!(0.15), dec!(1), dec!(0)).is_err());
        assert!(gross_topup_price(dec!(100), dec!(0.15), dec!(1.5), dec!(0)).is_err());
    }

    #[test]
    fn split_gift_basic() {
        let split = split_gift(dec!(100), dec!(0.25), dec!(0.15));
        assert_eq!(split.commission_gross, dec!(25.00));
        assert_eq!(split.vat_on_commission, dec!(3.75));
        assert_eq!(split.commission_net, dec!(21.25));
        assert_eq!(split.creator_payout, dec!(75.00));
    }

    #[test]
    fn split_gift_rounding() {
        let split = split_gift(dec!(9.99), dec!(0.125), dec!(0.15));
        assert_eq!(split.commission_gross, dec!(1.25)); // 1.24875 -> 1.25
        assert_eq!(split.vat_on_commission, dec!(0.19)); // 0.1875 -> 0.19
        assert_eq!(split.commission_net, dec!(1.06));
        assert_eq!(split.creator_payout, dec!(8.74));
    }

    #[test]
    fn split_identities_hold() {
        for (value, rate) in [
            (dec!(33.33), dec!(0.25)),
            (dec!(0.01), dec!(0.25)),
            (dec!(1234.56), dec!(0.10)),
        ] {
            let split = split_gift(value, rate, dec!(0.15));
            assert_eq!(split.commission_gross + split.creator_payout, value);
            assert_eq!(
                split.commission_net + split.vat_on_commission,
                split.commission_gross
            );
        }
    }

    #[test]
    fn round2_is_half_up() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(120.6185)), dec!(120.62));
    }

    #[test]
    fn two_dp_check() {
        assert!(is_two_dp(dec!(499.99)));
        assert!(!is_two_dp(dec!(499.999)));
    }
}
