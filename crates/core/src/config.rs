//! Typed runtime configuration for the payments core.
//!
//! All tunables are provided at startup by the host process (the server
//! reads them from the environment) and validated once; services receive
//! an immutable `PaymentConfig`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::{Error, Result};
use crate::subscriptions::PlanCode;

/// Risk rule thresholds, all tunable.
#[derive(Clone, Debug)]
pub struct RiskConfig {
    /// Window for the excessive top-ups rule, minutes.
    pub topups_window_min: i64,
    /// SUCCESS payments within the window that trip the rule.
    pub topups_count: u64,
    /// Window for the large-gifts rule, minutes.
    pub gifts_window_min: i64,
    /// Received gift value within the window that trips the rule, ETB.
    pub gifts_etb_threshold: Decimal,
    /// Window for the repeat-destination rule, minutes.
    pub withdrawals_window_min: i64,
    /// Withdrawals to the same destination within the window that trip
    /// the rule.
    pub withdrawals_same_dest_threshold: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            topups_window_min: 60,
            topups_count: 5,
            gifts_window_min: 60,
            gifts_etb_threshold: dec!(10000),
            withdrawals_window_min: 60,
            withdrawals_same_dest_threshold: 3,
        }
    }
}

/// One subscription plan in the authoritative price table.
#[derive(Clone, Debug)]
pub struct PlanConfig {
    pub code: PlanCode,
    pub name: String,
    pub description: String,
    pub price_etb: Decimal,
    pub duration_days: i64,
    pub icon: String,
}

/// Immutable payments configuration shared by all core services.
#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub vat_rate: Decimal,
    pub commission_rate: Decimal,
    pub gateway_rate: Decimal,
    pub gateway_fixed: Decimal,
    pub coins_per_etb: u64,
    pub min_withdrawal_etb: Decimal,
    pub max_daily_withdrawal_etb: Decimal,
    pub max_monthly_withdrawal_etb: Decimal,
    pub risk: RiskConfig,
    pub plans: Vec<PlanConfig>,
    pub backend_url: String,
    pub frontend_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            vat_rate: dec!(0.15),
            commission_rate: dec!(0.25),
            gateway_rate: dec!(0.03),
            gateway_fixed: dec!(2.00),
            coins_per_etb: 1,
            min_withdrawal_etb: dec!(500),
            max_daily_withdrawal_etb: dec!(5000),
            max_monthly_withdrawal_etb: dec!(50000),
            risk: RiskConfig::default(),
            plans: default_plans(),
            backend_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl PaymentConfig {
    /// Validates rates and the plan price table. The process refuses to
    /// boot on a config that fails here.
    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("VAT_RATE", self.vat_rate),
            ("PLATFORM_COMMISSION_RATE", self.commission_rate),
            ("GATEWAY_RATE", self.gateway_rate),
        ] {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(Error::Config(format!(
                    "{name} must be in [0, 1), got {rate}"
                )));
            }
        }
        if self.gateway_fixed < Decimal::ZERO {
            return Err(Error::Config("GATEWAY_FIXED must not be negative".into()));
        }
        if self.min_withdrawal_etb <= Decimal::ZERO {
            return Err(Error::Config("MIN_WITHDRAWAL_ETB must be positive".into()));
        }
        if self.max_daily_withdrawal_etb < self.min_withdrawal_etb {
            return Err(Error::Config(
                "MAX_DAILY_WITHDRAWAL_ETB is below MIN_WITHDRAWAL_ETB".into(),
            ));
        }
        if self.max_monthly_withdrawal_etb < self.max_daily_withdrawal_etb {
            return Err(Error::Config(
                "MAX_MONTHLY_WITHDRAWAL_ETB is below MAX_DAILY_WITHDRAWAL_ETB".into(),
            ));
        }

        // One authoritative price table: every plan exactly once, sane
        // prices and durations.
        for code in PlanCode::ALL {
            let matching: Vec<&PlanConfig> =
                self.plans.iter().filter(|p| p.code == code).collect();
            match matching.as_slice() {
                [plan] => {
                    if plan.price_etb <= Decimal::ZERO {
                        return Err(Error::Config(format!(
                            "plan {} has non-positive price {}",
                            code.as_str(),
                            plan.price_etb
                        )));
                    }
                    if plan.duration_days <= 0 {
                        return Err(Error::Config(format!(
                            "plan {} has non-positive duration",
                            code.as_str()
                        )));
                    }
                }
                [] => {
                    return Err(Error::Config(format!(
                        "plan {} missing from the price table",
                        code.as_str()
                    )))
                }
                _ => {
                    return Err(Error::Config(format!(
                        "plan {} appears more than once in the price table",
                        code.as_str()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Looks a plan up in the price table.
    pub fn plan(&self, code: PlanCode) -> Option<&PlanConfig> {
        self.plans.iter().find(|p| p.code == code)
    }
}

/// The stock three-plan table.
pub fn default_plans() -> Vec<PlanConfig> {
    vec![
        PlanConfig {
            code: PlanCode::Boost,
            name: "Boost Plan".to_string(),
            description: "Get featured more and reach more profiles for better matching!"
                .to_string(),
            price_etb: dec!(199.00),
            duration_days: 30,
            icon: "🔥".to_string(),
        },
        PlanConfig {
            code: PlanCode::LikesReveal,
            name: "Likes Reveal Plan".to_string(),
            description: "See who liked you and decide if you like them back!".to_string(),
            price_etb: dec!(149.00),
            duration_days: 30,
            icon: "❤️".to_string(),
        },
        PlanConfig {
            code: PlanCode::AdFree,
            name: "Ad-Free Plan".to_string(),
            description: "Remove ads and enjoy smooth swiping!".to_string(),
            price_etb: dec!(99.00),
            duration_days: 30,
            icon: "🚫".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PaymentConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_gateway_rate_of_one() {
        let config = PaymentConfig {
            gateway_rate: dec!(1),
            ..PaymentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_missing_plan() {
        let mut config = PaymentConfig::default();
        config.plans.retain(|p| p.code != PlanCode::AdFree);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_plan() {
        let mut config = PaymentConfig::default();
        let dup = config.plans[0].clone();
        config.plans.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_mismatched_price() {
        let mut config = PaymentConfig::default();
        config.plans[0].price_etb = dec!(0);
        assert!(config.validate().is_err());
    }
}
