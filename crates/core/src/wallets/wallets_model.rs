//! Wallet models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gifts::GiftTransaction;

/// One wallet per user.
///
/// Invariants maintained by the ledger:
/// `coin_balance >= 0` and `balance_etb >= hold_etb >= 0`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    /// Spendable coins. Integer unit of account, not withdrawable.
    pub coin_balance: u64,
    /// Creator earnings in ETB.
    pub balance_etb: Decimal,
    /// Portion of `balance_etb` reserved for pending withdrawals.
    pub hold_etb: Decimal,
    /// Capability gate; withdrawals require level >= 2.
    pub kyc_level: u8,
    /// Risk flag toggled by the risk engine.
    pub withdrawals_blocked: bool,
    /// Banned from sending gifts or transacting.
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// The withdrawable amount: `balance_etb - hold_etb`.
    pub fn available_etb(&self) -> Decimal {
        self.balance_etb - self.hold_etb
    }
}

/// Wallet endpoint payload: the wallet plus recent gift activity.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    pub coin_balance: u64,
    pub balance_etb: Decimal,
    pub hold_etb: Decimal,
    pub available_etb: Decimal,
    pub kyc_level: u8,
    pub withdrawals_blocked: bool,
    pub recent_gifts: Vec<GiftTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn available_is_balance_minus_hold() {
        let wallet = Wallet {
            id: "w1".into(),
            user_id: "u1".into(),
            coin_balance: 0,
            balance_etb: dec!(1200.00),
            hold_etb: dec!(600.00),
            kyc_level: 2,
            withdrawals_blocked: false,
            is_banned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(wallet.available_etb(), dec!(600.00));
    }
}
