//! Domain event types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Notification group an event is addressed to.
///
/// Clients subscribe to their own `user_{id}` channel; admin consoles
/// subscribe to the shared `admins` channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    User(String),
    Admins,
}

impl Group {
    /// Channel name on the wire.
    pub fn channel(&self) -> String {
        match self {
            Group::User(user_id) => format!("user_{user_id}"),
            Group::Admins => "admins".to_string(),
        }
    }
}

/// Events emitted by core services after successful mutations.
///
/// These are facts about ledger changes; delivery is best-effort and
/// happens after the owning transaction commits. The runtime adapter
/// (SSE, websocket, ...) fans them out to subscribed clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DomainEvent {
    /// Wallet snapshot after any balance movement.
    #[serde(rename = "wallet.updated")]
    WalletUpdated {
        coin_balance: u64,
        balance_etb: Decimal,
        hold_etb: Decimal,
    },

    #[serde(rename = "gift.sent")]
    GiftSent {
        tx_id: String,
        gift: String,
        coins: u64,
        value_etb: Decimal,
    },

    #[serde(rename = "gift.received")]
    GiftReceived {
        tx_id: String,
        gift: String,
        coins: u64,
        value_etb: Decimal,
        creator_payout: Decimal,
    },

    /// A top-up settled and coins were credited.
    #[serde(rename = "payment.settled")]
    PaymentSettled {
        payment_id: String,
        coins_credited: u64,
    },

    /// A new withdrawal awaits review (admins channel).
    #[serde(rename = "withdrawal.new")]
    WithdrawalNew {
        id: String,
        user_id: String,
        amount_etb: Decimal,
    },

    #[serde(rename = "withdrawal.paid")]
    WithdrawalPaid { id: String, amount_etb: Decimal },

    #[serde(rename = "withdrawal.rejected")]
    WithdrawalRejected { id: String, reason: String },

    /// Risk rules tripped for a user (admins channel).
    #[serde(rename = "risk.flag")]
    RiskFlagged {
        user_id: String,
        reasons: Vec<String>,
    },

    #[serde(rename = "subscription.activated")]
    SubscriptionActivated {
        plan: String,
        expires_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Wallet snapshot event from current balances.
    pub fn wallet_updated(wallet: &crate::wallets::Wallet) -> Self {
        Self::WalletUpdated {
            coin_balance: wallet.coin_balance,
            balance_etb: wallet.balance_etb,
            hold_etb: wallet.hold_etb,
        }
    }

    /// Wire tag of the event (e.g. `wallet.updated`).
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::WalletUpdated { .. } => "wallet.updated",
            DomainEvent::GiftSent { .. } => "gift.sent",
            DomainEvent::GiftReceived { .. } => "gift.received",
            DomainEvent::PaymentSettled { .. } => "payment.settled",
            DomainEvent::WithdrawalNew { .. } => "withdrawal.new",
            DomainEvent::WithdrawalPaid { .. } => "withdrawal.paid",
            DomainEvent::WithdrawalRejected { .. } => "withdrawal.rejected",
            DomainEvent::RiskFlagged { .. } => "risk.flag",
            DomainEvent::SubscriptionActivated { .. } => "subscription.activated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn group_channels() {
        assert_eq!(Group::User("u1".into()).channel(), "user_u1");
        assert_eq!(Group::Admins.channel(), "admins");
    }

    #[test]
    fn wallet_event_serializes_with_dotted_tag() {
        let event = DomainEvent::WalletUpdated {
            coin_balance: 100,
            balance_etb: dec!(75.00),
            hold_etb: dec!(0.00),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "wallet.updated");
        assert_eq!(json["coin_balance"], 100);

        let back: DomainEvent = serde_json::from_value(json).unwrap();
        match back {
            DomainEvent::WalletUpdated { coin_balance, .. } => assert_eq!(coin_balance, 100),
            other => panic!("expected WalletUpdated, got {other:?}"),
        }
    }

    #[test]
    fn kind_matches_serde_tag() {
        let event = DomainEvent::RiskFlagged {
            user_id: "u1".into(),
            reasons: vec!["excessive_topups:6 in 60m".into()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.kind());
    }
}
