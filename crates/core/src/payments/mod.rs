//! Coin packages, top-up orchestration, and webhook settlement.

mod payments_model;
mod payments_traits;
mod settlement_service;
mod topup_service;

pub use payments_model::{
    new_tx_ref, CoinPackage, NewCoinPackage, NewPayment, Payment, PaymentProvider,
    PaymentStatus, Receipt, TopUpCheckout,
};
pub use payments_traits::{
    CoinPackageRepositoryTrait, PaymentRepositoryTrait, SettleTopUp, SettlementOutcome,
};
pub use settlement_service::{SettlementService, WebhookAck, WebhookEvent};
pub use topup_service::TopUpService;
