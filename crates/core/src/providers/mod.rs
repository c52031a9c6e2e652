//! External payment collaborators: the checkout provider and the payout
//! rail. Both are traits so the rest of the core never sees HTTP.

mod chapa;
mod payout;

pub use chapa::{
    sanitize_phone, verify_webhook_signature, Bank, ChapaClient, CheckoutCustomization,
    CheckoutSession, InitiatePayment, PaymentProviderTrait, StubPaymentProvider,
    VerifiedPayment,
};
pub use payout::{PayoutAdapterTrait, PayoutOutcome, StubPayoutAdapter};
