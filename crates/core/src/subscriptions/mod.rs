//! Subscription perks: purchase, activation, and the expiry sweep.

mod subscriptions_model;
mod subscriptions_service;
mod subscriptions_traits;

pub use subscriptions_model::{
    NewSubscriptionPurchase, Plan, PlanCode, SubscriptionCheckout, SubscriptionPurchase,
    SubscriptionStatus,
};
pub use subscriptions_service::SubscriptionService;
pub use subscriptions_traits::{ActivationOutcome, SubscriptionRepositoryTrait};
