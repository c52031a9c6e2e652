//! Subscription engine.

use std::sync::Arc;

use log::info;
use serde_json::json;

use super::subscriptions_model::{
    NewSubscriptionPurchase, Plan, PlanCode, SubscriptionCheckout,
};
use super::subscriptions_traits::{ActivationOutcome, SubscriptionRepositoryTrait};
use crate::config::PaymentConfig;
use crate::constants::SUB_TX_REF_PREFIX;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, EventSink, Group};
use crate::payments::new_tx_ref;
use crate::providers::{
    sanitize_phone, CheckoutCustomization, InitiatePayment, PaymentProviderTrait,
};
use crate::users::UserRepositoryTrait;

pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    provider: Arc<dyn PaymentProviderTrait>,
    sink: Arc<dyn EventSink>,
    config: Arc<PaymentConfig>,
}

impl SubscriptionService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        provider: Arc<dyn PaymentProviderTrait>,
        sink: Arc<dyn EventSink>,
        config: Arc<PaymentConfig>,
    ) -> Self {
        Self {
            subscriptions,
            users,
            provider,
            sink,
            config,
        }
    }

    /// The three plans, straight from the authoritative price table.
    pub fn plans(&self) -> Vec<Plan> {
        self.config
            .plans
            .iter()
            .map(|p| Plan {
                code: p.code,
                name: p.name.clone(),
                description: p.description.clone(),
                price_etb: p.price_etb,
                duration_days: p.duration_days,
                icon: p.icon.clone(),
            })
            .collect()
    }

    /// Initiates a perk purchase: INITIATED row plus a checkout URL,
    /// the same skeleton as a coin top-up. Activation happens when the
    /// webhook settles the `sub-` reference.
    pub async fn subscribe(&self, user_id: &str, plan: PlanCode) -> Result<SubscriptionCheckout> {
        let plan_config = self
            .config
            .plan(plan)
            .ok_or_else(|| Error::Config(format!("plan {} not configured", plan.as_str())))?;

        let user = self
            .users
            .get_by_id(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;

        let tx_ref = new_tx_ref(&format!("{SUB_TX_REF_PREFIX}-{}", plan.slug()), user_id);
        let purchase = self
            .subscriptions
            .create_initiated(NewSubscriptionPurchase {
                user_id: user_id.to_string(),
                plan,
                amount_etb: plan_config.price_etb,
                duration_days: plan_config.duration_days,
                tx_ref: tx_ref.clone(),
            })
            .await?;

        let session = self
            .provider
            .initialize(InitiatePayment {
                amount: plan_config.price_etb,
                email: user.email.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                phone_number: sanitize_phone(user.phone.as_deref()),
                tx_ref: tx_ref.clone(),
                callback_url: format!("{}/webhooks/chapa/", self.config.backend_url),
                return_url: None,
                customization: CheckoutCustomization::new("Amora", &plan_config.description),
                meta: json!({
                    "user_id": user_id,
                    "plan": plan.as_str(),
                    "tx_ref": tx_ref,
                }),
            })
            .await?;

        let purchase = self
            .subscriptions
            .attach_checkout(&purchase.id, &session.checkout_url)
            .await?;

        info!("subscription {} initiated for user {}", tx_ref, user_id);
        Ok(SubscriptionCheckout {
            checkout_url: session.checkout_url,
            tx_ref,
            purchase_id: purchase.id,
        })
    }

    /// Explicit activation, for environments without a reachable webhook.
    /// The server only exposes this behind a dev flag.
    pub async fn activate_direct(&self, user_id: &str, plan: PlanCode) -> Result<ActivationOutcome> {
        let plan_config = self
            .config
            .plan(plan)
            .ok_or_else(|| Error::Config(format!("plan {} not configured", plan.as_str())))?;

        let outcome = self
            .subscriptions
            .activate_direct(NewSubscriptionPurchase {
                user_id: user_id.to_string(),
                plan,
                amount_etb: plan_config.price_etb,
                duration_days: plan_config.duration_days,
                tx_ref: new_tx_ref(&format!("{SUB_TX_REF_PREFIX}-{}", plan.slug()), user_id),
            })
            .await?;

        if let ActivationOutcome::Activated { expires_at, .. } = &outcome {
            self.sink.emit(
                Group::User(user_id.to_string()),
                DomainEvent::SubscriptionActivated {
                    plan: plan.as_str().to_string(),
                    expires_at: *expires_at,
                },
            );
        }
        Ok(outcome)
    }

    /// Expiry sweep: a perk stays enabled iff its expiry is after now.
    /// Safe to run on any cadence.
    pub async fn expire_due_perks(&self) -> Result<usize> {
        let cleared = self
            .subscriptions
            .clear_expired_perks(chrono::Utc::now())
            .await?;
        if cleared > 0 {
            info!("perk expiry sweep cleared {} perks", cleared);
        }
        Ok(cleared)
    }
}
