//! Top-up orchestration: package resolution, payment row creation, and
//! the provider checkout round-trip.

use std::sync::Arc;

use log::{info, warn};
use serde_json::json;

use super::payments_model::{new_tx_ref, NewPayment, PaymentProvider, Receipt, TopUpCheckout};
use super::payments_traits::{CoinPackageRepositoryTrait, PaymentRepositoryTrait};
use crate::config::PaymentConfig;
use crate::constants::COIN_TX_REF_PREFIX;
use crate::errors::{Error, Result};
use crate::providers::{
    sanitize_phone, CheckoutCustomization, InitiatePayment, PaymentProviderTrait,
};
use crate::users::UserRepositoryTrait;
use crate::wallets::WalletRepositoryTrait;

pub struct TopUpService {
    packages: Arc<dyn CoinPackageRepositoryTrait>,
    payments: Arc<dyn PaymentRepositoryTrait>,
    wallets: Arc<dyn WalletRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    provider: Arc<dyn PaymentProviderTrait>,
    config: Arc<PaymentConfig>,
}

impl TopUpService {
    pub fn new(
        packages: Arc<dyn CoinPackageRepositoryTrait>,
        payments: Arc<dyn PaymentRepositoryTrait>,
        wallets: Arc<dyn WalletRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        provider: Arc<dyn PaymentProviderTrait>,
        config: Arc<PaymentConfig>,
    ) -> Self {
        Self {
            packages,
            payments,
            wallets,
            users,
            provider,
            config,
        }
    }

    /// Creates a top-up: an INITIATED payment plus a hosted checkout URL.
    ///
    /// The payment row is written before the provider round-trip so a
    /// provider failure leaves a triageable INITIATED row behind; no
    /// balance moves until the webhook settles it.
    pub async fn create_topup(
        &self,
        user_id: &str,
        package_id: &str,
        return_url: Option<String>,
    ) -> Result<TopUpCheckout> {
        let package = self
            .packages
            .get_active(package_id)?
            .ok_or_else(|| Error::InvalidPackage(package_id.to_string()))?;

        let user = self
            .users
            .get_by_id(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;

        // Make sure the wallet exists before any settlement can race it.
        self.wallets.get_or_create(user_id).await?;

        let tx_ref = new_tx_ref(COIN_TX_REF_PREFIX, user_id);
        let payment = self
            .payments
            .create_initiated(NewPayment {
                user_id: user_id.to_string(),
                package_id: package.id.clone(),
                provider: PaymentProvider::Chapa,
                tx_ref: tx_ref.clone(),
                price_total_etb: package.price_total_etb,
                vat_etb: package.vat_etb,
            })
            .await?;

        let request = InitiatePayment {
            amount: package.price_total_etb,
            email: sanitize_email(&user.email, user_id),
            first_name: sanitize_name(&user.first_name, "Amora"),
            last_name: sanitize_name(&user.last_name, "User"),
            phone_number: sanitize_phone(user.phone.as_deref()),
            tx_ref: tx_ref.clone(),
            callback_url: format!("{}/webhooks/chapa/", self.config.backend_url),
            return_url,
            customization: CheckoutCustomization::new(
                "Amora Coins",
                &format!("{} coin top-up", package.coins),
            ),
            meta: json!({
                "user_id": user_id,
                "package_id": package.id,
                "tx_ref": tx_ref,
            }),
        };

        let session = match self.provider.initialize(request).await {
            Ok(session) => session,
            Err(err) => {
                // The INITIATED row stays behind for manual triage.
                warn!(
                    "checkout initialization failed for tx_ref {}: {}",
                    tx_ref, err
                );
                return Err(err);
            }
        };

        let payment = self
            .payments
            .attach_checkout(&payment.id, &session.checkout_url)
            .await?;

        info!("initiated top-up {} for user {}", tx_ref, user_id);
        Ok(TopUpCheckout {
            checkout_url: session.checkout_url,
            tx_ref,
            payment_id: payment.id,
        })
    }

    /// Receipt for a settled payment; only the owner may read it.
    pub fn get_receipt(&self, user_id: &str, payment_id: &str) -> Result<Receipt> {
        let payment = self
            .payments
            .get_by_id(payment_id)?
            .ok_or_else(|| Error::NotFound(format!("payment {payment_id}")))?;
        if payment.user_id != user_id {
            return Err(Error::Forbidden("payment belongs to another user".into()));
        }
        self.payments
            .get_receipt(payment_id)?
            .ok_or_else(|| Error::NotFound("receipt".into()))
    }

}

fn sanitize_email(email: &str, user_id: &str) -> String {
    let email = email.trim();
    if email.contains('@') {
        email.to_string()
    } else {
        format!("{user_id}@users.amora.app")
    }
}

fn sanitize_name(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_falls_back_when_invalid() {
        assert_eq!(sanitize_email("a@b.cd", "u1"), "a@b.cd");
        assert_eq!(sanitize_email("  ", "u1"), "u1@users.amora.app");
    }

    #[test]
    fn names_fall_back_when_blank() {
        assert_eq!(sanitize_name(" Abebe ", "User"), "Abebe");
        assert_eq!(sanitize_name("", "User"), "User");
    }
}
