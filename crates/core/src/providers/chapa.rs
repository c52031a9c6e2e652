//! Chapa checkout client.
//!
//! Covers the two calls the ledger depends on - initialize (returns a
//! hosted checkout URL) and verify (server-to-server settlement check) -
//! plus webhook signature verification and payload sanitization. A
//! deterministic stub stands in for dev and tests.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::constants::{CHECKOUT_DESCRIPTION_MAX_LEN, CHECKOUT_TITLE_MAX_LEN, CURRENCY_ETB};
use crate::errors::{Error, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(20);

lazy_static! {
    /// Regional mobile numbers the provider accepts.
    static ref PHONE_RE: Regex = Regex::new(r"^(09|07)\d{8}$").unwrap();
}

/// Checkout customization shown on the hosted page. The provider caps
/// the title at 16 characters and the description at 50.
#[derive(Clone, Debug, Serialize)]
pub struct CheckoutCustomization {
    pub title: String,
    pub description: String,
}

impl CheckoutCustomization {
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: truncate_chars(title, CHECKOUT_TITLE_MAX_LEN),
            description: truncate_chars(description, CHECKOUT_DESCRIPTION_MAX_LEN),
        }
    }
}

/// Initialize-payment request.
#[derive(Clone, Debug)]
pub struct InitiatePayment {
    pub amount: Decimal,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Included only when it matches the regional format.
    pub phone_number: Option<String>,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: Option<String>,
    pub customization: CheckoutCustomization,
    pub meta: serde_json::Value,
}

/// Provider response to a successful initialize call.
#[derive(Clone, Debug)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

/// Result of a verify call. Settlement requires `is_success()`.
#[derive(Clone, Debug, Default)]
pub struct VerifiedPayment {
    pub status: String,
    pub reference: Option<String>,
    pub amount: Option<Decimal>,
    /// Gateway charge, when the provider reports it.
    pub gateway_fee: Option<Decimal>,
}

impl VerifiedPayment {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    pub name: String,
}

/// Contract for the checkout provider.
#[async_trait]
pub trait PaymentProviderTrait: Send + Sync {
    /// Obtains a hosted checkout URL for the given payment.
    async fn initialize(&self, request: InitiatePayment) -> Result<CheckoutSession>;

    /// Re-verifies a transaction server-to-server.
    async fn verify(&self, tx_ref: &str) -> Result<VerifiedPayment>;

    /// Banks the provider can pay out to.
    async fn list_banks(&self) -> Result<Vec<Bank>>;
}

// Wire types. The provider wants amounts as strings.

#[derive(Serialize)]
struct InitiateBody<'a> {
    amount: String,
    currency: &'static str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    tx_ref: &'a str,
    callback_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<&'a str>,
    customization: &'a CheckoutCustomization,
    meta: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct ProviderEnvelope<T> {
    status: String,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct InitData {
    checkout_url: String,
}

#[derive(Deserialize)]
struct VerifyData {
    status: Option<String>,
    reference: Option<String>,
    amount: Option<Decimal>,
    charge: Option<Decimal>,
}

#[derive(Deserialize)]
struct BankData {
    id: serde_json::Value,
    name: String,
}

/// HTTP client for the live provider.
pub struct ChapaClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl ChapaClient {
    pub fn new(base_url: &str, secret_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| Error::Unexpected(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    async fn read_envelope<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ProviderEnvelope<T>> {
        let status = response.status();
        if status.is_server_error() {
            return Err(Error::ProviderUnavailable(format!(
                "provider answered {status}"
            )));
        }
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderRejected(format!("{status}: {body}")));
        }
        response
            .json::<ProviderEnvelope<T>>()
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("malformed provider response: {e}")))
    }
}

#[async_trait]
impl PaymentProviderTrait for ChapaClient {
    async fn initialize(&self, request: InitiatePayment) -> Result<CheckoutSession> {
        let body = InitiateBody {
            amount: request.amount.to_string(),
            currency: CURRENCY_ETB,
            email: &request.email,
            first_name: &request.first_name,
            last_name: &request.last_name,
            phone_number: request.phone_number.as_deref(),
            tx_ref: &request.tx_ref,
            callback_url: &request.callback_url,
            return_url: request.return_url.as_deref(),
            customization: &request.customization,
            meta: &request.meta,
        };

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let envelope: ProviderEnvelope<InitData> = self.read_envelope(response).await?;
        if envelope.status != "success" {
            return Err(Error::ProviderRejected(
                envelope
                    .message
                    .unwrap_or_else(|| "initialization declined".to_string()),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| Error::ProviderUnavailable("provider returned no data".into()))?;

        Ok(CheckoutSession {
            checkout_url: data.checkout_url,
        })
    }

    async fn verify(&self, tx_ref: &str) -> Result<VerifiedPayment> {
        let response = self
            .http
            .get(format!("{}/transaction/verify/{}", self.base_url, tx_ref))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let envelope: ProviderEnvelope<VerifyData> = self.read_envelope(response).await?;

        // Settlement needs both the outer and inner status to agree.
        let data = envelope.data;
        let inner_status = data
            .as_ref()
            .and_then(|d| d.status.clone())
            .unwrap_or_default();
        let status = if envelope.status == "success" && inner_status == "success" {
            "success".to_string()
        } else {
            inner_status
        };

        Ok(VerifiedPayment {
            status,
            reference: data.as_ref().and_then(|d| d.reference.clone()),
            amount: data.as_ref().and_then(|d| d.amount),
            gateway_fee: data.as_ref().and_then(|d| d.charge),
        })
    }

    async fn list_banks(&self) -> Result<Vec<Bank>> {
        let response = self
            .http
            .get(format!("{}/banks", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let envelope: ProviderEnvelope<Vec<BankData>> = self.read_envelope(response).await?;
        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|b| Bank {
                id: bank_id_string(&b.id),
                name: b.name,
            })
            .collect())
    }
}

/// Deterministic provider for dev and tests: every checkout succeeds and
/// every verification settles.
pub struct StubPaymentProvider {
    frontend_url: String,
}

impl StubPaymentProvider {
    pub fn new(frontend_url: &str) -> Self {
        Self {
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentProviderTrait for StubPaymentProvider {
    async fn initialize(&self, request: InitiatePayment) -> Result<CheckoutSession> {
        Ok(CheckoutSession {
            checkout_url: format!(
                "{}/purchase/checkout?tx_ref={}",
                self.frontend_url, request.tx_ref
            ),
        })
    }

    async fn verify(&self, tx_ref: &str) -> Result<VerifiedPayment> {
        Ok(VerifiedPayment {
            status: "success".to_string(),
            reference: Some(format!("STUB-{tx_ref}")),
            amount: None,
            gateway_fee: None,
        })
    }

    async fn list_banks(&self) -> Result<Vec<Bank>> {
        Ok(vec![
            Bank {
                id: "946".to_string(),
                name: "Commercial Bank of Ethiopia".to_string(),
            },
            Bank {
                id: "656".to_string(),
                name: "Awash Bank".to_string(),
            },
            Bank {
                id: "855".to_string(),
                name: "telebirr".to_string(),
            },
        ])
    }
}

/// Verifies the webhook HMAC-SHA256 signature over the raw body.
/// Constant-time; any malformed input fails closed.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Keeps a phone number only when it matches the regional format the
/// provider accepts.
pub fn sanitize_phone(phone: Option<&str>) -> Option<String> {
    let phone = phone?.trim();
    PHONE_RE.is_match(phone).then(|| phone.to_string())
}

fn classify_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() || err.is_connect() {
        Error::ProviderUnavailable(format!("provider unreachable: {err}"))
    } else {
        Error::ProviderUnavailable(err.to_string())
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

fn bank_id_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_sanitization() {
        assert_eq!(sanitize_phone(Some("0912345678")).as_deref(), Some("0912345678"));
        assert_eq!(sanitize_phone(Some("0712345678")).as_deref(), Some("0712345678"));
        assert_eq!(sanitize_phone(Some(" 0912345678 ")).as_deref(), Some("0912345678"));
        assert!(sanitize_phone(Some("0812345678")).is_none());
        assert!(sanitize_phone(Some("091234567")).is_none());
        assert!(sanitize_phone(Some("+251912345678")).is_none());
        assert!(sanitize_phone(None).is_none());
    }

    #[test]
    fn customization_truncates() {
        let custom = CheckoutCustomization::new(
            "A very long checkout title",
            "A description that is much longer than fifty characters should be cut",
        );
        assert_eq!(custom.title.chars().count(), 16);
        assert_eq!(custom.description.chars().count(), 50);
    }

    #[test]
    fn webhook_signature_round_trip() {
        let secret = "testsecret";
        let body = br#"{"tx_ref":"coin-u1-abc","status":"success"}"#;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(verify_webhook_signature(secret, body, &signature));
        assert!(!verify_webhook_signature("wrong", body, &signature));
        assert!(!verify_webhook_signature(secret, b"tampered", &signature));
        assert!(!verify_webhook_signature(secret, body, "not-hex"));
    }
}
