//! Server configuration from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rust_decimal::Decimal;

use amora_core::config::{default_plans, PaymentConfig, RiskConfig};

/// Which checkout provider implementation to wire in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderMode {
    Live,
    Stub,
}

#[derive(Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,

    pub backend_url: String,
    pub frontend_url: String,

    // Provider
    pub provider_mode: ProviderMode,
    pub chapa_base_url: String,
    pub chapa_secret_key: String,
    /// HMAC secret for webhook signatures; defaults to the API secret.
    pub chapa_webhook_secret: String,
    pub webhook_require_signature: bool,

    // KYC object store
    pub kyc_encryption_key: [u8; 32],
    pub kyc_storage_dir: String,
    pub kyc_legacy_plaintext: bool,

    // Payments tunables
    pub vat_rate: Decimal,
    pub commission_rate: Decimal,
    pub gateway_rate: Decimal,
    pub gateway_fixed: Decimal,
    pub coins_per_etb: u64,
    pub min_withdrawal_etb: Decimal,
    pub max_daily_withdrawal_etb: Decimal,
    pub max_monthly_withdrawal_etb: Decimal,
    pub risk: RiskConfig,

    // Rate limiting
    pub gift_sends_per_minute: u32,

    // Background jobs
    pub perk_sweep_interval: Duration,
    pub risk_sweep_interval: Duration,

    // Dev switches
    pub dev_allow_activate: bool,
    pub seed_catalog: bool,
    pub debug: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_decimal(key: &str, default: &str) -> anyhow::Result<Decimal> {
    env_or(key, default)
        .parse::<Decimal>()
        .with_context(|| format!("invalid decimal in {key}"))
}

fn env_u64(key: &str, default: u64) -> anyhow::Result<u64> {
    std::env::var(key)
        .map(|v| v.parse::<u64>())
        .unwrap_or(Ok(default))
        .with_context(|| format!("invalid integer in {key}"))
}

fn env_i64(key: &str, default: i64) -> anyhow::Result<i64> {
    std::env::var(key)
        .map(|v| v.parse::<i64>())
        .unwrap_or(Ok(default))
        .with_context(|| format!("invalid integer in {key}"))
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
        .unwrap_or(default)
}

impl Config {
    /// Reads and validates the whole configuration. Startup fails here
    /// on a missing KYC key or inconsistent tunables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("AMORA_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("invalid AMORA_LISTEN_ADDR")?;
        let db_path = env_or("AMORA_DB_PATH", "./db/amora.db");
        let cors_allow = env_or("AMORA_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout =
            Duration::from_millis(env_u64("AMORA_REQUEST_TIMEOUT_MS", 30_000)?);

        let provider_mode = match env_or("AMORA_CHAPA_MODE", "stub").as_str() {
            "live" => ProviderMode::Live,
            _ => ProviderMode::Stub,
        };
        let chapa_secret_key = env_or("AMORA_CHAPA_SECRET_KEY", "");
        if provider_mode == ProviderMode::Live && chapa_secret_key.is_empty() {
            bail!("AMORA_CHAPA_SECRET_KEY is required when AMORA_CHAPA_MODE=live");
        }

        let raw_key = std::env::var("AMORA_KYC_ENCRYPTION_KEY")
            .context("AMORA_KYC_ENCRYPTION_KEY is required")?;
        let kyc_encryption_key = decode_kyc_key(&raw_key)?;

        let config = Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout,
            backend_url: env_or("AMORA_BACKEND_URL", "http://localhost:8080"),
            frontend_url: env_or("AMORA_FRONTEND_URL", "http://localhost:5173"),
            provider_mode,
            chapa_base_url: env_or("AMORA_CHAPA_BASE_URL", "https://api.chapa.co/v1"),
            chapa_webhook_secret: env_or("AMORA_CHAPA_WEBHOOK_SECRET", &chapa_secret_key),
            chapa_secret_key,
            webhook_require_signature: env_bool("AMORA_WEBHOOK_REQUIRE_SIGNATURE", true),
            kyc_encryption_key,
            kyc_storage_dir: env_or("AMORA_KYC_STORAGE_DIR", "./data/kyc"),
            kyc_legacy_plaintext: env_bool("AMORA_KYC_LEGACY_PLAINTEXT", false),
            vat_rate: env_decimal("AMORA_VAT_RATE", "0.15")?,
            commission_rate: env_decimal("AMORA_PLATFORM_COMMISSION_RATE", "0.25")?,
            gateway_rate: env_decimal("AMORA_GATEWAY_RATE", "0.03")?,
            gateway_fixed: env_decimal("AMORA_GATEWAY_FIXED", "2.00")?,
            coins_per_etb: env_u64("AMORA_COINS_PER_ETB", 1)?,
            min_withdrawal_etb: env_decimal("AMORA_MIN_WITHDRAWAL_ETB", "500")?,
            max_daily_withdrawal_etb: env_decimal("AMORA_MAX_DAILY_WITHDRAWAL_ETB", "5000")?,
            max_monthly_withdrawal_etb: env_decimal(
                "AMORA_MAX_MONTHLY_WITHDRAWAL_ETB",
                "50000",
            )?,
            risk: RiskConfig {
                topups_window_min: env_i64("AMORA_RISK_TOPUPS_WINDOW_MIN", 60)?,
                topups_count: env_u64("AMORA_RISK_TOPUPS_COUNT", 5)?,
                gifts_window_min: env_i64("AMORA_RISK_GIFTS_ETB_WINDOW_MIN", 60)?,
                gifts_etb_threshold: env_decimal("AMORA_RISK_GIFTS_ETB_THRESHOLD", "10000")?,
                withdrawals_window_min: env_i64("AMORA_RISK_WITHDRAWALS_WINDOW_MIN", 60)?,
                withdrawals_same_dest_threshold: env_u64(
                    "AMORA_RISK_WITHDRAWALS_SAME_DEST_THRESHOLD",
                    3,
                )?,
            },
            gift_sends_per_minute: env_u64("AMORA_GIFT_SENDS_PER_MINUTE", 10)? as u32,
            perk_sweep_interval: Duration::from_secs(env_u64(
                "AMORA_PERK_SWEEP_INTERVAL_SECS",
                300,
            )?),
            risk_sweep_interval: Duration::from_secs(env_u64(
                "AMORA_RISK_SWEEP_INTERVAL_SECS",
                600,
            )?),
            dev_allow_activate: env_bool("AMORA_DEV_ALLOW_ACTIVATE", false),
            seed_catalog: env_bool("AMORA_SEED_CATALOG", false),
            debug: env_bool("AMORA_DEBUG", false),
        };

        // One authoritative price table; refuse to boot on mismatch.
        config
            .payment_config()
            .validate()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        Ok(config)
    }

    /// The typed core configuration handed to services.
    pub fn payment_config(&self) -> PaymentConfig {
        PaymentConfig {
            vat_rate: self.vat_rate,
            commission_rate: self.commission_rate,
            gateway_rate: self.gateway_rate,
            gateway_fixed: self.gateway_fixed,
            coins_per_etb: self.coins_per_etb,
            min_withdrawal_etb: self.min_withdrawal_etb,
            max_daily_withdrawal_etb: self.max_daily_withdrawal_etb,
            max_monthly_withdrawal_etb: self.max_monthly_withdrawal_etb,
            risk: self.risk.clone(),
            plans: default_plans(),
            backend_url: self.backend_url.clone(),
            frontend_url: self.frontend_url.clone(),
        }
    }
}

fn decode_kyc_key(raw: &str) -> anyhow::Result<[u8; 32]> {
    let trimmed = raw.trim();
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            bail!("AMORA_KYC_ENCRYPTION_KEY must be base64 or a 32-byte ASCII string")
        }
    };
    if decoded.len() != 32 {
        bail!("AMORA_KYC_ENCRYPTION_KEY must decode to exactly 32 bytes");
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&decoded);
    Ok(key)
}
