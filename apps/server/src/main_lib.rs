//! Application state wiring.

use std::sync::Arc;

use amora_core::config::PaymentConfig;
use amora_core::events::EventSink;
use amora_core::gifts::{Gift, GiftRepositoryTrait, GiftService, GiftTransactionRepositoryTrait};
use amora_core::kyc::{KycRepositoryTrait, KycService};
use amora_core::money::gross_topup_price;
use amora_core::payments::{
    CoinPackage, CoinPackageRepositoryTrait, PaymentRepositoryTrait, SettlementService,
    TopUpService,
};
use amora_core::providers::{
    ChapaClient, PaymentProviderTrait, PayoutAdapterTrait, StubPaymentProvider, StubPayoutAdapter,
};
use amora_core::risk::RiskService;
use amora_core::subscriptions::{SubscriptionRepositoryTrait, SubscriptionService};
use amora_core::users::UserRepositoryTrait;
use amora_core::wallets::{WalletRepositoryTrait, WalletService};
use amora_core::withdrawals::{WithdrawalRepositoryTrait, WithdrawalService};
use amora_storage_sqlite as storage;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::{Config, ProviderMode};
use crate::events::{BroadcastEventSink, EventBus};
use crate::kyc_store::EncryptedFileStore;
use crate::rate_limit::RateLimiter;

pub struct AppState {
    pub config: Config,
    pub payment_config: Arc<PaymentConfig>,

    pub users: Arc<dyn UserRepositoryTrait>,
    pub packages: Arc<dyn CoinPackageRepositoryTrait>,

    pub wallet_service: Arc<WalletService>,
    pub topup_service: Arc<TopUpService>,
    pub settlement_service: Arc<SettlementService>,
    pub gift_service: Arc<GiftService>,
    pub withdrawal_service: Arc<WithdrawalService>,
    pub subscription_service: Arc<SubscriptionService>,
    pub kyc_service: Arc<KycService>,
    pub risk_service: Arc<RiskService>,

    pub provider: Arc<dyn PaymentProviderTrait>,
    pub events: EventBus,
    pub gift_limiter: RateLimiter,
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,amora_server=debug"));
    fmt().with_env_filter(filter).init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let pool = storage::create_pool(&config.db_path)?;
    storage::run_migrations(&pool)?;
    let writer = storage::spawn_writer((*pool).clone());

    let payment_config = Arc::new(config.payment_config());

    // Repositories
    let users: Arc<dyn UserRepositoryTrait> = Arc::new(storage::users::UserRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let wallets: Arc<dyn WalletRepositoryTrait> = Arc::new(
        storage::wallets::WalletRepository::new(pool.clone(), writer.clone()),
    );
    let packages: Arc<dyn CoinPackageRepositoryTrait> = Arc::new(
        storage::payments::CoinPackageRepository::new(pool.clone(), writer.clone()),
    );
    let payments: Arc<dyn PaymentRepositoryTrait> = Arc::new(
        storage::payments::PaymentRepository::new(pool.clone(), writer.clone()),
    );
    let gifts: Arc<dyn GiftRepositoryTrait> = Arc::new(storage::gifts::GiftRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let gift_transactions: Arc<dyn GiftTransactionRepositoryTrait> = Arc::new(
        storage::gifts::GiftTransactionRepository::new(pool.clone(), writer.clone()),
    );
    let withdrawals: Arc<dyn WithdrawalRepositoryTrait> = Arc::new(
        storage::withdrawals::WithdrawalRepository::new(pool.clone(), writer.clone()),
    );
    let kyc: Arc<dyn KycRepositoryTrait> = Arc::new(storage::kyc::KycRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let subscriptions: Arc<dyn SubscriptionRepositoryTrait> = Arc::new(
        storage::subscriptions::SubscriptionRepository::new(pool.clone(), writer.clone()),
    );
    let audit: Arc<dyn amora_core::audit::AuditLogRepositoryTrait> = Arc::new(
        storage::audit::AuditLogRepository::new(pool.clone(), writer.clone()),
    );

    // Realtime
    let events = EventBus::new(256);
    let sink: Arc<dyn EventSink> = Arc::new(BroadcastEventSink::new(events.clone()));

    // External collaborators
    let provider: Arc<dyn PaymentProviderTrait> = match config.provider_mode {
        ProviderMode::Live => Arc::new(ChapaClient::new(
            &config.chapa_base_url,
            &config.chapa_secret_key,
        )?),
        ProviderMode::Stub => Arc::new(StubPaymentProvider::new(&config.frontend_url)),
    };
    let payout: Arc<dyn PayoutAdapterTrait> = Arc::new(StubPayoutAdapter);
    let kyc_store = Arc::new(EncryptedFileStore::new(
        &config.kyc_storage_dir,
        config.kyc_encryption_key,
        config.kyc_legacy_plaintext,
    ));

    // Services
    let wallet_service = Arc::new(WalletService::new(
        wallets.clone(),
        gift_transactions.clone(),
    ));
    let topup_service = Arc::new(TopUpService::new(
        packages.clone(),
        payments.clone(),
        wallets.clone(),
        users.clone(),
        provider.clone(),
        payment_config.clone(),
    ));
    let settlement_service = Arc::new(SettlementService::new(
        payments.clone(),
        subscriptions.clone(),
        provider.clone(),
        sink.clone(),
    ));
    let gift_service = Arc::new(GiftService::new(
        gifts.clone(),
        gift_transactions.clone(),
        wallets.clone(),
        users.clone(),
        audit.clone(),
        sink.clone(),
        payment_config.clone(),
    ));
    let withdrawal_service = Arc::new(WithdrawalService::new(
        withdrawals.clone(),
        wallets.clone(),
        payout,
        sink.clone(),
        payment_config.clone(),
    ));
    let subscription_service = Arc::new(SubscriptionService::new(
        subscriptions.clone(),
        users.clone(),
        provider.clone(),
        sink.clone(),
        payment_config.clone(),
    ));
    let kyc_service = Arc::new(KycService::new(kyc.clone(), kyc_store));
    let risk_service = Arc::new(RiskService::new(
        payments.clone(),
        gift_transactions.clone(),
        withdrawals.clone(),
        wallets.clone(),
        users.clone(),
        audit.clone(),
        sink.clone(),
        payment_config.clone(),
    ));

    if config.seed_catalog {
        seed_catalog(&payment_config, packages.as_ref(), gifts.as_ref()).await?;
    }

    Ok(Arc::new(AppState {
        gift_limiter: RateLimiter::per_minute(config.gift_sends_per_minute),
        config: config.clone(),
        payment_config,
        users,
        packages,
        wallet_service,
        topup_service,
        settlement_service,
        gift_service,
        withdrawal_service,
        subscription_service,
        kyc_service,
        risk_service,
        provider,
        events,
    }))
}

/// Idempotent default catalog, mirroring the production seed: three
/// grossed-up packages and the stock gift list.
async fn seed_catalog(
    config: &PaymentConfig,
    packages: &dyn CoinPackageRepositoryTrait,
    gifts: &dyn GiftRepositoryTrait,
) -> anyhow::Result<()> {
    if packages.count()? == 0 {
        for target in [Decimal::from(100u32), Decimal::from(250u32), Decimal::from(500u32)] {
            let pricing = gross_topup_price(
                target,
                config.vat_rate,
                config.gateway_rate,
                config.gateway_fixed,
            )?;
            let coins = (target * Decimal::from(config.coins_per_etb))
                .to_u64()
                .unwrap_or(0);
            packages
                .create(CoinPackage {
                    id: String::new(),
                    name: format!("Top-up {target} ETB"),
                    target_net_etb: target,
                    coins,
                    base_etb: pricing.base_etb,
                    vat_etb: pricing.vat_etb,
                    price_total_etb: pricing.total_etb,
                    is_active: true,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                })
                .await?;
        }
        info!("seeded default coin packages");
    }

    if gifts.count()? == 0 {
        let catalog: [(&str, u64, &str); 8] = [
            ("Love Note", 10, "5.00"),
            ("Single Rose", 15, "7.50"),
            ("Heart Chocolate", 25, "12.50"),
            ("Cute Teddy", 40, "20.00"),
            ("Romantic Song", 50, "25.00"),
            ("Candlelight Dinner", 75, "37.50"),
            ("Bouquet of Roses", 120, "60.00"),
            ("Promise Ring", 350, "175.00"),
        ];
        for (name, coins, value) in catalog {
            gifts
                .create(Gift {
                    id: String::new(),
                    name: name.to_string(),
                    coins,
                    value_etb: value.parse()?,
                    is_active: true,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                })
                .await?;
        }
        info!("seeded default gift catalog");
    }

    Ok(())
}
