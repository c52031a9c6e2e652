//! Shared fixtures for the ledger tests.

use std::sync::Arc;

use diesel::prelude::*;
use rust_decimal::Decimal;
use tempfile::TempDir;

use amora_core::gifts::Gift;
use amora_core::payments::CoinPackage;
use amora_core::users::{NewUser, User, UserRepositoryTrait};
use amora_storage_sqlite::audit::AuditLogRepository;
use amora_storage_sqlite::gifts::{GiftRepository, GiftTransactionRepository};
use amora_storage_sqlite::kyc::KycRepository;
use amora_storage_sqlite::payments::{CoinPackageRepository, PaymentRepository};
use amora_storage_sqlite::schema::wallets;
use amora_storage_sqlite::subscriptions::SubscriptionRepository;
use amora_storage_sqlite::users::UserRepository;
use amora_storage_sqlite::utils::dec_to_text;
use amora_storage_sqlite::wallets::WalletRepository;
use amora_storage_sqlite::withdrawals::WithdrawalRepository;
use amora_storage_sqlite::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};

pub struct TestStore {
    _tmp: TempDir,
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub users: UserRepository,
    pub wallets: WalletRepository,
    pub packages: CoinPackageRepository,
    pub payments: PaymentRepository,
    pub gifts: GiftRepository,
    pub gift_transactions: GiftTransactionRepository,
    pub withdrawals: WithdrawalRepository,
    pub kyc: KycRepository,
    pub subscriptions: SubscriptionRepository,
    pub audit: AuditLogRepository,
}

pub async fn setup() -> TestStore {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ledger.db");
    let pool = create_pool(db_path.to_str().unwrap()).unwrap();
    run_migrations(&pool).unwrap();
    let writer = spawn_writer((*pool).clone());

    TestStore {
        users: UserRepository::new(pool.clone(), writer.clone()),
        wallets: WalletRepository::new(pool.clone(), writer.clone()),
        packages: CoinPackageRepository::new(pool.clone(), writer.clone()),
        payments: PaymentRepository::new(pool.clone(), writer.clone()),
        gifts: GiftRepository::new(pool.clone(), writer.clone()),
        gift_transactions: GiftTransactionRepository::new(pool.clone(), writer.clone()),
        withdrawals: WithdrawalRepository::new(pool.clone(), writer.clone()),
        kyc: KycRepository::new(pool.clone(), writer.clone()),
        subscriptions: SubscriptionRepository::new(pool.clone(), writer.clone()),
        audit: AuditLogRepository::new(pool.clone(), writer.clone()),
        pool,
        writer,
        _tmp: tmp,
    }
}

pub async fn seed_user(store: &TestStore, name: &str) -> User {
    store
        .users
        .create(NewUser {
            email: format!("{name}@example.com"),
            first_name: name.to_string(),
            last_name: "Test".to_string(),
            phone: Some("0912345678".to_string()),
            api_token: format!("token-{name}"),
            is_admin: false,
        })
        .await
        .unwrap()
}

/// Hand-crafts wallet balances for scenarios that start mid-life
/// (e.g. a creator who already earned 1200 ETB).
pub fn set_wallet(
    store: &TestStore,
    user_id: &str,
    coins: i64,
    balance: Decimal,
    kyc_level: i32,
) {
    use amora_storage_sqlite::get_connection;
    let mut conn = get_connection(&store.pool).unwrap();
    diesel::update(wallets::table.filter(wallets::user_id.eq(user_id)))
        .set((
            wallets::coin_balance.eq(coins),
            wallets::balance_etb.eq(dec_to_text(balance)),
            wallets::kyc_level.eq(kyc_level),
        ))
        .execute(&mut conn)
        .unwrap();
}

pub fn rose_gift() -> Gift {
    Gift {
        id: String::new(),
        name: "Rose".to_string(),
        coins: 100,
        value_etb: Decimal::new(10000, 2),
        is_active: true,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

pub fn topup_package() -> CoinPackage {
    CoinPackage {
        id: String::new(),
        name: "Top-up 100 ETB".to_string(),
        target_net_etb: Decimal::new(10000, 2),
        coins: 100,
        base_etb: Decimal::new(10000, 2),
        vat_etb: Decimal::new(1500, 2),
        price_total_etb: Decimal::new(12062, 2),
        is_active: true,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}
