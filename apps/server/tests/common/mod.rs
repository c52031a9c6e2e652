//! Shared fixtures for the HTTP tests: a stub-provider state on a
//! temporary database, plus request helpers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use amora_core::config::RiskConfig;
use amora_core::gifts::{Gift, GiftRepositoryTrait};
use amora_core::users::{NewUser, User, UserRepositoryTrait};
use amora_server::api::app_router;
use amora_server::config::{Config, ProviderMode};
use amora_server::{build_state, AppState};

pub struct TestApp {
    _tmp: TempDir,
    pub state: Arc<AppState>,
    pub router: Router,
}

pub fn test_config(tmp: &TempDir) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp
            .path()
            .join("amora-test.db")
            .to_str()
            .unwrap()
            .to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        backend_url: "http://localhost:8080".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        provider_mode: ProviderMode::Stub,
        chapa_base_url: "https://api.chapa.co/v1".to_string(),
        chapa_secret_key: "test-secret".to_string(),
        chapa_webhook_secret: "test-secret".to_string(),
        webhook_require_signature: false,
        kyc_encryption_key: [7u8; 32],
        kyc_storage_dir: tmp.path().join("kyc").to_str().unwrap().to_string(),
        kyc_legacy_plaintext: false,
        vat_rate: "0.15".parse().unwrap(),
        commission_rate: "0.25".parse().unwrap(),
        gateway_rate: "0.03".parse().unwrap(),
        gateway_fixed: "2.00".parse().unwrap(),
        coins_per_etb: 1,
        min_withdrawal_etb: "500".parse().unwrap(),
        max_daily_withdrawal_etb: "5000".parse().unwrap(),
        max_monthly_withdrawal_etb: "50000".parse().unwrap(),
        risk: RiskConfig::default(),
        gift_sends_per_minute: 10,
        perk_sweep_interval: Duration::from_secs(300),
        risk_sweep_interval: Duration::from_secs(600),
        dev_allow_activate: true,
        seed_catalog: true,
        debug: true,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp);
    tweak(&mut config);
    let state = build_state(&config).await.unwrap();
    let router = app_router(state.clone(), &config);
    TestApp {
        _tmp: tmp,
        state,
        router,
    }
}

impl TestApp {
    pub async fn create_user(&self, name: &str, is_admin: bool) -> (User, String) {
        let token = format!("token-{name}");
        let user = self
            .state
            .users
            .create(NewUser {
                email: format!("{name}@example.com"),
                first_name: name.to_string(),
                last_name: "Test".to_string(),
                phone: Some("0912345678".to_string()),
                api_token: token.clone(),
                is_admin,
            })
            .await
            .unwrap();
        (user, token)
    }

    /// Catalog fixture with the exact split-friendly numbers the
    /// scenarios use.
    pub async fn create_gift(&self, name: &str, coins: u64, value: Decimal) -> Gift {
        // The service state only exposes reads; go through a second
        // storage handle on the same database for fixtures.
        let pool = amora_storage_sqlite::create_pool(&self.state.config.db_path).unwrap();
        let writer = amora_storage_sqlite::spawn_writer((*pool).clone());
        let gifts = amora_storage_sqlite::gifts::GiftRepository::new(pool, writer);
        gifts
            .create(Gift {
                id: String::new(),
                name: name.to_string(),
                coins,
                value_etb: value,
                is_active: true,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            })
            .await
            .unwrap()
    }

    /// Hand-crafts wallet balances for scenarios that start mid-life.
    pub async fn set_wallet(&self, user_id: &str, coins: i64, balance: Decimal, kyc_level: i32) {
        use amora_core::wallets::WalletRepositoryTrait;
        use diesel::prelude::*;

        // Make sure the row exists first.
        let pool = amora_storage_sqlite::create_pool(&self.state.config.db_path).unwrap();
        let writer = amora_storage_sqlite::spawn_writer((*pool).clone());
        let wallets = amora_storage_sqlite::wallets::WalletRepository::new(pool.clone(), writer);
        wallets.get_or_create(user_id).await.unwrap();

        use amora_storage_sqlite::schema::wallets as wallets_table;
        let mut conn = amora_storage_sqlite::get_connection(&pool).unwrap();
        diesel::update(wallets_table::table.filter(wallets_table::user_id.eq(user_id)))
            .set((
                wallets_table::coin_balance.eq(coins),
                wallets_table::balance_etb.eq(balance.to_string()),
                wallets_table::kyc_level.eq(kyc_level),
            ))
            .execute(&mut conn)
            .unwrap();
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn ban_wallet(&self, user_id: &str) {
        use amora_core::wallets::WalletRepositoryTrait;
        let pool = amora_storage_sqlite::create_pool(&self.state.config.db_path).unwrap();
        let writer = amora_storage_sqlite::spawn_writer((*pool).clone());
        let wallets = amora_storage_sqlite::wallets::WalletRepository::new(pool, writer);
        wallets.set_banned(user_id, true).await.unwrap();
    }

    /// Multipart KYC submission with tiny fixture blobs.
    pub async fn post_kyc_multipart(&self, token: &str, doc_type: &str) -> (StatusCode, Value) {
        const BOUNDARY: &str = "amora-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"doc_type\"\r\n\r\n{doc_type}\r\n"
            )
            .as_bytes(),
        );
        for (name, contents) in [("document", "fake id scan"), ("selfie", "fake selfie")] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.jpg\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/kyc/submit/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request("POST", path, token, Some(body)).await
    }
}
