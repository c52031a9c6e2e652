//! REST surface.

mod admin;
mod coins;
mod gifts;
mod health;
mod kyc;
mod payments;
mod stream;
mod subscriptions;
mod wallet;
mod webhooks;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth;
use crate::config::Config;
use crate::main_lib::AppState;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let public = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/api/gifts/", get(gifts::list_gifts))
        .route("/api/subscription-plans/", get(subscriptions::list_plans))
        .route("/api/banks/", get(payments::list_banks))
        .route(
            "/webhooks/chapa/",
            get(webhooks::chapa_webhook_get).post(webhooks::chapa_webhook_post),
        );

    let user = Router::new()
        .route("/api/coins/packages/", get(coins::list_packages))
        .route("/api/coins/topup/", post(coins::create_topup))
        .route("/api/payments/{id}/receipt/", get(payments::get_receipt))
        .route("/api/gifts/send/", post(gifts::send_gift))
        .route("/api/wallet/", get(wallet::get_wallet))
        .route("/api/wallet/withdraw/", post(wallet::create_withdrawal))
        .route("/api/kyc/submit/", post(kyc::submit))
        .route("/api/subscriptions/subscribe/", post(subscriptions::subscribe))
        .route("/api/subscriptions/activate/", post(subscriptions::activate))
        .route("/api/events/stream", get(stream::stream_events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    let admin = Router::new()
        .route("/api/admin/withdrawals/", get(admin::list_withdrawals))
        .route(
            "/api/admin/withdrawals/{id}/approve",
            post(admin::approve_withdrawal),
        )
        .route(
            "/api/admin/withdrawals/{id}/reject",
            post(admin::reject_withdrawal),
        )
        .route("/api/admin/kyc/", get(admin::list_kyc))
        .route("/api/admin/kyc/{id}/review", post(admin::review_kyc))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .merge(public)
        .merge(user)
        .merge(admin)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
