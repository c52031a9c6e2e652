//! End-to-end scenarios over the HTTP surface with the stub provider
//! and payout adapter.

mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use common::spawn_app;

/// Top-up then webhook settlement, including an idempotent replay.
#[tokio::test]
async fn topup_webhook_settles_once() {
    let app = spawn_app().await;
    let (_, alice) = app.create_user("alice", false).await;

    // Pick the 100 ETB package from the seeded catalog.
    let (_, packages) = app.get("/api/coins/packages/", Some(&alice)).await;
    let package = packages
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Top-up 100 ETB")
        .unwrap();
    assert_eq!(package["coins"], 100);
    // Grossing invariant: (100 + 15 + 2) / 0.97 -> 120.62
    assert_eq!(package["priceTotalEtb"].as_f64().unwrap(), 120.62);

    let (status, checkout) = app
        .post(
            "/api/coins/topup/",
            Some(&alice),
            json!({ "packageId": package["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_ref = checkout["txRef"].as_str().unwrap().to_string();
    let payment_id = checkout["paymentId"].as_str().unwrap().to_string();
    assert!(checkout["checkoutUrl"].as_str().unwrap().contains(&tx_ref));

    // Provider callback; the stub verification settles it.
    let (status, body) = app
        .post(
            "/webhooks/chapa/",
            None,
            json!({ "tx_ref": tx_ref, "status": "success" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, wallet) = app.get("/api/wallet/", Some(&alice)).await;
    assert_eq!(wallet["coinBalance"], 100);

    // Replay: acknowledged, no double credit.
    let (status, body) = app
        .post(
            "/webhooks/chapa/",
            None,
            json!({ "trx_ref": tx_ref, "status": "success" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["idempotent"], true);

    let (_, wallet) = app.get("/api/wallet/", Some(&alice)).await;
    assert_eq!(wallet["coinBalance"], 100);

    // Exactly one receipt, readable by the owner only.
    let (status, receipt) = app
        .get(&format!("/api/payments/{payment_id}/receipt/"), Some(&alice))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(receipt["providerRef"].as_str().unwrap().contains("STUB"));

    let (_, bob) = app.create_user("bob", false).await;
    let (status, _) = app
        .get(&format!("/api/payments/{payment_id}/receipt/"), Some(&bob))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A failed-status callback is acknowledged without state change.
    let (status, body) = app
        .post(
            "/webhooks/chapa/",
            None,
            json!({ "tx_ref": "coin-unknown-ref", "status": "failed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ignored"], true);

    // Missing tx_ref is a 400.
    let (status, _) = app
        .post("/webhooks/chapa/", None, json!({ "status": "success" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Scenario: Alice sends Bob a 100-coin Rose; Bob earns 75.00 ETB.
#[tokio::test]
async fn gift_happy_path_splits_value() {
    let app = spawn_app().await;
    let (alice_user, alice) = app.create_user("alice", false).await;
    let (bob_user, bob) = app.create_user("bob", false).await;

    let rose = app.create_gift("Rose", 100, dec!(100.00)).await;
    app.set_wallet(&alice_user.id, 100, dec!(0.00), 1).await;

    let (status, body) = app
        .post(
            "/api/gifts/send/",
            Some(&alice),
            json!({ "recipientId": bob_user.id, "giftId": rose.id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["coinsSpent"], json!(100));
    assert_eq!(body["creatorPayout"].as_f64().unwrap(), 75.0);

    let (_, alice_wallet) = app.get("/api/wallet/", Some(&alice)).await;
    assert_eq!(alice_wallet["coinBalance"], 0);

    let (_, bob_wallet) = app.get("/api/wallet/", Some(&bob)).await;
    assert_eq!(bob_wallet["balanceEtb"].as_f64().unwrap(), 75.0);
    assert_eq!(bob_wallet["recentGifts"].as_array().unwrap().len(), 1);

    // A second identical send has no coins to spend.
    let (status, _) = app
        .post(
            "/api/gifts/send/",
            Some(&alice),
            json!({ "recipientId": bob_user.id, "giftId": rose.id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Self-gifting is rejected.
    let (status, _) = app
        .post(
            "/api/gifts/send/",
            Some(&alice),
            json!({ "recipientId": alice_user.id, "giftId": rose.id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn banned_sender_cannot_gift() {
    let app = spawn_app().await;
    let (alice_user, alice) = app.create_user("alice", false).await;
    let (bob_user, _) = app.create_user("bob", false).await;

    let rose = app.create_gift("Rose", 100, dec!(100.00)).await;
    app.set_wallet(&alice_user.id, 500, dec!(0.00), 1).await;
    app.ban_wallet(&alice_user.id).await;

    let (status, _) = app
        .post(
            "/api/gifts/send/",
            Some(&alice),
            json!({ "recipientId": bob_user.id, "giftId": rose.id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gift_send_rate_limit_applies_per_user() {
    let app = common::spawn_app_with(|config| config.gift_sends_per_minute = 2).await;
    let (alice_user, alice) = app.create_user("alice", false).await;
    let (bob_user, _) = app.create_user("bob", false).await;

    let rose = app.create_gift("Rose", 100, dec!(100.00)).await;
    app.set_wallet(&alice_user.id, 1000, dec!(0.00), 1).await;

    let send = json!({ "recipientId": bob_user.id, "giftId": rose.id });
    for _ in 0..2 {
        let (status, _) = app.post("/api/gifts/send/", Some(&alice), send.clone()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = app.post("/api/gifts/send/", Some(&alice), send).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

/// Scenario: withdrawal lifecycle through review to payout, including
/// the KYC gate and the minimum boundary.
#[tokio::test]
async fn withdrawal_lifecycle_over_http() {
    let app = spawn_app().await;
    let (bob_user, bob) = app.create_user("bob", false).await;
    let (_, admin) = app.create_user("admin", true).await;

    app.set_wallet(&bob_user.id, 0, dec!(1200.00), 1).await;

    let withdraw = json!({
        "method": "CHAPA",
        "destination": "acc_987",
        "amountEtb": 600.0,
    });

    // KYC level 1 cannot withdraw.
    let (status, _) = app
        .post("/api/wallet/withdraw/", Some(&bob), withdraw.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.set_wallet(&bob_user.id, 0, dec!(1200.00), 2).await;

    // Below the minimum is rejected; the minimum itself is accepted.
    let (status, _) = app
        .post(
            "/api/wallet/withdraw/",
            Some(&bob),
            json!({ "method": "CHAPA", "destination": "acc_987", "amountEtb": 499.99 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .post("/api/wallet/withdraw/", Some(&bob), withdraw)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let withdrawal_id = created["withdrawalId"].as_str().unwrap().to_string();

    // Hold placed, balance untouched.
    let (_, wallet) = app.get("/api/wallet/", Some(&bob)).await;
    assert_eq!(wallet["holdEtb"].as_f64().unwrap(), 600.0);
    assert_eq!(wallet["balanceEtb"].as_f64().unwrap(), 1200.0);

    // Admin review queue sees it.
    let (status, pending) = app
        .get("/api/admin/withdrawals/?status=PENDING", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(pending
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w["id"] == json!(withdrawal_id)));

    // Approval triggers the stub payout and settles to PAID.
    let (status, body) = app
        .post(
            &format!("/api/admin/withdrawals/{withdrawal_id}/approve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PAID");

    let (_, wallet) = app.get("/api/wallet/", Some(&bob)).await;
    assert_eq!(wallet["balanceEtb"].as_f64().unwrap(), 600.0);
    assert_eq!(wallet["holdEtb"].as_f64().unwrap(), 0.0);
}

/// Scenario: rejection releases the hold and records the reason.
#[tokio::test]
async fn withdrawal_reject_releases_hold() {
    let app = spawn_app().await;
    let (carol_user, carol) = app.create_user("carol", false).await;
    let (_, admin) = app.create_user("admin", true).await;

    app.set_wallet(&carol_user.id, 0, dec!(800.00), 2).await;

    let (status, created) = app
        .post(
            "/api/wallet/withdraw/",
            Some(&carol),
            json!({ "method": "TELEBIRR", "destination": "msisdn_911", "amountEtb": 500.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let withdrawal_id = created["withdrawalId"].as_str().unwrap().to_string();

    let (_, wallet) = app.get("/api/wallet/", Some(&carol)).await;
    assert_eq!(wallet["holdEtb"].as_f64().unwrap(), 500.0);

    let (status, body) = app
        .post(
            &format!("/api/admin/withdrawals/{withdrawal_id}/reject"),
            Some(&admin),
            json!({ "reason": "Bad account" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REJECTED");

    let (_, wallet) = app.get("/api/wallet/", Some(&carol)).await;
    assert_eq!(wallet["holdEtb"].as_f64().unwrap(), 0.0);
    assert_eq!(wallet["balanceEtb"].as_f64().unwrap(), 800.0);

    // Terminal: approving a rejected request fails.
    let (status, _) = app
        .post(
            &format!("/api/admin/withdrawals/{withdrawal_id}/approve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Repeated withdrawals to one destination trip the risk engine, which
/// blocks further withdrawals until the window clears.
#[tokio::test]
async fn repeat_destination_trips_risk_block() {
    let app = spawn_app().await;
    let (fred_user, fred) = app.create_user("fred", false).await;

    app.set_wallet(&fred_user.id, 0, dec!(5000.00), 2).await;

    for _ in 0..3 {
        let (status, _) = app
            .post(
                "/api/wallet/withdraw/",
                Some(&fred),
                json!({ "method": "CHAPA", "destination": "acc_same", "amountEtb": 500.0 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let reasons = app
        .state
        .risk_service
        .evaluate_user(&fred_user.id)
        .await
        .unwrap();
    assert!(reasons
        .iter()
        .any(|r| r.starts_with("repeat_withdraw_destination:acc_same")));

    let (_, wallet) = app.get("/api/wallet/", Some(&fred)).await;
    assert_eq!(wallet["withdrawalsBlocked"], true);

    let (status, _) = app
        .post(
            "/api/wallet/withdraw/",
            Some(&fred),
            json!({ "method": "CHAPA", "destination": "acc_other", "amountEtb": 500.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// The rolling daily cap rejects the request that would cross it.
#[tokio::test]
async fn daily_withdrawal_cap_applies() {
    let app = spawn_app().await;
    let (gina_user, gina) = app.create_user("gina", false).await;

    app.set_wallet(&gina_user.id, 0, dec!(20000.00), 2).await;

    // Two 2500 requests to distinct destinations stay under the risk
    // rules but fill the 5000 daily cap.
    for destination in ["acc_a", "acc_b"] {
        let (status, _) = app
            .post(
                "/api/wallet/withdraw/",
                Some(&gina),
                json!({ "method": "CHAPA", "destination": destination, "amountEtb": 2500.0 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .post(
            "/api/wallet/withdraw/",
            Some(&gina),
            json!({ "method": "CHAPA", "destination": "acc_c", "amountEtb": 500.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("withdrawal limit exceeded"));
}

#[tokio::test]
async fn kyc_submit_review_unlocks_withdrawals() {
    let app = spawn_app().await;
    let (_, dina) = app.create_user("dina", false).await;
    let (_, admin) = app.create_user("admin", true).await;

    let (status, first) = app.post_kyc_multipart(&dina, "NID").await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    let submission_id = first["id"].as_str().unwrap().to_string();

    // A second submission while pending returns the same id.
    let (status, second) = app.post_kyc_multipart(&dina, "PASSPORT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["alreadyPending"], true);

    let (status, reviewed) = app
        .post(
            &format!("/api/admin/kyc/{submission_id}/review"),
            Some(&admin),
            json!({ "decision": "VERIFIED" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{reviewed}");
    assert_eq!(reviewed["status"], "VERIFIED");

    let (_, wallet) = app.get("/api/wallet/", Some(&dina)).await;
    assert_eq!(wallet["kycLevel"], 2);

    // Reviewing again is an invalid transition.
    let (status, _) = app
        .post(
            &format!("/api/admin/kyc/{submission_id}/review"),
            Some(&admin),
            json!({ "decision": "REJECTED" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn subscription_purchase_activates_via_webhook() {
    let app = spawn_app().await;
    let (_, eve) = app.create_user("eve", false).await;

    let (status, checkout) = app
        .post(
            "/api/subscriptions/subscribe/",
            Some(&eve),
            json!({ "plan": "BOOST" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{checkout}");
    let tx_ref = checkout["txRef"].as_str().unwrap().to_string();
    assert!(tx_ref.starts_with("sub-boost-"));

    let (status, body) = app
        .post(
            "/webhooks/chapa/",
            None,
            json!({ "tx_ref": tx_ref, "status": "success" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    // Replay activates nothing twice.
    let (status, body) = app
        .post(
            "/webhooks/chapa/",
            None,
            json!({ "tx_ref": tx_ref, "status": "success" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["idempotent"], true);
}
