mod common;

use axum::http::StatusCode;

use common::spawn_app;

#[tokio::test]
async fn health_endpoints_work() {
    let app = spawn_app().await;

    let (status, body) = app.get("/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = app.get("/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn public_catalog_and_auth_gates() {
    let app = spawn_app().await;

    // Gift list and plans are public.
    let (status, gifts) = app.get("/api/gifts/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!gifts.as_array().unwrap().is_empty());

    let (status, plans) = app.get("/api/subscription-plans/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plans.as_array().unwrap().len(), 3);

    // Packages require a user token.
    let (status, _) = app.get("/api/coins/packages/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/coins/packages/", Some("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = app.create_user("pat", false).await;
    let (status, packages) = app.get("/api/coins/packages/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(packages.as_array().unwrap().len(), 3);

    // Admin surface needs the admin bit.
    let (status, _) = app.get("/api/admin/withdrawals/", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
