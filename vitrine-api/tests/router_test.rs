//! Router tests that need no database
//!
//! Every request here is answered before a query runs: auth failures,
//! malformed input and the static template catalog.

mod common;

use axum::http::StatusCode;
use common::{expect_status, offline_app, send, token_for};
use serde_json::json;
use vitrine_shared::models::user::UserRole;

#[tokio::test]
async fn test_user_routes_require_token() {
    let app = offline_app();

    for uri in ["/user/profile", "/landpages", "/landpage/leads", "/user/trainings/locked"] {
        let response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = offline_app();
    let body = expect_status(
        send(&app, "GET", "/user/profile", Some("not.a.jwt"), None).await,
        StatusCode::UNAUTHORIZED,
    )
    .await;

    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = offline_app();
    let token = token_for(42, UserRole::User);

    let body = expect_status(
        send(&app, "GET", "/admin/orders", Some(&token), None).await,
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(body["message"], "Acesso restrito a administradores");
}

#[tokio::test]
async fn test_training_status_outside_allowed_set() {
    let app = offline_app();
    let token = token_for(1, UserRole::Admin);

    let body = expect_status(
        send(
            &app,
            "PATCH",
            "/admin/trainings/5/status",
            Some(&token),
            Some(json!({ "status": "archived" })),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;

    assert_eq!(body["message"], "Status inválido");
}

#[tokio::test]
async fn test_order_status_outside_allowed_set() {
    let app = offline_app();
    let token = token_for(1, UserRole::Admin);

    let response = send(
        &app,
        "PATCH",
        "/admin/orders/9/status",
        Some(&token),
        Some(json!({ "status": "refunded" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_templates_by_objective() {
    let app = offline_app();
    let token = token_for(3, UserRole::User);

    let client = expect_status(
        send(&app, "GET", "/landpages/templates/client", Some(&token), None).await,
        StatusCode::OK,
    )
    .await;
    let ids: Vec<&str> = client
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["essencial", "video"]);

    let consultant = expect_status(
        send(&app, "GET", "/landpages/templates/consultant", Some(&token), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(
        consultant[0]["defaultContent"]["consultant"]["role"],
        "Consultor(a) independente"
    );

    let unknown = expect_status(
        send(&app, "GET", "/landpages/templates/partner", Some(&token), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(unknown, json!([]));
}

#[tokio::test]
async fn test_create_page_with_unusable_name() {
    let app = offline_app();
    let token = token_for(3, UserRole::User);

    let body = expect_status(
        send(
            &app,
            "POST",
            "/landpages",
            Some(&token),
            Some(json!({ "digital_name": "!!!", "objective": "client" })),
        )
        .await,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;

    assert_eq!(body["details"][0]["field"], "digitalName");
}

#[tokio::test]
async fn test_lead_export_rejects_unknown_type() {
    let app = offline_app();
    let token = token_for(3, UserRole::User);

    let response = send(&app, "GET", "/landpage/leads/export?type=vip", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_access_check_rejects_unknown_product_type() {
    let app = offline_app();
    let token = token_for(3, UserRole::User);

    let body = expect_status(
        send(&app, "GET", "/user/access/curso", Some(&token), None).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["message"], "Tipo de produto inválido");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = offline_app();
    let response = send(&app, "GET", "/nowhere", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = offline_app();
    let response = send(&app, "GET", "/user/profile", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("x-frame-options"));
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let app = offline_app();
    let body = expect_status(send(&app, "GET", "/health", None, None).await, StatusCode::OK).await;

    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}
