//! End-to-end tests against PostgreSQL
//!
//! Skipped unless `DATABASE_URL` points at a disposable database; each test
//! creates its own users, so they can share one.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, expect_status, unique_slug, TestContext};
use serde_json::{json, Value};

macro_rules! context_or_skip {
    () => {
        match TestContext::new().await {
            Some(ctx) => ctx,
            None => {
                eprintln!("DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}

async fn create_product(ctx: &TestContext, product_type: &str, access_days: Option<i32>) -> i64 {
    let body = expect_status(
        ctx.admin(
            "POST",
            "/admin/products",
            Some(json!({
                "name": format!("Plano {product_type}"),
                "type": product_type,
                "price": 4990,
                "features": ["Suporte por e-mail"],
                "access_days": access_days,
            })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    body["id"].as_i64().expect("product id")
}

/// Orders and pays `product_id` for the context's user
async fn purchase(ctx: &TestContext, product_id: i64) -> Value {
    let order = expect_status(
        ctx.user("POST", "/user/orders", Some(json!({ "product_id": product_id })))
            .await,
        StatusCode::CREATED,
    )
    .await;
    let order_id = order["id"].as_i64().expect("order id");

    expect_status(
        ctx.admin(
            "PATCH",
            &format!("/admin/orders/{order_id}/status"),
            Some(json!({ "status": "paid" })),
        )
        .await,
        StatusCode::OK,
    )
    .await
}

#[tokio::test]
async fn test_paid_order_grants_access_once() {
    let ctx = context_or_skip!();
    let product_id = create_product(&ctx, "landpage", Some(30)).await;

    let before = expect_status(ctx.user("GET", "/user/access/landpage", None).await, StatusCode::OK).await;
    assert_eq!(before["has_access"], false);

    let paid = purchase(&ctx, product_id).await;
    assert_eq!(paid["order"]["status"], "paid");
    assert_eq!(paid["grant"]["product_type"], "landpage");
    assert!(paid["grant"]["expires_at"].is_string());

    let after = expect_status(ctx.user("GET", "/user/access/landpage", None).await, StatusCode::OK).await;
    assert_eq!(after["has_access"], true);

    let order_id = paid["order"]["id"].as_i64().expect("order id");
    let again = ctx
        .admin(
            "PATCH",
            &format!("/admin/orders/{order_id}/status"),
            Some(json!({ "status": "canceled" })),
        )
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_landing_page_requires_grant() {
    let ctx = context_or_skip!();

    let response = ctx
        .user(
            "POST",
            "/landpages",
            Some(json!({ "digital_name": unique_slug("sem-acesso"), "objective": "client" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_landing_page_lifecycle() {
    let ctx = context_or_skip!();
    let product_id = create_product(&ctx, "landpage", None).await;
    purchase(&ctx, product_id).await;

    let slug = unique_slug("consultora");
    let page = expect_status(
        ctx.user(
            "POST",
            "/landpages",
            Some(json!({ "digital_name": slug, "objective": "consultant", "template_id": "mentor" })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let page_id = page["id"].as_i64().expect("page id");
    assert_eq!(page["published"], false);
    assert_eq!(page["template_id"], "mentor");

    // Unpublished pages are invisible
    let hidden = ctx.user("GET", &format!("/public/landpages/{slug}"), None).await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

    let saved = expect_status(
        ctx.user(
            "PUT",
            &format!("/landpages/{page_id}/config"),
            Some(json!({
                "published": true,
                "content": { "consultant": { "name": "Ana Souza" } },
                "integrations": { "whatsappNumber": "(48) 98888-7777" },
                "consultant_name": "ignored legacy value",
            })),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(saved["published"], true);
    assert_eq!(saved["consultant_name"], "Ana Souza");
    assert_eq!(saved["whatsapp_link"], "https://wa.me/48988887777");

    let public = expect_status(
        ctx.user("GET", &format!("/public/landpages/{slug}"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(
        public["url"],
        format!("https://vitrine.test/seja-consultor/{slug}")
    );
    assert_eq!(public["config"]["content"]["consultant"]["name"], "Ana Souza");

    expect_status(
        ctx.user(
            "POST",
            &format!("/public/landpages/{slug}/leads"),
            Some(json!({ "name": "João Lima", "email": "Joao@Example.com", "phone": "48 3333-2222" })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    let leads = expect_status(
        ctx.user("GET", "/landpage/leads?type=consultant", None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(leads[0]["email"], "joao@example.com");
    assert_eq!(leads[0]["type"], "consultant");

    let export = ctx.user("GET", "/landpage/leads/export?type=all", None).await;
    assert_eq!(export.status(), StatusCode::OK);
    assert!(export.headers()["content-disposition"]
        .to_str()
        .expect("ascii header")
        .starts_with("attachment; filename=\"leads-"));
    let csv = String::from_utf8(body_bytes(export).await).expect("utf-8 csv");
    assert!(csv.starts_with("Nome,Email,Telefone,Tipo,Data"));
    assert!(csv.contains("João Lima,joao@example.com,48 3333-2222,Consultor,"));
}

#[tokio::test]
async fn test_publishing_incomplete_page_is_rejected() {
    let ctx = context_or_skip!();
    let product_id = create_product(&ctx, "landpage", None).await;
    purchase(&ctx, product_id).await;

    let page = expect_status(
        ctx.user(
            "POST",
            "/landpages",
            Some(json!({ "digital_name": unique_slug("loja"), "objective": "client" })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let page_id = page["id"].as_i64().expect("page id");

    let body = expect_status(
        ctx.user(
            "PUT",
            &format!("/landpages/{page_id}/config"),
            Some(json!({
                "published": true,
                "content": { "headline": "  " },
            })),
        )
        .await,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert_eq!(body["details"][0]["field"], "content.headline");

    // Links are validated on draft saves too
    let body = expect_status(
        ctx.user(
            "PUT",
            &format!("/landpages/{page_id}/config"),
            Some(json!({
                "content": { "headline": "Nova loja" },
                "integrations": { "emailLink": "not a url" },
            })),
        )
        .await,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert_eq!(body["details"][0]["field"], "integrations.emailLink");

    // Nothing was written
    let stored = expect_status(
        ctx.user("GET", &format!("/landpages/{page_id}/config"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(stored["published"], false);
    assert_ne!(stored["content"]["headline"], "Nova loja");
}

#[tokio::test]
async fn test_other_users_page_is_forbidden() {
    let ctx = context_or_skip!();
    let product_id = create_product(&ctx, "landpage", None).await;
    purchase(&ctx, product_id).await;

    let page = expect_status(
        ctx.user(
            "POST",
            "/landpages",
            Some(json!({ "digital_name": unique_slug("privada"), "objective": "client" })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let page_id = page["id"].as_i64().expect("page id");

    let other = common::send(
        &ctx.app,
        "GET",
        &format!("/landpages/{page_id}/config"),
        Some(&common::token_for(ctx.user.id + 100_000, vitrine_shared::models::user::UserRole::User)),
        None,
    )
    .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_training_categories_and_progress() {
    let ctx = context_or_skip!();

    let training = expect_status(
        ctx.admin("POST", "/admin/trainings", Some(json!({ "title": "Vendas 101" }))).await,
        StatusCode::CREATED,
    )
    .await;
    let training_id = training["id"].as_i64().expect("training id");
    assert_eq!(training["status"], "draft");

    let module = expect_status(
        ctx.admin(
            "POST",
            &format!("/admin/trainings/{training_id}/modules"),
            Some(json!({ "title": "Fundamentos" })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(module["position"], 1);
    let module_id = module["id"].as_i64().expect("module id");

    let mut lesson_ids = Vec::new();
    for title in ["Abertura", "Prospecção"] {
        let lesson = expect_status(
            ctx.admin(
                "POST",
                &format!("/admin/modules/{module_id}/lessons"),
                Some(json!({ "title": title })),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;
        lesson_ids.push(lesson["id"].as_i64().expect("lesson id"));
    }

    expect_status(
        ctx.admin(
            "PATCH",
            &format!("/admin/trainings/{training_id}/status"),
            Some(json!({ "status": "published" })),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let ids = |list: &Value| -> Vec<i64> {
        list.as_array()
            .expect("array")
            .iter()
            .filter_map(|t| t["id"].as_i64())
            .collect()
    };

    let locked = expect_status(ctx.user("GET", "/user/trainings/locked", None).await, StatusCode::OK).await;
    assert!(ids(&locked).contains(&training_id));

    let tree = ctx.user("GET", &format!("/user/trainings/{training_id}"), None).await;
    assert_eq!(tree.status(), StatusCode::FORBIDDEN);

    let product_id = create_product(&ctx, "training", Some(365)).await;
    purchase(&ctx, product_id).await;

    let available =
        expect_status(ctx.user("GET", "/user/trainings/available", None).await, StatusCode::OK).await;
    assert!(ids(&available).contains(&training_id));

    expect_status(
        ctx.user("POST", &format!("/user/lessons/{}/complete", lesson_ids[0]), None).await,
        StatusCode::OK,
    )
    .await;

    let in_progress =
        expect_status(ctx.user("GET", "/user/trainings/in-progress", None).await, StatusCode::OK).await;
    let entry = in_progress
        .as_array()
        .expect("array")
        .iter()
        .find(|t| t["id"].as_i64() == Some(training_id))
        .expect("training listed in progress");
    assert_eq!(entry["progress_percent"], 50);

    let tree = expect_status(
        ctx.user("GET", &format!("/user/trainings/{training_id}"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(tree["modules"][0]["lessons"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_soft_deleted_training_is_gone() {
    let ctx = context_or_skip!();

    let training = expect_status(
        ctx.admin("POST", "/admin/trainings", Some(json!({ "title": "Descontinuado" }))).await,
        StatusCode::CREATED,
    )
    .await;
    let training_id = training["id"].as_i64().expect("training id");

    let module = expect_status(
        ctx.admin(
            "POST",
            &format!("/admin/trainings/{training_id}/modules"),
            Some(json!({ "title": "Antigo" })),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let module_id = module["id"].as_i64().expect("module id");

    expect_status(
        ctx.admin("DELETE", &format!("/admin/trainings/{training_id}"), None).await,
        StatusCode::OK,
    )
    .await;

    let lesson = ctx
        .admin(
            "POST",
            &format!("/admin/modules/{module_id}/lessons"),
            Some(json!({ "title": "Órfã" })),
        )
        .await;
    assert_eq!(lesson.status(), StatusCode::NOT_FOUND);

    let body = expect_status(
        ctx.admin(
            "PATCH",
            &format!("/admin/trainings/{training_id}/status"),
            Some(json!({ "status": "published" })),
        )
        .await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["message"], "Treinamento não encontrado");

    let again = ctx.admin("DELETE", &format!("/admin/trainings/{training_id}"), None).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_update() {
    let ctx = context_or_skip!();

    let profile = expect_status(
        ctx.user("PUT", "/user/profile", Some(json!({ "name": "Maria Clara", "avatar": "https://cdn.test/a.png" })))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(profile["name"], "Maria Clara");
    assert_eq!(profile["avatar"], "https://cdn.test/a.png");
    assert!(profile.get("password_hash").is_none());
}
