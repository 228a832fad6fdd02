//! Orders
//!
//! Users create pending orders; payment is confirmed by an admin through
//! `PATCH /admin/orders/:id/status`, which issues the product grant.

use super::Pagination;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vitrine_shared::{
    auth::{authorization::require_owner, middleware::AuthContext},
    models::{
        grant::ProductGrant,
        landing_page::LandingPageRecord,
        order::{CreateOrder, Order, OrderStatus},
        product::{Product, ProductType},
    },
};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: i64,
    pub landing_page_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Status change result; `grant` is set when the order was just paid
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant: Option<ProductGrant>,
}

fn product_not_found() -> ApiError {
    ApiError::NotFound("Produto não encontrado".to_string())
}

async fn place_order(
    state: &AppState,
    auth: &AuthContext,
    req: CreateOrderRequest,
) -> ApiResult<Order> {
    if let Some(page_id) = req.landing_page_id {
        let page = LandingPageRecord::find_by_id(&state.db, page_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Página não encontrada".to_string()))?;
        require_owner(auth, page.user_id)?;
    }

    let order = Order::create(
        &state.db,
        CreateOrder {
            product_id: req.product_id,
            user_id: auth.user_id,
            landing_page_id: req.landing_page_id,
        },
    )
    .await?
    .ok_or_else(product_not_found)?;

    tracing::info!(
        order_id = order.id,
        user_id = auth.user_id,
        product_id = order.product_id,
        amount = order.amount,
        "Order created"
    );

    Ok(order)
}

/// `POST /user/orders`
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = place_order(&state, &auth, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `POST /landpage/orders`: only landing page products are accepted here
pub async fn create_landpage_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let product = Product::find_by_id(&state.db, req.product_id)
        .await?
        .ok_or_else(product_not_found)?;

    if product.product_type != ProductType::Landpage {
        return Err(ApiError::BadRequest(
            "Este produto não é um plano de landing page".to_string(),
        ));
    }

    let order = place_order(&state, &auth, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(Order::list_by_user(&state.db, auth.user_id).await?))
}

pub async fn admin_list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = Order::list(&state.db, page.limit(), page.offset()).await?;
    Ok(Json(orders))
}

/// `PATCH /admin/orders/:id/status`
///
/// # Errors
///
/// - `400`: unknown status
/// - `404`: order missing
/// - `409`: transition not allowed (only pending orders move)
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Json<OrderStatusResponse>> {
    let target = OrderStatus::parse(&req.status)
        .ok_or_else(|| ApiError::BadRequest("Status inválido".to_string()))?;

    let order = Order::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pedido não encontrado".to_string()))?;

    if !order.status.can_transition_to(target) {
        return Err(transition_conflict());
    }

    let response = match target {
        OrderStatus::Paid => {
            let product = Product::find_by_id(&state.db, order.product_id)
                .await?
                .ok_or_else(product_not_found)?;

            let (order, grant) = Order::mark_paid(&state.db, id, &product)
                .await?
                .ok_or_else(transition_conflict)?;

            tracing::info!(
                order_id = order.id,
                user_id = order.user_id,
                grant_id = grant.id,
                product_type = product.product_type.as_str(),
                "Order paid, grant issued"
            );

            OrderStatusResponse {
                order,
                grant: Some(grant),
            }
        }
        OrderStatus::Canceled => {
            let order = Order::cancel(&state.db, id)
                .await?
                .ok_or_else(transition_conflict)?;

            tracing::info!(order_id = order.id, "Order canceled");
            OrderStatusResponse { order, grant: None }
        }
        OrderStatus::Pending => return Err(transition_conflict()),
    };

    Ok(Json(response))
}

fn transition_conflict() -> ApiError {
    ApiError::Conflict("Transição de status não permitida".to_string())
}
