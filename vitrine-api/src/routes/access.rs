//! `GET /user/access/:product_type`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vitrine_shared::{
    access::AccessGate,
    auth::middleware::AuthContext,
    models::product::ProductType,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessResponse {
    pub product_type: ProductType,
    pub has_access: bool,
}

pub(crate) fn parse_product_type(value: &str) -> ApiResult<ProductType> {
    ProductType::parse(value)
        .ok_or_else(|| ApiError::BadRequest("Tipo de produto inválido".to_string()))
}

/// Fails with 403 unless the user holds a valid grant for `product_type`
pub(crate) async fn require_access(
    state: &AppState,
    auth: &AuthContext,
    product_type: ProductType,
) -> ApiResult<()> {
    if AccessGate::check(&state.db, auth.user_id, product_type).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Você não tem acesso a este produto".to_string(),
        ))
    }
}

pub async fn check_access(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(product_type): Path<String>,
) -> ApiResult<Json<AccessResponse>> {
    let product_type = parse_product_type(&product_type)?;
    let has_access = AccessGate::check(&state.db, auth.user_id, product_type).await?;

    Ok(Json(AccessResponse {
        product_type,
        has_access,
    }))
}
