//! Product catalog and admin CRUD
//!
//! Users only ever see active products. Prices are integer cents.

use super::{access::parse_product_type, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;
use vitrine_shared::{
    auth::middleware::AuthContext,
    models::product::{CreateProduct, Product, ProductStatus, ProductType, UpdateProduct},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Informe o nome do produto"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(rename = "type")]
    pub product_type: String,

    #[validate(range(min = 0, message = "O preço não pode ser negativo"))]
    pub price: i64,

    #[serde(default)]
    pub features: Vec<String>,

    pub status: Option<String>,

    #[validate(range(min = 1, message = "Dias de acesso devem ser positivos"))]
    pub access_days: Option<i32>,
}

/// Partial update; `description`/`access_days` set to `null` clear the value
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Informe o nome do produto"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(rename = "type")]
    pub product_type: Option<String>,

    #[validate(range(min = 0, message = "O preço não pode ser negativo"))]
    pub price: Option<i64>,

    pub features: Option<Vec<String>>,

    pub status: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub access_days: Option<Option<i32>>,
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`)
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_status(value: &str) -> ApiResult<ProductStatus> {
    ProductStatus::parse(value).ok_or_else(|| ApiError::BadRequest("Status inválido".to_string()))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Produto não encontrado".to_string())
}

/// `GET /landpage/products`
pub async fn list_landpage_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products =
        Product::list(&state.db, Some(ProductType::Landpage), Some(ProductStatus::Active)).await?;
    Ok(Json(products))
}

/// `GET /user/products/available`
pub async fn list_available(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = Product::list(&state.db, None, Some(ProductStatus::Active)).await?;
    Ok(Json(products))
}

/// `GET /user/products/my-products`: products with a paid order
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = Product::list_purchased(&state.db, auth.user_id).await?;
    Ok(Json(products))
}

/// `GET /user/products/:id`; inactive products are hidden from non-admins
pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .filter(|p| p.status == ProductStatus::Active || auth.is_admin())
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

pub async fn admin_list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(Product::list(&state.db, None, None).await?))
}

pub async fn admin_create(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    req.validate()?;

    let product_type = parse_product_type(&req.product_type)?;
    let status = req
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .unwrap_or(ProductStatus::Active);

    let product = Product::create(
        &state.db,
        CreateProduct {
            name: req.name,
            description: req.description,
            product_type,
            price: req.price,
            features: req.features,
            status,
            access_days: req.access_days,
        },
    )
    .await?;

    tracing::info!(product_id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    req.validate()?;

    let update = UpdateProduct {
        name: req.name,
        description: req.description,
        product_type: req.product_type.as_deref().map(parse_product_type).transpose()?,
        price: req.price,
        features: req.features,
        status: req.status.as_deref().map(parse_status).transpose()?,
        access_days: req.access_days,
    };

    let product = Product::update(&state.db, id, update)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

/// Products with orders cannot be deleted (409); deactivate them instead
pub async fn admin_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !Product::delete(&state.db, id).await? {
        return Err(not_found());
    }

    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(MessageResponse::ok("Produto removido")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"description": null, "price": 990}"#).unwrap();
        assert_eq!(req.description, Some(None));
        assert_eq!(req.access_days, None);
        assert_eq!(req.price, Some(990));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name": "", "type": "landpage", "price": -1}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn test_parse_status() {
        assert!(parse_status("archived").is_err());
    }
}
