//! Product catalog
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE product_type AS ENUM ('landpage', 'training', 'other');
//! CREATE TYPE product_status AS ENUM ('active', 'inactive');
//!
//! CREATE TABLE products (
//!     id BIGSERIAL PRIMARY KEY,
//!     name VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     type product_type NOT NULL,
//!     price BIGINT NOT NULL CHECK (price >= 0),
//!     features JSONB NOT NULL DEFAULT '[]'::jsonb,
//!     status product_status NOT NULL DEFAULT 'active',
//!     access_days INTEGER,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Prices are integer cents. `features` keeps the order the admin entered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

/// What a product unlocks once paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Landing page builder access
    Landpage,

    /// Training catalog access
    Training,

    /// Anything else
    Other,
}

impl ProductType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "landpage" => Some(ProductType::Landpage),
            "training" => Some(ProductType::Training),
            "other" => Some(ProductType::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Landpage => "landpage",
            ProductType::Training => "training",
            ProductType::Other => "other",
        }
    }
}

/// Whether a product can be ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            _ => None,
        }
    }
}

/// Product row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Price in cents
    pub price: i64,
    pub features: Json<Vec<String>>,
    pub status: ProductStatus,
    /// Days of access granted when an order is paid; `None` means lifetime
    pub access_days: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    pub price: i64,
    pub features: Vec<String>,
    pub status: ProductStatus,
    pub access_days: Option<i32>,
}

/// Partial product update
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub product_type: Option<ProductType>,
    pub price: Option<i64>,
    pub features: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
    pub access_days: Option<Option<i32>>,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, type, price, features, status, access_days, created_at, updated_at";

impl Product {
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, type, price, features, status, access_days)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.product_type)
        .bind(data.price)
        .bind(Json(data.features))
        .bind(data.status)
        .bind(data.access_days)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists products, optionally filtered by type and/or status
    pub async fn list(
        pool: &PgPool,
        product_type: Option<ProductType>,
        status: Option<ProductStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE ($1::product_type IS NULL OR type = $1)
               AND ($2::product_status IS NULL OR status = $2)
             ORDER BY price, id"
        ))
        .bind(product_type)
        .bind(status)
        .fetch_all(pool)
        .await
    }

    /// Products the user has at least one paid order for
    pub async fn list_purchased(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             WHERE EXISTS (
                 SELECT 1 FROM orders o
                 WHERE o.product_id = p.id AND o.user_id = $1 AND o.status = 'paid'
             )
             ORDER BY p.name"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE products SET updated_at = NOW()");

        if let Some(name) = data.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(product_type) = data.product_type {
            query.push(", type = ").push_bind(product_type);
        }
        if let Some(price) = data.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(features) = data.features {
            query.push(", features = ").push_bind(Json(features));
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(access_days) = data.access_days {
            query.push(", access_days = ").push_bind(access_days);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        query.build_query_as::<Product>().fetch_optional(pool).await
    }

    /// Deletes a product; false if it did not exist
    ///
    /// Products referenced by orders cannot be deleted (foreign key); callers
    /// should deactivate those instead.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_round_trip_strings() {
        for t in [ProductType::Landpage, ProductType::Training, ProductType::Other] {
            assert_eq!(ProductType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ProductType::parse("course"), None);
    }

    #[test]
    fn test_product_serializes_type_and_ordered_features() {
        let product = Product {
            id: 1,
            name: "Página Pro".to_string(),
            description: None,
            product_type: ProductType::Landpage,
            price: 4990,
            features: Json(vec!["Domínio".to_string(), "Leads".to_string()]),
            status: ProductStatus::Active,
            access_days: Some(365),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "landpage");
        assert_eq!(json["features"], serde_json::json!(["Domínio", "Leads"]));
        assert_eq!(json["status"], "active");
    }
}
