//! Product access grants
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE product_grants (
//!     id BIGSERIAL PRIMARY KEY,
//!     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     product_type product_type NOT NULL,
//!     order_id BIGINT REFERENCES orders(id),
//!     expires_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Whether a grant is currently valid is decided by [`crate::access`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use super::product::ProductType;

/// An entitlement linking a user to a product type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductGrant {
    pub id: i64,
    pub user_id: i64,
    pub product_type: ProductType,
    pub order_id: Option<i64>,
    /// `None` means the grant never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a grant
#[derive(Debug, Clone)]
pub struct CreateGrant {
    pub user_id: i64,
    pub product_type: ProductType,
    pub order_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProductGrant {
    /// Inserts a grant; takes any executor so it can join an order transaction
    pub async fn create<'e, E>(executor: E, data: CreateGrant) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProductGrant>(
            "INSERT INTO product_grants (user_id, product_type, order_id, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, product_type, order_id, expires_at, created_at",
        )
        .bind(data.user_id)
        .bind(data.product_type)
        .bind(data.order_id)
        .bind(data.expires_at)
        .fetch_one(executor)
        .await
    }

    /// All grants of a user, expired ones included
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProductGrant>(
            "SELECT id, user_id, product_type, order_id, expires_at, created_at
             FROM product_grants WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
