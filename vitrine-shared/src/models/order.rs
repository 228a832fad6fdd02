//! Orders
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE order_status AS ENUM ('pending', 'paid', 'canceled');
//!
//! CREATE TABLE orders (
//!     id BIGSERIAL PRIMARY KEY,
//!     product_id BIGINT NOT NULL REFERENCES products(id),
//!     user_id BIGINT NOT NULL REFERENCES users(id),
//!     landing_page_id BIGINT REFERENCES landing_pages(id),
//!     status order_status NOT NULL DEFAULT 'pending',
//!     amount BIGINT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Checkout happens outside this system. An admin marks an order paid, which
//! issues the product grant in the same transaction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::grant::{CreateGrant, ProductGrant};
use super::product::Product;

/// Order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment
    Pending,

    /// Payment confirmed, grant issued
    Paid,

    /// Abandoned or refused
    Canceled,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "canceled" => Some(OrderStatus::Canceled),
            _ => None,
        }
    }

    /// Only pending orders move, and only forward
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        matches!(
            (self, target),
            (OrderStatus::Pending, OrderStatus::Paid) | (OrderStatus::Pending, OrderStatus::Canceled)
        )
    }
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub landing_page_id: Option<i64>,
    pub status: OrderStatus,
    /// Amount in cents, copied from the product price at order time
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an order
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub product_id: i64,
    pub user_id: i64,
    pub landing_page_id: Option<i64>,
}

const ORDER_COLUMNS: &str =
    "id, product_id, user_id, landing_page_id, status, amount, created_at, updated_at";

/// Expiry of the grant issued for `product`, counted from `paid_at`
pub fn grant_expiry(product: &Product, paid_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    product
        .access_days
        .map(|days| paid_at + Duration::days(i64::from(days)))
}

impl Order {
    /// Creates a pending order priced at the product's current price
    ///
    /// Returns `None` if the product does not exist or is inactive.
    pub async fn create(pool: &PgPool, data: CreateOrder) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (product_id, user_id, landing_page_id, amount)
             SELECT p.id, $2, $3, p.price FROM products p
             WHERE p.id = $1 AND p.status = 'active'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(data.product_id)
        .bind(data.user_id)
        .bind(data.landing_page_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Cancels a pending order
    pub async fn cancel(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = 'canceled', updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Marks a pending order paid and issues the product grant atomically
    ///
    /// Returns `None` if the order is not pending anymore.
    pub async fn mark_paid(
        pool: &PgPool,
        id: i64,
        product: &Product,
    ) -> Result<Option<(Self, ProductGrant)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = 'paid', updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        let grant = ProductGrant::create(
            &mut *tx,
            CreateGrant {
                user_id: order.user_id,
                product_type: product.product_type,
                order_id: Some(order.id),
                expires_at: grant_expiry(product, order.updated_at),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some((order, grant)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::{ProductStatus, ProductType};
    use sqlx::types::Json;

    #[test]
    fn test_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_grant_expiry_from_access_days() {
        let now = Utc::now();
        let mut product = Product {
            id: 1,
            name: "Treinamentos".to_string(),
            description: None,
            product_type: ProductType::Training,
            price: 9900,
            features: Json(vec![]),
            status: ProductStatus::Active,
            access_days: Some(30),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(grant_expiry(&product, now), Some(now + Duration::days(30)));

        product.access_days = None;
        assert_eq!(grant_expiry(&product, now), None);
    }
}
