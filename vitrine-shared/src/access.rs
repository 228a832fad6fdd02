//! Product access gate
//!
//! A user may use a product type while at least one of their grants for it
//! has no expiry or expires in the future. Grants are re-read on every check.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::grant::ProductGrant;
use crate::models::product::ProductType;

/// Pure check over an already loaded set of grants
pub fn has_access(grants: &[ProductGrant], product_type: ProductType, now: DateTime<Utc>) -> bool {
    grants.iter().any(|grant| {
        grant.product_type == product_type && grant.expires_at.map_or(true, |expires| expires > now)
    })
}

/// Database-backed access checks
pub struct AccessGate;

impl AccessGate {
    pub async fn check(
        pool: &PgPool,
        user_id: i64,
        product_type: ProductType,
    ) -> Result<bool, sqlx::Error> {
        let grants = ProductGrant::list_by_user(pool, user_id).await?;
        let allowed = has_access(&grants, product_type, Utc::now());

        tracing::debug!(
            user_id = user_id,
            product_type = product_type.as_str(),
            allowed = allowed,
            "Access check"
        );

        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(product_type: ProductType, expires_at: Option<DateTime<Utc>>) -> ProductGrant {
        ProductGrant {
            id: 1,
            user_id: 7,
            product_type,
            order_id: None,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_grant_without_expiry_allows() {
        let now = Utc::now();
        assert!(has_access(&[grant(ProductType::Landpage, None)], ProductType::Landpage, now));
    }

    #[test]
    fn test_expired_grant_denies() {
        let now = Utc::now();
        let grants = [grant(ProductType::Training, Some(now - Duration::days(1)))];
        assert!(!has_access(&grants, ProductType::Training, now));
    }

    #[test]
    fn test_future_expiry_allows() {
        let now = Utc::now();
        let grants = [grant(ProductType::Training, Some(now + Duration::hours(1)))];
        assert!(has_access(&grants, ProductType::Training, now));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let grants = [grant(ProductType::Training, Some(now))];
        assert!(!has_access(&grants, ProductType::Training, now));
    }

    #[test]
    fn test_other_product_type_does_not_count() {
        let now = Utc::now();
        let grants = [grant(ProductType::Training, None)];
        assert!(!has_access(&grants, ProductType::Landpage, now));
        assert!(!has_access(&[], ProductType::Landpage, now));
    }

    #[test]
    fn test_any_valid_grant_is_enough() {
        let now = Utc::now();
        let grants = [
            grant(ProductType::Landpage, Some(now - Duration::days(30))),
            grant(ProductType::Landpage, Some(now + Duration::days(30))),
        ];
        assert!(has_access(&grants, ProductType::Landpage, now));
    }
}
