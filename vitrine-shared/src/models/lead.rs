//! Leads captured by published landing pages
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE leads (
//!     id BIGSERIAL PRIMARY KEY,
//!     landing_page_id BIGINT NOT NULL REFERENCES landing_pages(id) ON DELETE CASCADE,
//!     name VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) NOT NULL,
//!     phone VARCHAR(32),
//!     type landing_objective NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::landing_page::Objective;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: i64,
    pub landing_page_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Objective of the page that captured the lead
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub lead_type: Objective,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateLead {
    pub landing_page_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub lead_type: Objective,
}

impl Lead {
    pub async fn create(pool: &PgPool, data: CreateLead) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Lead>(
            "INSERT INTO leads (landing_page_id, name, email, phone, type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, landing_page_id, name, email, phone, type, created_at",
        )
        .bind(data.landing_page_id)
        .bind(data.name)
        .bind(data.email.to_lowercase())
        .bind(data.phone)
        .bind(data.lead_type)
        .fetch_one(pool)
        .await
    }

    /// Leads of every page owned by `user_id`, newest first
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: i64,
        lead_type: Option<Objective>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(
            "SELECT l.id, l.landing_page_id, l.name, l.email, l.phone, l.type, l.created_at
             FROM leads l
             JOIN landing_pages p ON p.id = l.landing_page_id
             WHERE p.user_id = $1
               AND ($2::landing_objective IS NULL OR l.type = $2)
             ORDER BY l.created_at DESC, l.id DESC",
        )
        .bind(user_id)
        .bind(lead_type)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_serializes_type_key() {
        let lead = Lead {
            id: 1,
            landing_page_id: 2,
            name: "Maria".to_string(),
            email: "maria@exemplo.com".to_string(),
            phone: None,
            lead_type: Objective::Consultant,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["type"], "consultant");
        assert!(json.get("lead_type").is_none());
    }
}
