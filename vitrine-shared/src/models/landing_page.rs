//! Landing pages
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE landing_objective AS ENUM ('client', 'consultant');
//!
//! CREATE TABLE landing_pages (
//!     id BIGSERIAL PRIMARY KEY,
//!     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     digital_name VARCHAR(60) NOT NULL UNIQUE,
//!     objective landing_objective NOT NULL,
//!     template_id VARCHAR(64) NOT NULL,
//!     published BOOLEAN NOT NULL DEFAULT FALSE,
//!     content JSONB, integrations JSONB, seo JSONB, pixels JSONB,
//!     whatsapp_number TEXT, whatsapp_link TEXT, email_link TEXT,
//!     consultant_name TEXT, consultant_role TEXT, consultant_message TEXT,
//!     consultant_photo TEXT, instagram_url TEXT, facebook_url TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! The nested JSONB sections are the source of truth. The flattened columns
//! are rewritten from them on every save so older readers keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::landing::config::{LandingPageConfig, LegacyColumns};

/// Audience a landing page is built for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "landing_objective", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// End customers
    #[default]
    Client,

    /// Prospective reseller consultants
    Consultant,
}

impl Objective {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(Objective::Client),
            "consultant" => Some(Objective::Consultant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::Client => "client",
            Objective::Consultant => "consultant",
        }
    }
}

/// Landing page row as stored and as returned by the config endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LandingPageRecord {
    pub id: i64,
    pub user_id: i64,
    pub digital_name: String,
    pub objective: Objective,
    pub template_id: String,
    pub published: bool,

    pub content: Option<Json<Value>>,
    pub integrations: Option<Json<Value>>,
    pub seo: Option<Json<Value>>,
    pub pixels: Option<Json<Value>>,

    pub whatsapp_number: Option<String>,
    pub whatsapp_link: Option<String>,
    pub email_link: Option<String>,
    pub consultant_name: Option<String>,
    pub consultant_role: Option<String>,
    pub consultant_message: Option<String>,
    pub consultant_photo: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const LANDING_PAGE_COLUMNS: &str = "id, user_id, digital_name, objective, template_id, published, \
     content, integrations, seo, pixels, \
     whatsapp_number, whatsapp_link, email_link, consultant_name, consultant_role, \
     consultant_message, consultant_photo, instagram_url, facebook_url, \
     created_at, updated_at";

/// Stores `""` as NULL so empty legacy columns stay distinguishable from data
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn section_json<T: Serialize>(section: &T) -> Result<Json<Value>, sqlx::Error> {
    serde_json::to_value(section)
        .map(Json)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl LandingPageRecord {
    /// Inserts a new page owned by `user_id` from a canonical configuration
    ///
    /// Fails with a unique violation on `landing_pages_digital_name_key` when
    /// the digital name is taken.
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        config: &LandingPageConfig,
    ) -> Result<Self, sqlx::Error> {
        let legacy = LegacyColumns::from_config(config);

        sqlx::query_as::<_, LandingPageRecord>(&format!(
            "INSERT INTO landing_pages (
                 user_id, digital_name, objective, template_id, published,
                 content, integrations, seo, pixels,
                 whatsapp_number, whatsapp_link, email_link, consultant_name, consultant_role,
                 consultant_message, consultant_photo, instagram_url, facebook_url
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING {LANDING_PAGE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&config.digital_name)
        .bind(config.objective)
        .bind(&config.template_id)
        .bind(config.published)
        .bind(section_json(&config.content)?)
        .bind(section_json(&config.integrations)?)
        .bind(section_json(&config.seo)?)
        .bind(section_json(&config.pixels)?)
        .bind(non_empty(legacy.whatsapp_number))
        .bind(non_empty(legacy.whatsapp_link))
        .bind(non_empty(legacy.email_link))
        .bind(non_empty(legacy.consultant_name))
        .bind(non_empty(legacy.consultant_role))
        .bind(non_empty(legacy.consultant_message))
        .bind(non_empty(legacy.consultant_photo))
        .bind(non_empty(legacy.instagram_url))
        .bind(non_empty(legacy.facebook_url))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LandingPageRecord>(&format!(
            "SELECT {LANDING_PAGE_COLUMNS} FROM landing_pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Published page by slug, for the public site
    pub async fn find_published(
        pool: &PgPool,
        digital_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LandingPageRecord>(&format!(
            "SELECT {LANDING_PAGE_COLUMNS} FROM landing_pages
             WHERE digital_name = $1 AND published = TRUE"
        ))
        .bind(digital_name)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, LandingPageRecord>(&format!(
            "SELECT {LANDING_PAGE_COLUMNS} FROM landing_pages
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Rewrites every editable column from a canonical configuration
    ///
    /// Returns `None` when the page does not exist.
    pub async fn save_config(
        pool: &PgPool,
        id: i64,
        config: &LandingPageConfig,
    ) -> Result<Option<Self>, sqlx::Error> {
        let legacy = LegacyColumns::from_config(config);

        sqlx::query_as::<_, LandingPageRecord>(&format!(
            "UPDATE landing_pages SET
                 digital_name = $2, objective = $3, template_id = $4, published = $5,
                 content = $6, integrations = $7, seo = $8, pixels = $9,
                 whatsapp_number = $10, whatsapp_link = $11, email_link = $12,
                 consultant_name = $13, consultant_role = $14, consultant_message = $15,
                 consultant_photo = $16, instagram_url = $17, facebook_url = $18,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {LANDING_PAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(&config.digital_name)
        .bind(config.objective)
        .bind(&config.template_id)
        .bind(config.published)
        .bind(section_json(&config.content)?)
        .bind(section_json(&config.integrations)?)
        .bind(section_json(&config.seo)?)
        .bind(section_json(&config.pixels)?)
        .bind(non_empty(legacy.whatsapp_number))
        .bind(non_empty(legacy.whatsapp_link))
        .bind(non_empty(legacy.email_link))
        .bind(non_empty(legacy.consultant_name))
        .bind(non_empty(legacy.consultant_role))
        .bind(non_empty(legacy.consultant_message))
        .bind(non_empty(legacy.consultant_photo))
        .bind(non_empty(legacy.instagram_url))
        .bind(non_empty(legacy.facebook_url))
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_strings() {
        assert_eq!(Objective::parse("client"), Some(Objective::Client));
        assert_eq!(Objective::parse("consultant"), Some(Objective::Consultant));
        assert_eq!(Objective::parse("Client"), None);
        assert_eq!(Objective::Consultant.as_str(), "consultant");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }

    #[test]
    fn test_record_json_keeps_nested_sections() {
        let json = serde_json::json!({
            "id": 3,
            "user_id": 1,
            "digital_name": "meu-site",
            "objective": "client",
            "template_id": "essencial",
            "published": false,
            "content": {"headline": "Olá"},
            "integrations": null,
            "consultant_name": "Ana",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        });

        let record: LandingPageRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.content.as_ref().map(|c| &c.0["headline"]), Some(&Value::from("Olá")));
        assert!(record.integrations.is_none());
        assert!(record.seo.is_none());
        assert_eq!(record.consultant_name.as_deref(), Some("Ana"));
    }
}
