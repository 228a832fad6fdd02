//! API route handlers, one module per resource
//!
//! - `health`: liveness and database check
//! - `auth`: register, login, token refresh
//! - `users`: own profile, admin user list
//! - `access`: product access gate
//! - `landpages`: landing page creation, templates, configuration, photo upload
//! - `public`: published pages and lead capture
//! - `leads`: lead listing and CSV export
//! - `products`: catalog and admin CRUD
//! - `orders`: purchases and admin status changes
//! - `trainings`: catalog by category, lesson progress, admin CRUD

pub mod access;
pub mod auth;
pub mod health;
pub mod landpages;
pub mod leads;
pub mod orders;
pub mod products;
pub mod public;
pub mod trainings;
pub mod users;

use serde::{Deserialize, Serialize};

/// Plain success body for mutations without a resource to return
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `?limit=&offset=` query, clamped to sane bounds
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
