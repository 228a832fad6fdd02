//! REST client for the Vitrine API
//!
//! Plays the part of the browser frontend: logs in, keeps the bearer token
//! and user in a [`SessionStore`], and backs the landing page
//! [`ConfigEditor`](vitrine_shared::landing::editor::ConfigEditor).
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitrine_client::{ApiClient, SessionStore};
//! use vitrine_shared::landing::editor::ConfigEditor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:8080")?
//!     .with_session(SessionStore::new("session.json"));
//! client.login("ana@example.com", "S3nha-forte").await?;
//!
//! let editor = ConfigEditor::new(Arc::new(client));
//! editor.load(12).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod session;

pub use client::{ApiClient, AuthSession, PublicPage, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use session::{Session, SessionStore, TOKEN_KEY, USER_KEY};
