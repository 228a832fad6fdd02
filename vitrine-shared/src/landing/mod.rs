//! Landing page domain
//!
//! Everything needed to edit a landing page configuration without touching
//! HTTP or SQL:
//!
//! - `templates`: static catalog of page templates per objective
//! - `links`: WhatsApp/email link formatting and validation
//! - `slug`: digital name normalisation
//! - `config`: canonical editor state and its load/save mapping to the
//!   persisted row
//! - `sequence`: monotonic request tickets that drop stale responses
//! - `editor`: stateful editing session over a [`editor::ConfigBackend`]
//! - `export`: lead CSV export

pub mod config;
pub mod editor;
pub mod export;
pub mod links;
pub mod sequence;
pub mod slug;
pub mod templates;

pub use crate::models::landing_page::Objective;
