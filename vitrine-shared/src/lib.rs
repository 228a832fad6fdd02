//! # Vitrine Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the Vitrine API server and its clients.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migrations
//! - `access`: Product entitlement checks
//! - `landing`: Landing page templates, link validation and configuration merging

pub mod access;
pub mod auth;
pub mod db;
pub mod landing;
pub mod models;

/// Current version of the Vitrine shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
