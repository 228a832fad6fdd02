//! # Vitrine API Server Library
//!
//! HTTP layer of the Vitrine platform: users, trainings, products, orders,
//! landing page configuration and leads.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error envelope and HTTP status mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
