//! Database layer for Vitrine
//!
//! # Modules
//!
//! - `pool`: PostgreSQL connection pool with a startup health check
//! - `migrations`: Embedded migration runner
//!
//! Models live in the crate-level `models` module.

pub mod migrations;
pub mod pool;
