//! Database models for Vitrine
//!
//! Each model owns its CRUD operations as associated functions taking a
//! `&PgPool`, mirroring one table (or one aggregate, for trainings).
//!
//! # Models
//!
//! - `user`: Accounts with `admin`/`user` roles
//! - `training`: Courses with modules, lessons and per-user progress
//! - `product`: Sellable products (landing pages, trainings, other)
//! - `order`: Purchases of products
//! - `grant`: Product access grants used by the access gate
//! - `landing_page`: Persisted landing page rows
//! - `lead`: Contacts captured by published landing pages

pub mod grant;
pub mod landing_page;
pub mod lead;
pub mod order;
pub mod product;
pub mod training;
pub mod user;
