//! Custom middleware
//!
//! - `security`: response security headers

pub mod security;
