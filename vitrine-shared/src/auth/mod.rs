//! Authentication and authorization utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and validation
//! - [`jwt`]: JWT token generation and validation
//! - [`middleware`]: Bearer-token extraction and the per-request `AuthContext`
//! - [`authorization`]: Role and ownership checks
//!
//! # Example
//!
//! ```no_run
//! use vitrine_shared::auth::password::{hash_password, verify_password};
//! use vitrine_shared::auth::jwt::{create_token, Claims, TokenType};
//! use vitrine_shared::models::user::UserRole;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("Senha@123")?;
//! assert!(verify_password("Senha@123", &hash)?);
//!
//! let claims = Claims::new(42, UserRole::User, TokenType::Access);
//! let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
