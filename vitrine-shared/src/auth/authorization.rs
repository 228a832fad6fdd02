//! Role and ownership checks
//!
//! Admin routes require [`UserRole::Admin`]; landing pages and their leads
//! are visible only to their owner (or an admin).

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// Principal lacks the required role
    #[error("Insufficient permissions: requires {required:?}")]
    InsufficientRole { required: UserRole },

    /// Principal does not own the resource
    #[error("Not authorized to access this resource")]
    NotOwner,
}

/// Requires the administrator role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required: UserRole::Admin,
        })
    }
}

/// Requires that `auth` owns a resource belonging to `owner_id`
///
/// Administrators pass for every resource.
pub fn require_owner(auth: &AuthContext, owner_id: i64) -> Result<(), AuthzError> {
    if auth.user_id == owner_id || auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}
