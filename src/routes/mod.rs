pub mod admin;
pub mod auth;
pub mod health;
pub mod kiosk;
pub mod menu;
pub mod metrics;
pub mod orders;

use crate::error::AppError;
use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserRole;

/// Single role gate used by every protected handler.
pub fn require_any_role(user: &AuthenticatedUser, roles: &[UserRole]) -> Result<(), AppError> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
