use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// Claims embedded in the access token issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user UUID
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

/// Extracted from the validated JWT — available via axum extractors.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Single authorization capability shared by the admin surface and the
    /// kiosk entry point.
    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_membership_is_exact() {
        let kiosk = AuthenticatedUser {
            user_id: Uuid::nil(),
            role: UserRole::Kitchen,
        };
        assert!(kiosk.has_any_role(&[UserRole::Kitchen, UserRole::Admin]));
        assert!(!kiosk.has_any_role(&[UserRole::Admin]));
        assert!(!kiosk.has_any_role(&[]));
    }
}
