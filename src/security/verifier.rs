//! Authorization gate consulted before repository mutations.

use super::rbac::{AccessControl, AccessResult, Permission, Role};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Allow/deny gate keyed on user id and operation name.
pub trait AuthorizationVerifier: Send + Sync {
    /// Validates that `user_id` may issue `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when the operation is denied.
    fn validate_user_operation(&self, user_id: &str, operation: &str) -> Result<()>;
}

/// Verifier that permits every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllVerifier;

impl AuthorizationVerifier for AllowAllVerifier {
    fn validate_user_operation(&self, _user_id: &str, _operation: &str) -> Result<()> {
        Ok(())
    }
}

/// Verifier backed by user role assignments and an [`AccessControl`] table.
///
/// Users without an assigned role are denied.
#[derive(Debug, Default)]
pub struct RoleBasedVerifier {
    access_control: AccessControl,
    assignments: RwLock<HashMap<String, Role>>,
}

impl RoleBasedVerifier {
    /// Creates a verifier with the default role table and no users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a verifier with a custom role table.
    #[must_use]
    pub fn with_access_control(access_control: AccessControl) -> Self {
        Self {
            access_control,
            assignments: RwLock::default(),
        }
    }

    /// Assigns a role to a user.
    #[must_use]
    pub fn with_user(self, user_id: &str, role: Role) -> Self {
        self.assign(user_id, role);
        self
    }

    /// Assigns (or replaces) a user's role.
    pub fn assign(&self, user_id: &str, role: Role) {
        if let Ok(mut assignments) = self.assignments.write() {
            assignments.insert(user_id.to_string(), role);
        }
    }

    /// Returns the role assigned to a user.
    #[must_use]
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.assignments
            .read()
            .ok()
            .and_then(|assignments| assignments.get(user_id).copied())
    }
}

impl AuthorizationVerifier for RoleBasedVerifier {
    fn validate_user_operation(&self, user_id: &str, operation: &str) -> Result<()> {
        let denied = || Error::Unauthorized {
            user_id: user_id.to_string(),
            operation: operation.to_string(),
        };

        let Some(role) = self.role_of(user_id) else {
            tracing::warn!(user_id, operation, "Denied operation for user with no role");
            return Err(denied());
        };

        let permission = Permission::for_operation(operation);
        match self.access_control.check_access(&role, &permission) {
            AccessResult::Granted => Ok(()),
            AccessResult::Denied(reason) => {
                tracing::warn!(user_id, operation, reason = %reason, "Denied operation");
                metrics::counter!("authorization_denials_total", "operation" => operation.to_string())
                    .increment(1);
                Err(denied())
            },
        }
    }
}
