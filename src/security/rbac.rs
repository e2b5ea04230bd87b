//! Role-based access control for governance operations.
//!
//! # Roles
//!
//! | Role | Description | Key Permissions |
//! |------|-------------|-----------------|
//! | `Admin` | Full system access | All permissions |
//! | `EngineHost` | Runs governance services | `RunService`, `RecordCompletion`, `ViewConfiguration` |
//! | `Steward` | Maintains engine configuration | `ManageEngines`, `ManageServices`, `RegisterServices` |
//! | `ReadOnly` | Read-only configuration access | `ViewConfiguration` |
//!
//! # Example
//!
//! ```rust
//! use metagov::security::{AccessControl, Permission, Role};
//!
//! let ac = AccessControl::new();
//! assert!(ac.has_permission(&Role::Admin, &Permission::RegisterServices));
//! assert!(!ac.has_permission(&Role::ReadOnly, &Permission::RegisterServices));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// System roles with predefined permission sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full system administrator with all permissions.
    Admin,
    /// Identity of an engine host process.
    EngineHost,
    /// Maintains governance engines and services.
    Steward,
    /// Read-only access to configuration.
    ReadOnly,
}

impl Role {
    /// Returns all available roles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Admin, Self::EngineHost, Self::Steward, Self::ReadOnly]
    }

    /// Returns the display name for the role.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::EngineHost => "Engine Host",
            Self::Steward => "Steward",
            Self::ReadOnly => "Read-Only",
        }
    }
}

/// Fine-grained permissions for governance operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create governance engines.
    ManageEngines,
    /// Create governance services.
    ManageServices,
    /// Register and unregister services with engines.
    RegisterServices,
    /// Read engine and service configuration.
    ViewConfiguration,
    /// Run a governance service.
    RunService,
    /// Cancel a running governance service.
    CancelService,
    /// Record completion of an engine action.
    RecordCompletion,
}

impl Permission {
    /// Returns all available permissions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ManageEngines,
            Self::ManageServices,
            Self::RegisterServices,
            Self::ViewConfiguration,
            Self::RunService,
            Self::CancelService,
            Self::RecordCompletion,
        ]
    }

    /// Returns the display name for the permission.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::ManageEngines => "Manage Engines",
            Self::ManageServices => "Manage Services",
            Self::RegisterServices => "Register Services",
            Self::ViewConfiguration => "View Configuration",
            Self::RunService => "Run Service",
            Self::CancelService => "Cancel Service",
            Self::RecordCompletion => "Record Completion",
        }
    }

    /// Permission required by a named handler operation.
    ///
    /// Unknown operations need [`Permission::ManageEngines`], the broadest
    /// configuration permission.
    #[must_use]
    pub fn for_operation(operation: &str) -> Self {
        match operation {
            "createGovernanceEngine" => Self::ManageEngines,
            "createGovernanceService" => Self::ManageServices,
            "registerServiceWithEngine" | "unregisterServiceFromEngine" => Self::RegisterServices,
            "getGovernanceEngineByName"
            | "getRegisteredServices"
            | "getRegisteredService"
            | "refreshConfig" => Self::ViewConfiguration,
            "runService" => Self::RunService,
            "cancelService" => Self::CancelService,
            "recordCompletionStatus" => Self::RecordCompletion,
            _ => Self::ManageEngines,
        }
    }
}

/// Result of an access control check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    /// Access granted.
    Granted,
    /// Access denied with reason.
    Denied(String),
}

impl AccessResult {
    /// Returns true if access was granted.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Role to permission mapping.
#[derive(Debug, Clone)]
pub struct AccessControl {
    role_permissions: HashMap<Role, HashSet<Permission>>,
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessControl {
    /// Creates the default role-permission mappings.
    #[must_use]
    pub fn new() -> Self {
        let mut role_permissions = HashMap::new();

        role_permissions.insert(Role::Admin, Permission::all().iter().copied().collect());

        role_permissions.insert(
            Role::EngineHost,
            [
                Permission::ViewConfiguration,
                Permission::RunService,
                Permission::CancelService,
                Permission::RecordCompletion,
            ]
            .into_iter()
            .collect(),
        );

        role_permissions.insert(
            Role::Steward,
            [
                Permission::ManageEngines,
                Permission::ManageServices,
                Permission::RegisterServices,
                Permission::ViewConfiguration,
            ]
            .into_iter()
            .collect(),
        );

        role_permissions.insert(
            Role::ReadOnly,
            std::iter::once(Permission::ViewConfiguration).collect(),
        );

        Self { role_permissions }
    }

    /// Checks if a role has a specific permission.
    #[must_use]
    pub fn has_permission(&self, role: &Role, permission: &Permission) -> bool {
        self.role_permissions
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }

    /// Checks access and returns a detailed result.
    #[must_use]
    pub fn check_access(&self, role: &Role, permission: &Permission) -> AccessResult {
        if self.has_permission(role, permission) {
            AccessResult::Granted
        } else {
            AccessResult::Denied(format!(
                "Role '{}' does not have permission '{}'",
                role.display_name(),
                permission.display_name()
            ))
        }
    }

    /// Returns all permissions for a role.
    #[must_use]
    pub fn permissions_for(&self, role: &Role) -> HashSet<Permission> {
        self.role_permissions.get(role).cloned().unwrap_or_default()
    }

    /// Adds a permission to a role.
    pub fn grant_permission(&mut self, role: &Role, permission: Permission) {
        self.role_permissions
            .entry(*role)
            .or_default()
            .insert(permission);
    }

    /// Removes a permission from a role.
    pub fn revoke_permission(&mut self, role: &Role, permission: &Permission) {
        if let Some(perms) = self.role_permissions.get_mut(role) {
            perms.remove(permission);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_all_permissions() {
        let ac = AccessControl::new();
        for permission in Permission::all() {
            assert!(
                ac.has_permission(&Role::Admin, permission),
                "Admin should have {permission:?}"
            );
        }
    }

    #[test]
    fn test_readonly_limited_permissions() {
        let ac = AccessControl::new();
        assert!(ac.has_permission(&Role::ReadOnly, &Permission::ViewConfiguration));
        assert!(!ac.has_permission(&Role::ReadOnly, &Permission::RegisterServices));
        assert!(!ac.has_permission(&Role::ReadOnly, &Permission::RunService));
    }

    #[test]
    fn test_engine_host_cannot_register() {
        let ac = AccessControl::new();
        let result = ac.check_access(&Role::EngineHost, &Permission::RegisterServices);
        assert_eq!(
            result,
            AccessResult::Denied(
                "Role 'Engine Host' does not have permission 'Register Services'".to_string()
            )
        );
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut ac = AccessControl::new();
        ac.grant_permission(&Role::ReadOnly, Permission::RunService);
        assert!(ac.has_permission(&Role::ReadOnly, &Permission::RunService));
        ac.revoke_permission(&Role::ReadOnly, &Permission::RunService);
        assert!(!ac.has_permission(&Role::ReadOnly, &Permission::RunService));
    }

    #[test]
    fn test_operation_permissions() {
        assert_eq!(
            Permission::for_operation("registerServiceWithEngine"),
            Permission::RegisterServices
        );
        assert_eq!(
            Permission::for_operation("getRegisteredServices"),
            Permission::ViewConfiguration
        );
        assert_eq!(Permission::for_operation("somethingNew"), Permission::ManageEngines);
    }
}
