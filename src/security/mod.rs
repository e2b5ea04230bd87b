//! Security features.
//!
//! Authorization checks and role-based access control.

mod rbac;
mod verifier;

pub use rbac::{AccessControl, AccessResult, Permission, Role};
pub use verifier::{AllowAllVerifier, AuthorizationVerifier, RoleBasedVerifier};
