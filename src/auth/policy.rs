//! Ownership and role based authorization.
//!
//! A pure decision over the acting user, the resource owner, and the access
//! mode the operation demands. Every protected resource operation funnels
//! through [`authorize`]; the three modes are deliberately kept distinct:
//! edits are owner-exclusive even for admins, deletes allow the admin
//! override, and user deletion ignores ownership entirely.

use crate::auth::error::DenyReason;
use crate::domain::{Role, User};
use uuid::Uuid;

/// Access mode an operation requires against an owned resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Edit-class operations: only the owner, admins included in the denial.
    OwnerOnly,
    /// Delete-class operations: the owner, or any admin.
    OwnerOrAdmin,
    /// Administrative operations: only admins, ownership irrelevant.
    AdminOnly,
}

/// Decide whether `actor` may perform an `access`-class operation on a
/// resource owned by `owner_id`. Pure; no side effects.
pub fn authorize(actor: &User, owner_id: Uuid, access: Access) -> Result<(), DenyReason> {
    let is_owner = actor.id == owner_id;
    let is_admin = actor.role == Role::Admin;
    match access {
        Access::OwnerOnly if is_owner => Ok(()),
        Access::OwnerOnly => Err(DenyReason::NotOwner),
        Access::OwnerOrAdmin if is_owner || is_admin => Ok(()),
        Access::OwnerOrAdmin => Err(DenyReason::NotOwner),
        Access::AdminOnly if is_admin => Ok(()),
        Access::AdminOnly => Err(DenyReason::NotAdmin),
    }
}
