//! Access-control rules for documents and user accounts.
//!
//! Every check here is a pure function of ids and role ids so the same rules can be
//! applied by handlers, by the in-memory repository, and mirrored by the SQL filter
//! in the Postgres repository.

use crate::{error::AppError, models::Access};

pub const SUPER_ADMIN: i32 = 1;
pub const ADMIN: i32 = 2;
pub const USER: i32 = 3;

const NO_ACCESS: &str = "You do not have access to this request";

/// Viewer
///
/// The identity a rule is evaluated for: the acting user's id and current role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub id: i32,
    pub role_id: i32,
}

impl Viewer {
    pub fn new(id: i32, role_id: i32) -> Self {
        Self { id, role_id }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role_id == SUPER_ADMIN
    }

    pub fn is_admin_tier(&self) -> bool {
        is_admin_tier(self.role_id)
    }
}

/// Super Admin and Admin. Custom roles created later never belong to this tier.
pub fn is_admin_tier(role_id: i32) -> bool {
    matches!(role_id, SUPER_ADMIN | ADMIN)
}

// --- Visibility ---

/// Whether `viewer` may read a document with the given access class, owner and
/// owner's role.
pub fn can_view(viewer: Viewer, access: Access, owner_id: i32, owner_role_id: i32) -> bool {
    match access {
        Access::Public => true,
        Access::Private => viewer.id == owner_id || viewer.is_admin_tier(),
        Access::Role => viewer.is_admin_tier() || viewer.role_id == owner_role_id,
    }
}

pub fn authorize_view(
    viewer: Viewer,
    access: Access,
    owner_id: i32,
    owner_role_id: i32,
) -> Result<(), AppError> {
    if can_view(viewer, access, owner_id, owner_role_id) {
        Ok(())
    } else {
        tracing::warn!(viewer_id = viewer.id, owner_id, %access, "document view denied");
        Err(AppError::Forbidden(
            "You are not authorized to view this document".to_string(),
        ))
    }
}

// --- Mutation ---

/// Update and delete of an owned resource: the owner or a Super Admin.
pub fn can_modify(actor: Viewer, owner_id: i32) -> bool {
    actor.is_super_admin() || actor.id == owner_id
}

/// Like [`can_modify`], failing with `denial` as the 403 message.
pub fn authorize_modification(actor: Viewer, owner_id: i32, denial: &str) -> Result<(), AppError> {
    if can_modify(actor, owner_id) {
        Ok(())
    } else {
        tracing::warn!(actor_id = actor.id, owner_id, "modification denied");
        Err(AppError::Forbidden(denial.to_string()))
    }
}

pub fn require_admin(actor: Viewer) -> Result<(), AppError> {
    if actor.is_admin_tier() {
        Ok(())
    } else {
        Err(AppError::Forbidden(NO_ACCESS.to_string()))
    }
}

pub fn require_super_admin(actor: Viewer) -> Result<(), AppError> {
    if actor.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(NO_ACCESS.to_string()))
    }
}

// --- Account management ---

/// Which fields an account update request touches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedUserChanges {
    pub email: bool,
    pub password: bool,
    pub role: bool,
}

/// Checks whether `actor` may apply `changes` to the account `target_id`.
///
/// Users edit only their own email/password. Only a Super Admin changes roles, and
/// never their own. When a Super Admin edits someone else, the role is the only
/// thing they may touch.
pub fn authorize_user_update(
    actor: Viewer,
    target_id: i32,
    changes: RequestedUserChanges,
) -> Result<(), AppError> {
    let editing_self = actor.id == target_id;

    if !actor.is_super_admin() && !editing_self {
        return Err(AppError::Forbidden(
            "You cannot update someone else's details".to_string(),
        ));
    }

    if changes.role && !actor.is_super_admin() {
        return Err(AppError::Forbidden(
            "Only a Super Admin can change roles".to_string(),
        ));
    }

    if changes.role && editing_self {
        return Err(AppError::Forbidden("You cannot change your own role".to_string()));
    }

    if actor.is_super_admin() && !editing_self && (changes.email || changes.password) {
        return Err(AppError::Forbidden(
            "You can only change another user's role, not their email or password".to_string(),
        ));
    }

    Ok(())
}

/// Account removal: Super Admin only, and never their own account.
pub fn authorize_user_delete(actor: Viewer, target_id: i32) -> Result<(), AppError> {
    require_super_admin(actor)?;
    if actor.id == target_id {
        return Err(AppError::Forbidden("You cannot delete yourself".to_string()));
    }
    Ok(())
}
