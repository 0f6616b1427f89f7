//! Unit-scoped authorization policy.
//!
//! One decision function for every resource type. Services never branch on
//! roles themselves; they build a [`ResourceRef`] and ask [`authorize`] (or
//! [`read_scope`] for list operations).
//!
//! - No IO
//! - No panics
//! - No state (safe to call from any number of threads)

use serde::Serialize;
use thiserror::Error;

use labtrack_core::{UnitId, UserId};

use crate::{Action, Actor, ActorScope, ResourceKind, ResourceRef, Role};

/// Outcome of a policy evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a request was denied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Non-admin actor without a unit.
    MalformedActor,
    /// The resource belongs to another unit (or to no unit).
    UnitMismatch,
    /// The role never has this power, whatever the unit.
    RoleForbidden,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("permission denied: cannot {action} {resource}")]
    PermissionDenied {
        action: Action,
        resource: ResourceRef,
        reason: DenyReason,
    },

    #[error("malformed actor {actor}: role {role} requires a unit")]
    MalformedActor { actor: UserId, role: Role },
}

/// Evaluate the policy table.
///
/// `resource_unit` is the unit owning the target (for `Create`, the unit that
/// will own it). For user records it is the target user's own unit, which is
/// `None` for admins.
pub fn decide(
    actor: &Actor,
    action: Action,
    kind: ResourceKind,
    resource_unit: Option<&UnitId>,
) -> Decision {
    let actor_unit = match actor.scope() {
        Ok(ActorScope::Global) => return Decision::Allow,
        Ok(ActorScope::Unit(unit)) => unit,
        Err(_) => return Decision::Deny(DenyReason::MalformedActor),
    };

    if !kind.is_unit_scoped() {
        return decide_notification(action);
    }

    let same_unit = resource_unit == Some(actor_unit);
    let unit_gate = if same_unit {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::UnitMismatch)
    };

    match (actor.role, action) {
        (Role::Admin, _) => Decision::Allow,
        (Role::UnitManager, _) => unit_gate,
        (Role::EquipmentManager, Action::ReadAll | Action::ReadOne) => unit_gate,
        (Role::EquipmentManager, Action::Create) if kind.is_field_report() => unit_gate,
        (Role::EquipmentManager, Action::Create | Action::Update | Action::Delete) => {
            Decision::Deny(DenyReason::RoleForbidden)
        }
    }
}

// Notifications are global: every role reads them and marks them read,
// only admins create or delete.
fn decide_notification(action: Action) -> Decision {
    match action {
        Action::ReadAll | Action::ReadOne | Action::Update => Decision::Allow,
        Action::Create | Action::Delete => Decision::Deny(DenyReason::RoleForbidden),
    }
}

/// Authorize `action` on `resource`, turning a deny into an error the caller
/// can surface as an access-control failure.
pub fn authorize(actor: &Actor, action: Action, resource: &ResourceRef) -> Result<(), AuthzError> {
    match decide(actor, action, resource.kind, resource.unit.as_ref()) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::MalformedActor) => Err(AuthzError::MalformedActor {
            actor: actor.id,
            role: actor.role,
        }),
        Decision::Deny(reason) => Err(AuthzError::PermissionDenied {
            action,
            resource: resource.clone(),
            reason,
        }),
    }
}

/// Visibility of a `ReadAll` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadScope {
    All,
    Unit(UnitId),
}

impl ReadScope {
    /// Whether a record owned by `unit` is visible under this scope.
    pub fn admits(&self, unit: Option<&UnitId>) -> bool {
        match self {
            ReadScope::All => true,
            ReadScope::Unit(scope) => unit == Some(scope),
        }
    }

    /// Keep only the visible records.
    pub fn retain<T, F>(&self, items: Vec<T>, unit_of: F) -> Vec<T>
    where
        F: Fn(&T) -> Option<&UnitId>,
    {
        match self {
            ReadScope::All => items,
            ReadScope::Unit(_) => items.into_iter().filter(|item| self.admits(unit_of(item))).collect(),
        }
    }
}

/// List-narrowing variant of the policy.
///
/// `ReadAll` for a non-admin is not a yes/no answer: it yields the unit whose
/// records may be returned.
pub fn read_scope(actor: &Actor, kind: ResourceKind) -> Result<ReadScope, AuthzError> {
    let scope = actor.scope()?;
    Ok(match scope {
        ActorScope::Global => ReadScope::All,
        ActorScope::Unit(_) if !kind.is_unit_scoped() => ReadScope::All,
        ActorScope::Unit(unit) => ReadScope::Unit(unit.clone()),
    })
}
