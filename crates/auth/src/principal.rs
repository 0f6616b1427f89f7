use serde::{Deserialize, Serialize};

use labtrack_core::{UnitId, UserId};

use crate::{AuthzError, Role};

/// The authenticated caller of an operation.
///
/// Built by the actor-resolution boundary (bearer token -> claims) and
/// trusted as already authenticated by the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    pub unit: Option<UnitId>,
}

/// Effective scope of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorScope<'a> {
    /// Admin: every unit.
    Global,
    /// Non-admin: exactly one unit.
    Unit(&'a UnitId),
}

impl Actor {
    pub fn new(id: UserId, role: Role, unit: Option<UnitId>) -> Self {
        Self { id, role, unit }
    }

    /// Resolve the actor's scope.
    ///
    /// A non-admin without a unit is malformed; it is never promoted to a
    /// global grant.
    pub fn scope(&self) -> Result<ActorScope<'_>, AuthzError> {
        if self.role.is_admin() {
            return Ok(ActorScope::Global);
        }
        match &self.unit {
            Some(unit) => Ok(ActorScope::Unit(unit)),
            None => Err(AuthzError::MalformedActor {
                actor: self.id,
                role: self.role,
            }),
        }
    }
}
