use core::str::FromStr;

use serde::{Deserialize, Serialize};

use labtrack_core::DomainError;

/// Fixed role set. Powers are hard-wired into the policy engine, not data.
///
/// Not a total order: `UnitManager` and `EquipmentManager` differ in what they
/// may do inside their unit, while `Admin` is the only global role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Global scope, full power over every resource and unit.
    Admin,
    /// Reads and writes everything inside exactly one unit.
    UnitManager,
    /// Reads its unit; may only file issue reports and maintenance records.
    EquipmentManager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::UnitManager, Role::EquipmentManager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::UnitManager => "UNIT_MANAGER",
            Role::EquipmentManager => "EQUIPMENT_MANAGER",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "UNIT_MANAGER" => Ok(Role::UnitManager),
            "EQUIPMENT_MANAGER" => Ok(Role::EquipmentManager),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
