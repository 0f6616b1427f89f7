use serde::{Deserialize, Serialize};

use labtrack_core::UnitId;

/// Operation an actor attempts on a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ReadAll,
    ReadOne,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::ReadAll,
        Action::ReadOne,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ReadAll => "read_all",
            Action::ReadOne => "read_one",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Action::ReadAll | Action::ReadOne)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types guarded by the policy engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Equipment,
    IssueReport,
    MaintenanceRecord,
    User,
    Notification,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Equipment,
        ResourceKind::IssueReport,
        ResourceKind::MaintenanceRecord,
        ResourceKind::User,
        ResourceKind::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Equipment => "equipment",
            ResourceKind::IssueReport => "issue_report",
            ResourceKind::MaintenanceRecord => "maintenance_record",
            ResourceKind::User => "user",
            ResourceKind::Notification => "notification",
        }
    }

    /// Whether records of this kind are anchored to a unit.
    pub fn is_unit_scoped(&self) -> bool {
        !matches!(self, ResourceKind::Notification)
    }

    /// Kinds an equipment manager may create inside its own unit.
    pub fn is_field_report(&self) -> bool {
        matches!(self, ResourceKind::IssueReport | ResourceKind::MaintenanceRecord)
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the target of a decision, carried into `PermissionDenied`.
///
/// `unit` is the owning unit (or, for creation, the unit that will own it).
/// `id` is absent for creation and list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: Option<String>,
    pub unit: Option<UnitId>,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, unit: Option<UnitId>) -> Self {
        Self { kind, id: None, unit }
    }

    pub fn with_id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

impl core::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(id) = &self.id {
            write!(f, " {id}")?;
        }
        match &self.unit {
            Some(unit) => write!(f, " in unit '{unit}'"),
            None => write!(f, " (no unit)"),
        }
    }
}
