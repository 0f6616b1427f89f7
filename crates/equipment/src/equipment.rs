use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use labtrack_core::{DomainError, DomainResult, Entity, EquipmentId, UnitId, UserId};

use crate::schedule::{EquipmentStatus, MaintenanceFrequency};

/// How much the unit depends on this equipment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criticality {
    Low,
    #[default]
    Medium,
    High,
}

/// A piece of institutional lab equipment.
///
/// `location_unit` is the authorization anchor for the equipment and for every
/// maintenance record and issue report that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    /// Institutional inventory number; unique across all units.
    pub institutional_id: String,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub location_building: String,
    pub location_unit: UnitId,
    pub last_calibration_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub created_date: Option<NaiveDate>,
    /// Staff member in charge of the equipment.
    pub manager_id: Option<UserId>,
    pub maintenance_frequency: Option<MaintenanceFrequency>,
    pub custom_maintenance_instructions: Option<String>,
    pub criticality: Criticality,
    pub purchased_by_government: Option<bool>,

    /// Derived; see [`crate::recompute`].
    pub next_maintenance_date: Option<NaiveDate>,
    /// Derived; see [`crate::recompute`].
    pub status: EquipmentStatus,
}

impl Entity for Equipment {
    type Id = EquipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Editable equipment fields (create and full update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentDraft {
    pub institutional_id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub location_building: String,
    pub location_unit: UnitId,
    #[serde(default)]
    pub last_calibration_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_maintenance_date: Option<NaiveDate>,
    #[serde(default)]
    pub manager_id: Option<UserId>,
    #[serde(default)]
    pub maintenance_frequency: Option<MaintenanceFrequency>,
    #[serde(default)]
    pub custom_maintenance_instructions: Option<String>,
    #[serde(default)]
    pub criticality: Criticality,
    #[serde(default)]
    pub purchased_by_government: Option<bool>,
}

impl EquipmentDraft {
    fn validate(&self) -> DomainResult<()> {
        if self.institutional_id.trim().is_empty() {
            return Err(DomainError::validation("institutional_id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        Ok(())
    }

    /// Build a new equipment registered on `created_date`.
    ///
    /// Derived fields start at their defaults; callers recompute before
    /// returning the record.
    pub fn into_equipment(self, created_date: NaiveDate) -> DomainResult<Equipment> {
        self.validate()?;
        Ok(self.apply(EquipmentId::new(), Some(created_date)))
    }

    fn apply(self, id: EquipmentId, created_date: Option<NaiveDate>) -> Equipment {
        Equipment {
            id,
            institutional_id: self.institutional_id.trim().to_string(),
            name: self.name.trim().to_string(),
            brand: self.brand,
            model: self.model,
            location_building: self.location_building,
            location_unit: self.location_unit,
            last_calibration_date: self.last_calibration_date,
            last_maintenance_date: self.last_maintenance_date,
            created_date,
            manager_id: self.manager_id,
            maintenance_frequency: self.maintenance_frequency,
            custom_maintenance_instructions: self.custom_maintenance_instructions,
            criticality: self.criticality,
            purchased_by_government: self.purchased_by_government,
            next_maintenance_date: None,
            status: EquipmentStatus::Ok,
        }
    }
}

impl Equipment {
    /// Replace the editable fields, keeping identity and registration date.
    pub fn updated(&self, draft: EquipmentDraft) -> DomainResult<Equipment> {
        draft.validate()?;
        Ok(draft.apply(self.id, self.created_date))
    }
}
