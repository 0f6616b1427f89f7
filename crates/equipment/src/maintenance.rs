use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use labtrack_core::{DomainError, DomainResult, Entity, EquipmentId, MaintenanceRecordId};

use crate::Attachment;

/// A maintenance intervention performed on an equipment.
///
/// Authorized against the unit of the referenced equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: MaintenanceRecordId,
    pub equipment_id: EquipmentId,
    pub date: NaiveDate,
    pub description: String,
    pub performed_by: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Entity for MaintenanceRecord {
    type Id = MaintenanceRecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecordDraft {
    pub equipment_id: EquipmentId,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub performed_by: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl MaintenanceRecordDraft {
    fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description must not be empty"));
        }
        Ok(())
    }

    pub fn into_record(self) -> DomainResult<MaintenanceRecord> {
        self.validate()?;
        Ok(MaintenanceRecord {
            id: MaintenanceRecordId::new(),
            equipment_id: self.equipment_id,
            date: self.date,
            description: self.description,
            performed_by: self.performed_by,
            attachments: self.attachments,
        })
    }
}

impl MaintenanceRecord {
    /// Replace the editable fields. A record never moves to another
    /// equipment; `draft.equipment_id` is ignored.
    pub fn updated(&self, draft: MaintenanceRecordDraft) -> DomainResult<MaintenanceRecord> {
        draft.validate()?;
        Ok(MaintenanceRecord {
            id: self.id,
            equipment_id: self.equipment_id,
            date: draft.date,
            description: draft.description,
            performed_by: draft.performed_by,
            attachments: draft.attachments,
        })
    }
}
