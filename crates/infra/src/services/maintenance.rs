use std::collections::HashMap;
use std::sync::Arc;

use labtrack_auth::{Action, Actor, ResourceKind, ResourceRef, read_scope};
use labtrack_core::{EquipmentId, MaintenanceRecordId, UnitId};
use labtrack_equipment::{Equipment, MaintenanceRecord, MaintenanceRecordDraft};

use super::{ServiceError, guard};
use crate::Repository;

/// Maintenance history. Records are authorized against the unit of the
/// equipment they reference.
pub struct MaintenanceRecordService {
    records: Arc<dyn Repository<MaintenanceRecord>>,
    equipment: Arc<dyn Repository<Equipment>>,
}

impl MaintenanceRecordService {
    pub fn new(
        records: Arc<dyn Repository<MaintenanceRecord>>,
        equipment: Arc<dyn Repository<Equipment>>,
    ) -> Self {
        Self { records, equipment }
    }

    fn load(&self, id: MaintenanceRecordId) -> Result<MaintenanceRecord, ServiceError> {
        self.records
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::MaintenanceRecord, id))
    }

    fn load_equipment(&self, id: EquipmentId) -> Result<Equipment, ServiceError> {
        self.equipment
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Equipment, id))
    }

    /// Unit of the referenced equipment; `None` if the equipment is gone.
    fn unit_of(&self, record: &MaintenanceRecord) -> Result<Option<UnitId>, ServiceError> {
        Ok(self.equipment.get(&record.equipment_id)?.map(|e| e.location_unit))
    }

    fn record_ref(record: &MaintenanceRecord, unit: Option<UnitId>) -> ResourceRef {
        ResourceRef::new(ResourceKind::MaintenanceRecord, unit).with_id(record.id)
    }

    pub fn list(&self, actor: &Actor) -> Result<Vec<MaintenanceRecord>, ServiceError> {
        let scope = read_scope(actor, ResourceKind::MaintenanceRecord)?;
        let units: HashMap<EquipmentId, UnitId> = self
            .equipment
            .list()?
            .into_iter()
            .map(|e| (e.id, e.location_unit))
            .collect();
        Ok(self
            .records
            .list()?
            .into_iter()
            .filter(|r| scope.admits(units.get(&r.equipment_id)))
            .collect())
    }

    /// History of one equipment, most recent first.
    pub fn list_for_equipment(
        &self,
        actor: &Actor,
        equipment_id: EquipmentId,
    ) -> Result<Vec<MaintenanceRecord>, ServiceError> {
        let equipment = self.load_equipment(equipment_id)?;
        guard(
            actor,
            Action::ReadAll,
            ResourceRef::new(ResourceKind::MaintenanceRecord, Some(equipment.location_unit)),
        )?;

        let mut records: Vec<_> = self
            .records
            .list()?
            .into_iter()
            .filter(|r| r.equipment_id == equipment_id)
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    pub fn get(&self, actor: &Actor, id: MaintenanceRecordId) -> Result<MaintenanceRecord, ServiceError> {
        let record = self.load(id)?;
        guard(actor, Action::ReadOne, Self::record_ref(&record, self.unit_of(&record)?))?;
        Ok(record)
    }

    pub fn create(&self, actor: &Actor, draft: MaintenanceRecordDraft) -> Result<MaintenanceRecord, ServiceError> {
        let equipment = self.load_equipment(draft.equipment_id)?;
        guard(
            actor,
            Action::Create,
            ResourceRef::new(ResourceKind::MaintenanceRecord, Some(equipment.location_unit)),
        )?;

        let record = draft.into_record()?;
        self.records.save(record.clone())?;

        tracing::info!(record_id = %record.id, equipment_id = %record.equipment_id, actor = %actor.id, "maintenance recorded");
        Ok(record)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: MaintenanceRecordId,
        draft: MaintenanceRecordDraft,
    ) -> Result<MaintenanceRecord, ServiceError> {
        let current = self.load(id)?;
        guard(actor, Action::Update, Self::record_ref(&current, self.unit_of(&current)?))?;

        let updated = current.updated(draft)?;
        self.records.save(updated.clone())?;

        tracing::info!(record_id = %id, actor = %actor.id, "maintenance record updated");
        Ok(updated)
    }

    pub fn delete(&self, actor: &Actor, id: MaintenanceRecordId) -> Result<(), ServiceError> {
        let record = self.load(id)?;
        guard(actor, Action::Delete, Self::record_ref(&record, self.unit_of(&record)?))?;
        self.records.delete(&id)?;

        tracing::info!(record_id = %id, actor = %actor.id, "maintenance record deleted");
        Ok(())
    }
}
