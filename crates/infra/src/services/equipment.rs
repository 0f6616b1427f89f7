use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use labtrack_auth::{Action, Actor, ResourceKind, ResourceRef, read_scope};
use labtrack_core::EquipmentId;
use labtrack_equipment::{Equipment, EquipmentDraft, IssueReport, MaintenanceRecord, recompute};

use super::{ServiceError, guard};
use crate::Repository;

fn equipment_ref(equipment: &Equipment) -> ResourceRef {
    ResourceRef::new(ResourceKind::Equipment, Some(equipment.location_unit.clone())).with_id(equipment.id)
}

pub struct EquipmentService {
    equipment: Arc<dyn Repository<Equipment>>,
    maintenance: Arc<dyn Repository<MaintenanceRecord>>,
    issues: Arc<dyn Repository<IssueReport>>,
}

impl EquipmentService {
    pub fn new(
        equipment: Arc<dyn Repository<Equipment>>,
        maintenance: Arc<dyn Repository<MaintenanceRecord>>,
        issues: Arc<dyn Repository<IssueReport>>,
    ) -> Self {
        Self {
            equipment,
            maintenance,
            issues,
        }
    }

    fn load(&self, id: EquipmentId) -> Result<Equipment, ServiceError> {
        self.equipment
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Equipment, id))
    }

    fn ensure_unique(&self, institutional_id: &str, except: Option<EquipmentId>) -> Result<(), ServiceError> {
        let taken = self
            .equipment
            .list()?
            .iter()
            .any(|e| Some(e.id) != except && e.institutional_id.eq_ignore_ascii_case(institutional_id.trim()));
        if taken {
            return Err(ServiceError::Conflict(format!(
                "institutional id '{}' is already registered",
                institutional_id.trim()
            )));
        }
        Ok(())
    }

    pub fn list(&self, actor: &Actor, now: DateTime<Utc>) -> Result<Vec<Equipment>, ServiceError> {
        let scope = read_scope(actor, ResourceKind::Equipment)?;
        let today = now.date_naive();
        Ok(scope
            .retain(self.equipment.list()?, |e| Some(&e.location_unit))
            .into_iter()
            .map(|e| recompute(e, today))
            .collect())
    }

    pub fn get(&self, actor: &Actor, id: EquipmentId, now: DateTime<Utc>) -> Result<Equipment, ServiceError> {
        let equipment = self.load(id)?;
        guard(actor, Action::ReadOne, equipment_ref(&equipment))?;
        Ok(recompute(equipment, now.date_naive()))
    }

    pub fn create(
        &self,
        actor: &Actor,
        draft: EquipmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Equipment, ServiceError> {
        guard(
            actor,
            Action::Create,
            ResourceRef::new(ResourceKind::Equipment, Some(draft.location_unit.clone())),
        )?;
        self.ensure_unique(&draft.institutional_id, None)?;

        let today: NaiveDate = now.date_naive();
        let equipment = recompute(draft.into_equipment(today)?, today);
        self.equipment.save(equipment.clone())?;

        tracing::info!(equipment_id = %equipment.id, unit = %equipment.location_unit, actor = %actor.id, "equipment created");
        Ok(equipment)
    }

    /// Full update. Moving the equipment to another unit also requires the
    /// right to create equipment there.
    pub fn update(
        &self,
        actor: &Actor,
        id: EquipmentId,
        draft: EquipmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Equipment, ServiceError> {
        let current = self.load(id)?;
        guard(actor, Action::Update, equipment_ref(&current))?;
        if draft.location_unit != current.location_unit {
            guard(
                actor,
                Action::Create,
                ResourceRef::new(ResourceKind::Equipment, Some(draft.location_unit.clone())),
            )?;
        }
        self.ensure_unique(&draft.institutional_id, Some(id))?;

        let updated = recompute(current.updated(draft)?, now.date_naive());
        self.equipment.save(updated.clone())?;

        tracing::info!(equipment_id = %id, actor = %actor.id, "equipment updated");
        Ok(updated)
    }

    /// Delete the equipment together with its maintenance history and issue
    /// reports.
    pub fn delete(&self, actor: &Actor, id: EquipmentId) -> Result<(), ServiceError> {
        let equipment = self.load(id)?;
        guard(actor, Action::Delete, equipment_ref(&equipment))?;

        for record in self.maintenance.list()?.into_iter().filter(|r| r.equipment_id == id) {
            self.maintenance.delete(&record.id)?;
        }
        for report in self.issues.list()?.into_iter().filter(|r| r.equipment_id == id) {
            self.issues.delete(&report.id)?;
        }
        self.equipment.delete(&id)?;

        tracing::info!(equipment_id = %id, actor = %actor.id, "equipment deleted");
        Ok(())
    }

    /// Whether an institutional id is taken anywhere, across all units.
    ///
    /// Any well-formed actor may ask; the answer reveals nothing else about
    /// the record.
    pub fn exists_by_institutional_id(&self, actor: &Actor, institutional_id: &str) -> Result<bool, ServiceError> {
        actor.scope()?;
        let wanted = institutional_id.trim();
        Ok(self
            .equipment
            .list()?
            .iter()
            .any(|e| e.institutional_id.eq_ignore_ascii_case(wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::*;
    use chrono::Duration;
    use labtrack_auth::AuthzError;
    use labtrack_core::UnitId;
    use labtrack_equipment::{EquipmentStatus, FrequencyUnit, MaintenanceFrequency};

    #[test]
    fn admin_creates_in_any_unit_and_gets_derived_fields() {
        let h = Harness::new();
        let mut draft = equipment_draft("UFRO-1", "chemistry");
        draft.last_maintenance_date = Some(date(2024, 1, 1));
        draft.maintenance_frequency = Some(MaintenanceFrequency::new(6, FrequencyUnit::Months));

        let eq = h.equipment.create(&admin(), draft, at(2024, 6, 15)).unwrap();
        assert_eq!(eq.next_maintenance_date, Some(date(2024, 7, 1)));
        assert_eq!(eq.status, EquipmentStatus::Advertencia);
        assert_eq!(eq.created_date, Some(date(2024, 6, 15)));
    }

    #[test]
    fn reads_recompute_against_the_current_day() {
        let h = Harness::new();
        let mut draft = equipment_draft("UFRO-1", "genomics");
        draft.last_maintenance_date = Some(date(2024, 1, 1));
        draft.maintenance_frequency = Some(MaintenanceFrequency::new(6, FrequencyUnit::Months));
        let eq = h.equipment.create(&admin(), draft, at(2024, 1, 15)).unwrap();
        assert_eq!(eq.status, EquipmentStatus::Ok);

        let later = h.equipment.get(&admin(), eq.id, at(2024, 7, 2)).unwrap();
        assert_eq!(later.status, EquipmentStatus::Vencido);
        let listed = h.equipment.list(&admin(), at(2024, 7, 2)).unwrap();
        assert_eq!(listed[0].status, EquipmentStatus::Vencido);
    }

    #[test]
    fn unit_manager_list_is_narrowed_to_own_unit() {
        let h = Harness::new();
        h.equipment.create(&admin(), equipment_draft("A-1", "genomics"), now()).unwrap();
        h.equipment.create(&admin(), equipment_draft("B-1", "chemistry"), now()).unwrap();

        let visible = h.equipment.list(&unit_manager("genomics"), now()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].institutional_id, "A-1");
    }

    #[test]
    fn cross_unit_read_is_denied() {
        let h = Harness::new();
        let eq = h.equipment.create(&admin(), equipment_draft("A-1", "genomics"), now()).unwrap();

        let err = h.equipment.get(&unit_manager("chemistry"), eq.id, now()).unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(AuthzError::PermissionDenied { .. })));
    }

    #[test]
    fn equipment_manager_cannot_create_or_edit_equipment() {
        let h = Harness::new();
        let em = equipment_manager("genomics");
        assert!(matches!(
            h.equipment.create(&em, equipment_draft("A-1", "genomics"), now()),
            Err(ServiceError::PermissionDenied(_))
        ));

        let eq = h.equipment.create(&admin(), equipment_draft("A-1", "genomics"), now()).unwrap();
        assert!(h.equipment.get(&em, eq.id, now()).is_ok());
        assert!(matches!(
            h.equipment.update(&em, eq.id, equipment_draft("A-1", "genomics"), now()),
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(matches!(h.equipment.delete(&em, eq.id), Err(ServiceError::PermissionDenied(_))));
    }

    #[test]
    fn moving_equipment_out_of_own_unit_is_denied() {
        let h = Harness::new();
        let um = unit_manager("genomics");
        let eq = h.equipment.create(&um, equipment_draft("A-1", "genomics"), now()).unwrap();

        let err = h
            .equipment
            .update(&um, eq.id, equipment_draft("A-1", "chemistry"), now())
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
        let stored = h.equipment.get(&admin(), eq.id, now()).unwrap();
        assert_eq!(stored.location_unit, UnitId::new("genomics").unwrap());
    }

    #[test]
    fn duplicate_institutional_id_conflicts() {
        let h = Harness::new();
        let first = h.equipment.create(&admin(), equipment_draft("UFRO-7", "genomics"), now()).unwrap();

        let err = h
            .equipment
            .create(&admin(), equipment_draft("ufro-7", "chemistry"), now())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // updating a record with its own id is not a conflict
        assert!(h.equipment.update(&admin(), first.id, equipment_draft("UFRO-7", "genomics"), now()).is_ok());
        assert!(h.equipment.exists_by_institutional_id(&unit_manager("chemistry"), "UFRO-7").unwrap());
        assert!(!h.equipment.exists_by_institutional_id(&admin(), "UFRO-8").unwrap());
    }

    #[test]
    fn malformed_actor_is_denied_before_anything_else() {
        let h = Harness::new();
        let err = h.equipment.list(&malformed(), now()).unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(AuthzError::MalformedActor { .. })));
        assert!(h.equipment.exists_by_institutional_id(&malformed(), "X").is_err());
    }

    #[test]
    fn delete_cascades_to_history() {
        let h = Harness::new();
        let eq = h.equipment.create(&admin(), equipment_draft("A-1", "genomics"), now()).unwrap();
        let keep = h.equipment.create(&admin(), equipment_draft("B-1", "genomics"), now()).unwrap();
        h.maintenance.create(&admin(), maintenance_draft(eq.id)).unwrap();
        h.issues.create(&admin(), issue_draft(eq.id), now()).unwrap();
        h.issues.create(&admin(), issue_draft(keep.id), now()).unwrap();

        h.equipment.delete(&admin(), eq.id).unwrap();
        assert!(h.maintenance.list(&admin()).unwrap().is_empty());
        let reports = h.issues.list(&admin()).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].equipment_id, keep.id);
        assert!(matches!(
            h.equipment.get(&admin(), eq.id, now() + Duration::days(1)),
            Err(ServiceError::NotFound { .. })
        ));
    }
}
