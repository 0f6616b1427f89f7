use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use labtrack_auth::{Action, Actor, ResourceKind, ResourceRef, read_scope};
use labtrack_core::{EquipmentId, IssueReportId, UnitId};
use labtrack_equipment::{
    Equipment, IssueReport, IssueReportDraft, IssueSeverity, NewNotification, NotificationKind,
};

use super::{NotificationService, ServiceError, guard};
use crate::Repository;

pub struct IssueReportService {
    reports: Arc<dyn Repository<IssueReport>>,
    equipment: Arc<dyn Repository<Equipment>>,
    notifications: Arc<NotificationService>,
}

impl IssueReportService {
    pub fn new(
        reports: Arc<dyn Repository<IssueReport>>,
        equipment: Arc<dyn Repository<Equipment>>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            reports,
            equipment,
            notifications,
        }
    }

    fn load(&self, id: IssueReportId) -> Result<IssueReport, ServiceError> {
        self.reports
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::IssueReport, id))
    }

    fn load_equipment(&self, id: EquipmentId) -> Result<Equipment, ServiceError> {
        self.equipment
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Equipment, id))
    }

    fn report_ref(&self, report: &IssueReport) -> Result<ResourceRef, ServiceError> {
        let unit = self.equipment.get(&report.equipment_id)?.map(|e| e.location_unit);
        Ok(ResourceRef::new(ResourceKind::IssueReport, unit).with_id(report.id))
    }

    pub fn list(&self, actor: &Actor) -> Result<Vec<IssueReport>, ServiceError> {
        let scope = read_scope(actor, ResourceKind::IssueReport)?;
        let units: HashMap<EquipmentId, UnitId> = self
            .equipment
            .list()?
            .into_iter()
            .map(|e| (e.id, e.location_unit))
            .collect();
        Ok(self
            .reports
            .list()?
            .into_iter()
            .filter(|r| scope.admits(units.get(&r.equipment_id)))
            .collect())
    }

    /// Reports filed against one equipment, most recent first.
    pub fn list_for_equipment(&self, actor: &Actor, equipment_id: EquipmentId) -> Result<Vec<IssueReport>, ServiceError> {
        let equipment = self.load_equipment(equipment_id)?;
        guard(
            actor,
            Action::ReadAll,
            ResourceRef::new(ResourceKind::IssueReport, Some(equipment.location_unit)),
        )?;

        let mut reports: Vec<_> = self
            .reports
            .list()?
            .into_iter()
            .filter(|r| r.equipment_id == equipment_id)
            .collect();
        reports.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
        Ok(reports)
    }

    pub fn get(&self, actor: &Actor, id: IssueReportId) -> Result<IssueReport, ServiceError> {
        let report = self.load(id)?;
        guard(actor, Action::ReadOne, self.report_ref(&report)?)?;
        Ok(report)
    }

    /// File a report and raise a notification about it.
    pub fn create(
        &self,
        actor: &Actor,
        draft: IssueReportDraft,
        now: DateTime<Utc>,
    ) -> Result<IssueReport, ServiceError> {
        let equipment = self.load_equipment(draft.equipment_id)?;
        guard(
            actor,
            Action::Create,
            ResourceRef::new(ResourceKind::IssueReport, Some(equipment.location_unit.clone())),
        )?;

        let report = draft.into_report(now)?;
        self.reports.save(report.clone())?;
        tracing::info!(report_id = %report.id, equipment_id = %equipment.id, actor = %actor.id, "issue reported");

        let kind = match report.severity {
            IssueSeverity::Critical => NotificationKind::Error,
            IssueSeverity::Minor | IssueSeverity::Moderate => NotificationKind::Warning,
        };
        let notice = NewNotification::new(
            kind,
            format!("Issue reported on {} ({})", equipment.name, equipment.institutional_id),
        )
        .with_details(report.description.clone())
        .with_link(format!("/equipment/{}", equipment.id));
        if let Err(e) = self.notifications.publish(notice, now) {
            tracing::warn!(report_id = %report.id, error = %e, "issue notification not published");
        }

        Ok(report)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: IssueReportId,
        draft: IssueReportDraft,
    ) -> Result<IssueReport, ServiceError> {
        let current = self.load(id)?;
        guard(actor, Action::Update, self.report_ref(&current)?)?;

        let updated = current.updated(draft)?;
        self.reports.save(updated.clone())?;

        tracing::info!(report_id = %id, status = %updated.status, actor = %actor.id, "issue report updated");
        Ok(updated)
    }

    pub fn delete(&self, actor: &Actor, id: IssueReportId) -> Result<(), ServiceError> {
        let report = self.load(id)?;
        guard(actor, Action::Delete, self.report_ref(&report)?)?;
        self.reports.delete(&id)?;

        tracing::info!(report_id = %id, actor = %actor.id, "issue report deleted");
        Ok(())
    }
}
