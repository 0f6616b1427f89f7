use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labtrack_core::{DomainError, DomainResult, Entity, EquipmentId, IssueReportId};

use crate::Attachment;

/// Status given to a report when the reporter does not provide one.
pub const DEFAULT_ISSUE_STATUS: &str = "Abierto";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Minor,
    Moderate,
    Critical,
}

/// A reported malfunction or incident on an equipment.
///
/// `status` is free text (`Abierto`, `En Progreso`, `Resuelto` in practice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReport {
    pub id: IssueReportId,
    pub equipment_id: EquipmentId,
    pub reported_by: String,
    pub reported_at: DateTime<Utc>,
    pub description: String,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub status: String,
}

impl Entity for IssueReport {
    type Id = IssueReportId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReportDraft {
    pub equipment_id: EquipmentId,
    #[serde(default)]
    pub reported_by: String,
    /// Defaults to the time the report is filed.
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
    pub description: String,
    pub severity: IssueSeverity,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub status: Option<String>,
}

impl IssueReportDraft {
    fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description must not be empty"));
        }
        Ok(())
    }

    fn status(status: Option<String>) -> String {
        status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUE_STATUS.to_string())
    }

    pub fn into_report(self, now: DateTime<Utc>) -> DomainResult<IssueReport> {
        self.validate()?;
        Ok(IssueReport {
            id: IssueReportId::new(),
            equipment_id: self.equipment_id,
            reported_by: self.reported_by,
            reported_at: self.reported_at.unwrap_or(now),
            description: self.description,
            severity: self.severity,
            attachments: self.attachments,
            status: Self::status(self.status),
        })
    }
}

impl IssueReport {
    /// Full replacement; an omitted `reported_at` keeps the original time and
    /// the report stays attached to its equipment.
    pub fn updated(&self, draft: IssueReportDraft) -> DomainResult<IssueReport> {
        draft.validate()?;
        Ok(IssueReport {
            id: self.id,
            equipment_id: self.equipment_id,
            reported_by: draft.reported_by,
            reported_at: draft.reported_at.unwrap_or(self.reported_at),
            description: draft.description,
            severity: draft.severity,
            attachments: draft.attachments,
            status: IssueReportDraft::status(draft.status),
        })
    }
}
