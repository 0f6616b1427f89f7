//! Equipment domain module.
//!
//! Equipment, its maintenance history and issue reports, in-app
//! notifications, and the maintenance scheduling calculator. Pure domain
//! logic (no IO, no HTTP, no storage).

pub mod attachment;
pub mod equipment;
pub mod issue;
pub mod maintenance;
pub mod notification;
pub mod schedule;

pub use attachment::Attachment;
pub use equipment::{Criticality, Equipment, EquipmentDraft};
pub use issue::{DEFAULT_ISSUE_STATUS, IssueReport, IssueReportDraft, IssueSeverity};
pub use maintenance::{MaintenanceRecord, MaintenanceRecordDraft};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use schedule::{
    EquipmentStatus, FrequencyUnit, MaintenanceFrequency, next_maintenance_date, recompute, status_on,
};
