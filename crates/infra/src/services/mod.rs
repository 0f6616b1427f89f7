//! Resource services.
//!
//! Each service loads what it needs, asks the policy engine, and only then
//! touches storage. Equipment is recomputed on every read path.

mod credentials;
mod equipment;
mod error;
mod issues;
mod maintenance;
mod notifications;
mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::CredentialService;
pub use equipment::EquipmentService;
pub use error::ServiceError;
pub use issues::IssueReportService;
pub use maintenance::MaintenanceRecordService;
pub use notifications::NotificationService;
pub use users::{InvitedUser, UserService};

use labtrack_auth::{Action, Actor, ResourceRef, authorize};

/// Authorize or fail, logging the denial.
fn guard(actor: &Actor, action: Action, resource: ResourceRef) -> Result<(), ServiceError> {
    authorize(actor, action, &resource).map_err(|e| {
        tracing::warn!(actor = %actor.id, role = %actor.role, action = %action, resource = %resource, "permission denied");
        ServiceError::from(e)
    })
}
