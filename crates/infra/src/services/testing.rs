//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use labtrack_auth::{Actor, CredentialError, CredentialHasher, NewUser, Role, UserAccount};
use labtrack_core::{EquipmentId, UnitId, UserId};
use labtrack_equipment::{
    Criticality, Equipment, EquipmentDraft, IssueReport, IssueReportDraft, IssueSeverity, MaintenanceRecord,
    MaintenanceRecordDraft, Notification,
};

use super::*;
use crate::{InMemoryMailer, InMemoryRepository, InMemoryTokenStore, TokenLifecycleManager, TokenSettings};

/// Reversible stand-in for Argon2 so service tests stay fast.
pub(crate) struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(format!("plain:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(plaintext)
    }
}

pub(crate) struct Harness {
    pub equipment: EquipmentService,
    pub maintenance: MaintenanceRecordService,
    pub issues: IssueReportService,
    pub notifications: Arc<NotificationService>,
    pub users: UserService,
    pub credentials: CredentialService,
    pub user_repo: Arc<InMemoryRepository<UserAccount>>,
    pub token_store: Arc<InMemoryTokenStore>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub mailer: Arc<InMemoryMailer>,
}

impl Harness {
    pub fn new() -> Self {
        let equipment_repo = Arc::new(InMemoryRepository::<Equipment>::new());
        let maintenance_repo = Arc::new(InMemoryRepository::<MaintenanceRecord>::new());
        let issue_repo = Arc::new(InMemoryRepository::<IssueReport>::new());
        let notification_repo = Arc::new(InMemoryRepository::<Notification>::new());
        let user_repo = Arc::new(InMemoryRepository::<UserAccount>::new());
        let token_store = Arc::new(InMemoryTokenStore::new());
        let mailer = Arc::new(InMemoryMailer::new());

        let tokens = Arc::new(TokenLifecycleManager::new(
            token_store.clone(),
            user_repo.clone(),
            mailer.clone(),
            TokenSettings::default(),
        ));
        let notifications = Arc::new(NotificationService::new(notification_repo));

        Self {
            equipment: EquipmentService::new(equipment_repo.clone(), maintenance_repo.clone(), issue_repo.clone()),
            maintenance: MaintenanceRecordService::new(maintenance_repo, equipment_repo.clone()),
            issues: IssueReportService::new(issue_repo, equipment_repo, notifications.clone()),
            notifications,
            users: UserService::new(user_repo.clone(), tokens.clone()),
            credentials: CredentialService::new(user_repo.clone(), tokens.clone(), Arc::new(PlainHasher)),
            user_repo,
            token_store,
            tokens,
            mailer,
        }
    }
}

pub(crate) fn unit(name: &str) -> UnitId {
    UnitId::new(name).unwrap()
}

pub(crate) fn admin() -> Actor {
    Actor::new(UserId::new(), Role::Admin, None)
}

pub(crate) fn unit_manager(unit_name: &str) -> Actor {
    Actor::new(UserId::new(), Role::UnitManager, Some(unit(unit_name)))
}

pub(crate) fn equipment_manager(unit_name: &str) -> Actor {
    Actor::new(UserId::new(), Role::EquipmentManager, Some(unit(unit_name)))
}

/// A non-admin with no unit.
pub(crate) fn malformed() -> Actor {
    Actor::new(UserId::new(), Role::UnitManager, None)
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub(crate) fn now() -> DateTime<Utc> {
    at(2024, 6, 15)
}

pub(crate) fn equipment_draft(institutional_id: &str, unit_name: &str) -> EquipmentDraft {
    EquipmentDraft {
        institutional_id: institutional_id.to_string(),
        name: format!("Equipment {institutional_id}"),
        brand: "Acme".to_string(),
        model: "X1".to_string(),
        location_building: "Main".to_string(),
        location_unit: unit(unit_name),
        last_calibration_date: None,
        last_maintenance_date: None,
        manager_id: None,
        maintenance_frequency: None,
        custom_maintenance_instructions: None,
        criticality: Criticality::Medium,
        purchased_by_government: None,
    }
}

pub(crate) fn maintenance_draft(equipment_id: EquipmentId) -> MaintenanceRecordDraft {
    MaintenanceRecordDraft {
        equipment_id,
        date: date(2024, 6, 1),
        description: "Preventive maintenance".to_string(),
        performed_by: "Service tech".to_string(),
        attachments: Vec::new(),
    }
}

pub(crate) fn issue_draft(equipment_id: EquipmentId) -> IssueReportDraft {
    IssueReportDraft {
        equipment_id,
        reported_by: "Technician".to_string(),
        reported_at: None,
        description: "Does not power on".to_string(),
        severity: IssueSeverity::Critical,
        attachments: Vec::new(),
        status: None,
    }
}

pub(crate) fn new_user(email: &str, role: Role, unit_name: Option<&str>) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        role,
        unit: unit_name.map(unit),
    }
}

/// The actor a stored account would act as after logging in.
pub(crate) fn actor_for(user: &UserAccount) -> Actor {
    Actor::new(user.id, user.role, user.unit.clone())
}
