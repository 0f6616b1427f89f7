use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use labtrack_auth::{Argon2Hasher, CredentialHasher, Hs256Jwt, UserAccount};
use labtrack_equipment::{Equipment, IssueReport, MaintenanceRecord, Notification};
use labtrack_infra::services::{
    CredentialService, EquipmentService, IssueReportService, MaintenanceRecordService, NotificationService,
    ServiceError, UserService,
};
use labtrack_infra::{
    AppConfig, InMemoryRepository, InMemoryTokenStore, Mailer, Repository, TokenLifecycleManager, TokenSettings,
    seed_admin,
};

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub equipment: EquipmentService,
    pub maintenance: MaintenanceRecordService,
    pub issues: IssueReportService,
    pub notifications: Arc<NotificationService>,
    pub users: UserService,
    pub credentials: CredentialService,
    pub jwt: Arc<Hs256Jwt>,
    pub jwt_ttl: Duration,

    user_repo: Arc<dyn Repository<UserAccount>>,
    tokens: Arc<TokenLifecycleManager>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AppServices {
    /// Wire in-memory storage, the token lifecycle, and the services.
    pub fn build(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let equipment_repo: Arc<dyn Repository<Equipment>> = Arc::new(InMemoryRepository::<Equipment>::new());
        let maintenance_repo: Arc<dyn Repository<MaintenanceRecord>> = Arc::new(InMemoryRepository::<MaintenanceRecord>::new());
        let issue_repo: Arc<dyn Repository<IssueReport>> = Arc::new(InMemoryRepository::<IssueReport>::new());
        let notification_repo: Arc<dyn Repository<Notification>> = Arc::new(InMemoryRepository::<Notification>::new());
        let user_repo: Arc<dyn Repository<UserAccount>> = Arc::new(InMemoryRepository::<UserAccount>::new());
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());

        let tokens = Arc::new(TokenLifecycleManager::new(
            Arc::new(InMemoryTokenStore::new()),
            user_repo.clone(),
            mailer,
            TokenSettings::from_config(config),
        ));
        let notifications = Arc::new(NotificationService::new(notification_repo));

        Self {
            equipment: EquipmentService::new(equipment_repo.clone(), maintenance_repo.clone(), issue_repo.clone()),
            maintenance: MaintenanceRecordService::new(maintenance_repo, equipment_repo.clone()),
            issues: IssueReportService::new(issue_repo, equipment_repo, notifications.clone()),
            notifications,
            users: UserService::new(user_repo.clone(), tokens.clone()),
            credentials: CredentialService::new(user_repo.clone(), tokens.clone(), hasher.clone()),
            jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
            jwt_ttl: config.jwt_ttl,
            user_repo,
            tokens,
            hasher,
        }
    }

    /// Create the first admin on an empty user store.
    pub async fn seed(&self, config: &AppConfig, now: DateTime<Utc>) -> Result<bool, ServiceError> {
        seed_admin(config, self.user_repo.as_ref(), &self.tokens, self.hasher.as_ref(), now).await
    }
}
