use std::sync::Arc;

use chrono::{DateTime, Utc};

use labtrack_auth::{Action, Actor, NewUser, ResourceKind, ResourceRef, TokenKind, UserAccount, UserUpdate, read_scope};
use labtrack_core::UserId;

use super::{ServiceError, guard};
use crate::{Delivery, Repository, TokenLifecycleManager};

fn user_ref(user: &UserAccount) -> ResourceRef {
    ResourceRef::new(ResourceKind::User, user.unit.clone()).with_id(user.id)
}

/// A newly created account and the fate of its invitation mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitedUser {
    pub user: UserAccount,
    pub delivery: Delivery,
}

pub struct UserService {
    users: Arc<dyn Repository<UserAccount>>,
    tokens: Arc<TokenLifecycleManager>,
}

impl UserService {
    pub fn new(users: Arc<dyn Repository<UserAccount>>, tokens: Arc<TokenLifecycleManager>) -> Self {
        Self { users, tokens }
    }

    fn load(&self, id: UserId) -> Result<UserAccount, ServiceError> {
        self.users
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::User, id))
    }

    fn ensure_unique_email(&self, email: &str, except: Option<UserId>) -> Result<(), ServiceError> {
        if self.users.list()?.iter().any(|u| Some(u.id) != except && u.email == email) {
            return Err(ServiceError::Conflict(format!("email '{email}' is already registered")));
        }
        Ok(())
    }

    pub fn list(&self, actor: &Actor) -> Result<Vec<UserAccount>, ServiceError> {
        let scope = read_scope(actor, ResourceKind::User)?;
        Ok(scope.retain(self.users.list()?, |u| u.unit.as_ref()))
    }

    pub fn get(&self, actor: &Actor, id: UserId) -> Result<UserAccount, ServiceError> {
        let user = self.load(id)?;
        guard(actor, Action::ReadOne, user_ref(&user))?;
        Ok(user)
    }

    /// Create a disabled account with no credential and invite it by mail.
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewUser,
        now: DateTime<Utc>,
    ) -> Result<InvitedUser, ServiceError> {
        let user = input.into_account(now)?;
        guard(actor, Action::Create, ResourceRef::new(ResourceKind::User, user.unit.clone()))?;
        self.ensure_unique_email(&user.email, None)?;
        self.users.save(user.clone())?;

        tracing::info!(user_id = %user.id, role = %user.role, actor = %actor.id, "user created");
        let issued = self.tokens.issue(&user, TokenKind::Invitation, now).await?;
        Ok(InvitedUser {
            user,
            delivery: issued.delivery,
        })
    }

    /// Profile update. Credential and activation state are untouched; moving
    /// the account to another unit (or promoting it to admin) also needs the
    /// right to create users there.
    pub fn update(&self, actor: &Actor, id: UserId, update: UserUpdate) -> Result<UserAccount, ServiceError> {
        let current = self.load(id)?;
        guard(actor, Action::Update, user_ref(&current))?;

        let updated = current.updated(update)?;
        if updated.unit != current.unit {
            guard(actor, Action::Create, ResourceRef::new(ResourceKind::User, updated.unit.clone()))?;
        }
        self.ensure_unique_email(&updated.email, Some(id))?;
        self.users.save(updated.clone())?;

        tracing::info!(user_id = %id, actor = %actor.id, "user updated");
        Ok(updated)
    }

    /// Delete the account and every token it still holds.
    pub fn delete(&self, actor: &Actor, id: UserId) -> Result<(), ServiceError> {
        let user = self.load(id)?;
        guard(actor, Action::Delete, user_ref(&user))?;

        self.users.delete(&id)?;
        let revoked = self.tokens.revoke_all(id)?;

        tracing::info!(user_id = %id, revoked_tokens = revoked, actor = %actor.id, "user deleted");
        Ok(())
    }

    /// Replace the pending invitation with a fresh one.
    pub async fn resend_invitation(
        &self,
        actor: &Actor,
        id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Delivery, ServiceError> {
        let user = self.load(id)?;
        guard(actor, Action::Update, user_ref(&user))?;
        if user.can_authenticate() {
            return Err(ServiceError::Conflict(format!("account {id} is already active")));
        }

        let issued = self.tokens.issue(&user, TokenKind::Invitation, now).await?;
        Ok(issued.delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenStore as _;
    use crate::services::testing::*;
    use labtrack_auth::Role;

    #[tokio::test]
    async fn created_user_is_disabled_and_invited() {
        let h = Harness::new();
        let created = h
            .users
            .create(&admin(), new_user("Bea@Lab.Example", Role::UnitManager, Some("genomics")), now())
            .await
            .unwrap();

        assert_eq!(created.delivery, Delivery::Delivered);
        assert!(!created.user.enabled);
        assert!(created.user.credential_hash.is_none());
        assert_eq!(created.user.email, "bea@lab.example");

        let mail = h.mailer.last_to("bea@lab.example").unwrap();
        assert!(mail.body.contains("/invite/"));
        assert_eq!(h.token_store.list_for_user(created.user.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unit_manager_creates_users_in_own_unit_only() {
        let h = Harness::new();
        let um = unit_manager("genomics");

        assert!(h
            .users
            .create(&um, new_user("a@lab.example", Role::EquipmentManager, Some("genomics")), now())
            .await
            .is_ok());
        assert!(matches!(
            h.users
                .create(&um, new_user("b@lab.example", Role::EquipmentManager, Some("chemistry")), now())
                .await,
            Err(ServiceError::PermissionDenied(_))
        ));
        // an admin account has no unit, so only admins may create one
        assert!(matches!(
            h.users.create(&um, new_user("c@lab.example", Role::Admin, None), now()).await,
            Err(ServiceError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn equipment_manager_cannot_create_users() {
        let h = Harness::new();
        assert!(matches!(
            h.users
                .create(
                    &equipment_manager("genomics"),
                    new_user("a@lab.example", Role::EquipmentManager, Some("genomics")),
                    now()
                )
                .await,
            Err(ServiceError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let h = Harness::new();
        h.users
            .create(&admin(), new_user("a@lab.example", Role::Admin, None), now())
            .await
            .unwrap();
        assert!(matches!(
            h.users.create(&admin(), new_user(" A@LAB.example", Role::Admin, None), now()).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn mail_failure_still_creates_the_user() {
        let h = Harness::new();
        h.mailer.set_failing(true);
        let created = h
            .users
            .create(&admin(), new_user("a@lab.example", Role::Admin, None), now())
            .await
            .unwrap();
        assert!(matches!(created.delivery, Delivery::Failed(_)));
        assert!(h.users.get(&admin(), created.user.id).is_ok());
    }

    #[tokio::test]
    async fn update_keeps_credential_and_checks_target_unit() {
        let h = Harness::new();
        let created = h
            .users
            .create(&admin(), new_user("a@lab.example", Role::EquipmentManager, Some("genomics")), now())
            .await
            .unwrap();
        let mut stored = h.user_repo.get(&created.user.id).unwrap().unwrap();
        stored.establish_credential("plain:secret".to_string());
        h.user_repo.save(stored).unwrap();

        let um = unit_manager("genomics");
        let promoted = h
            .users
            .update(
                &um,
                created.user.id,
                UserUpdate {
                    name: "Promoted".to_string(),
                    email: "a@lab.example".to_string(),
                    role: Role::UnitManager,
                    unit: Some(unit("genomics")),
                },
            )
            .unwrap();
        assert_eq!(promoted.role, Role::UnitManager);
        assert!(promoted.enabled);
        assert_eq!(promoted.credential_hash.as_deref(), Some("plain:secret"));

        let moved = h.users.update(
            &um,
            created.user.id,
            UserUpdate {
                name: "Moved".to_string(),
                email: "a@lab.example".to_string(),
                role: Role::UnitManager,
                unit: Some(unit("chemistry")),
            },
        );
        assert!(matches!(moved, Err(ServiceError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn delete_removes_tokens() {
        let h = Harness::new();
        let created = h
            .users
            .create(&admin(), new_user("a@lab.example", Role::Admin, None), now())
            .await
            .unwrap();
        let id = created.user.id;
        assert!(!h.token_store.list_for_user(id).unwrap().is_empty());

        h.users.delete(&admin(), id).unwrap();
        assert!(h.token_store.list_for_user(id).unwrap().is_empty());
        assert!(matches!(h.users.get(&admin(), id), Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_is_narrowed_and_hides_admins_from_unit_managers() {
        let h = Harness::new();
        for (email, role, unit) in [
            ("root@lab.example", Role::Admin, None),
            ("g@lab.example", Role::UnitManager, Some("genomics")),
            ("c@lab.example", Role::UnitManager, Some("chemistry")),
        ] {
            h.users.create(&admin(), new_user(email, role, unit), now()).await.unwrap();
        }

        let visible = h.users.list(&unit_manager("genomics")).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].email, "g@lab.example");
        assert_eq!(h.users.list(&admin()).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn resend_replaces_pending_invitation() {
        let h = Harness::new();
        let created = h
            .users
            .create(&admin(), new_user("a@lab.example", Role::Admin, None), now())
            .await
            .unwrap();
        let first = h.token_store.list_for_user(created.user.id).unwrap()[0].token.clone();

        let delivery = h.users.resend_invitation(&admin(), created.user.id, now()).await.unwrap();
        assert_eq!(delivery, Delivery::Delivered);

        let tokens = h.token_store.list_for_user(created.user.id).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_ne!(tokens[0].token, first);
    }

    #[tokio::test]
    async fn resend_to_active_account_conflicts() {
        let h = Harness::new();
        let created = h
            .users
            .create(&admin(), new_user("a@lab.example", Role::Admin, None), now())
            .await
            .unwrap();
        let mut stored = created.user.clone();
        stored.establish_credential("plain:x".to_string());
        h.user_repo.save(stored).unwrap();

        assert!(matches!(
            h.users.resend_invitation(&admin(), created.user.id, now()).await,
            Err(ServiceError::Conflict(_))
        ));
    }
}
