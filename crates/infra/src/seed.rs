//! First-run bootstrap.

use chrono::{DateTime, Utc};

use labtrack_auth::{CredentialHasher, NewUser, Role, TokenKind, UserAccount, validate_new_password};

use crate::services::ServiceError;
use crate::{AppConfig, Delivery, Repository, TokenLifecycleManager};

/// Create the first admin when no user exists yet. Returns whether an
/// account was created.
///
/// With `admin_password` configured the admin can log in right away and is
/// asked to change the password; otherwise it is invited by mail like any
/// other account.
pub async fn seed_admin(
    config: &AppConfig,
    users: &dyn Repository<UserAccount>,
    tokens: &TokenLifecycleManager,
    hasher: &dyn CredentialHasher,
    now: DateTime<Utc>,
) -> Result<bool, ServiceError> {
    if !users.list()?.is_empty() {
        return Ok(false);
    }

    let mut admin = NewUser {
        name: "Administrator".to_string(),
        email: config.admin_email.clone(),
        role: Role::Admin,
        unit: None,
    }
    .into_account(now)?;

    match config.admin_password.as_deref() {
        Some(password) => {
            validate_new_password(password)?;
            admin.establish_credential(hasher.hash(password)?);
            admin.must_change_password = true;
            users.save(admin.clone())?;
            tracing::info!(user_id = %admin.id, email = %admin.email, "seeded admin with configured password");
        }
        None => {
            users.save(admin.clone())?;
            let issued = tokens.issue(&admin, TokenKind::Invitation, now).await?;
            if let Delivery::Failed(reason) = issued.delivery {
                tracing::warn!(user_id = %admin.id, %reason, "seeded admin invitation not delivered");
            }
            tracing::info!(user_id = %admin.id, email = %admin.email, "seeded admin; invitation issued");
        }
    }
    Ok(true)
}
