use std::sync::Arc;

use chrono::{DateTime, Utc};

use labtrack_auth::{
    Actor, CredentialHasher, ResourceKind, TokenKind, UserAccount, normalize_email, validate_new_password,
};

use super::ServiceError;
use crate::{Delivery, Repository, TokenLifecycleManager};

/// Login, password reset, invitation acceptance, and password change.
pub struct CredentialService {
    users: Arc<dyn Repository<UserAccount>>,
    tokens: Arc<TokenLifecycleManager>,
    hasher: Arc<dyn CredentialHasher>,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn Repository<UserAccount>>,
        tokens: Arc<TokenLifecycleManager>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self { users, tokens, hasher }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, ServiceError> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };
        Ok(self.users.list()?.into_iter().find(|u| u.email == email))
    }

    /// Check an email/password pair. Unknown accounts, disabled accounts, and
    /// wrong passwords are indistinguishable to the caller.
    pub fn login(&self, email: &str, password: &str) -> Result<UserAccount, ServiceError> {
        let user = self.find_by_email(email)?.ok_or(ServiceError::InvalidCredentials)?;
        let verified = match (&user.credential_hash, user.enabled) {
            (Some(hash), true) => self.hasher.verify(password, hash),
            _ => false,
        };
        if !verified {
            tracing::info!(user_id = %user.id, "login rejected");
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "login accepted");
        Ok(user)
    }

    /// Mail a reset link if the email belongs to an account. Unknown emails
    /// succeed silently with `None`; otherwise the mail outcome is returned.
    pub async fn request_password_reset(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Delivery>, ServiceError> {
        let Some(user) = self.find_by_email(email)? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(None);
        };
        let issued = self.tokens.issue(&user, TokenKind::PasswordReset, now).await?;
        Ok(Some(issued.delivery))
    }

    /// The account a live token of `kind` belongs to.
    pub fn validate_token(&self, kind: TokenKind, token: &str, now: DateTime<Utc>) -> Result<UserAccount, ServiceError> {
        let live = self
            .tokens
            .validate(kind, token, now)?
            .ok_or(ServiceError::InvalidOrExpiredToken)?;
        self.users.get(&live.user_id)?.ok_or(ServiceError::InvalidOrExpiredToken)
    }

    /// Accept an invitation by choosing a password.
    pub fn activate(&self, token: &str, password: &str, now: DateTime<Utc>) -> Result<UserAccount, ServiceError> {
        self.establish(TokenKind::Invitation, token, password, now)
    }

    pub fn reset_password(&self, token: &str, password: &str, now: DateTime<Utc>) -> Result<UserAccount, ServiceError> {
        self.establish(TokenKind::PasswordReset, token, password, now)
    }

    fn establish(
        &self,
        kind: TokenKind,
        token: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, ServiceError> {
        validate_new_password(password)?;
        if self.tokens.validate(kind, token, now)?.is_none() {
            return Err(ServiceError::InvalidOrExpiredToken);
        }
        let hash = self.hasher.hash(password)?;
        Ok(self.tokens.consume(kind, token, hash, now)?)
    }

    /// Change the caller's own password. Pending invitation and reset tokens
    /// are revoked.
    pub fn change_password(&self, actor: &Actor, current: &str, new: &str) -> Result<(), ServiceError> {
        validate_new_password(new)?;
        let mut user = self
            .users
            .get(&actor.id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::User, actor.id))?;

        let verified = user
            .credential_hash
            .as_deref()
            .is_some_and(|hash| self.hasher.verify(current, hash));
        if !verified {
            return Err(ServiceError::InvalidCredentials);
        }

        user.establish_credential(self.hasher.hash(new)?);
        self.users.save(user)?;
        self.tokens.revoke_all(actor.id)?;

        tracing::info!(user_id = %actor.id, "password changed");
        Ok(())
    }
}
