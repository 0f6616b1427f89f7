//! Token lifecycle manager: issue, validate, and consume invitation and
//! password-reset tokens.
//!
//! A user holds at most one token. It goes NONE -> LIVE on issue, LIVE ->
//! CONSUMED when a credential is established, and LIVE -> EXPIRED by the
//! passage of time. Issuing any kind replaces whatever token the user held.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use labtrack_auth::{AccountToken, TokenKind, UserAccount};
use labtrack_core::UserId;

use crate::{AppConfig, Mailer, OutgoingMail, Repository, StoreError, TokenStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Unknown, expired, already consumed, or of the wrong kind. Callers
    /// cannot tell these apart.
    #[error("invalid or expired token")]
    InvalidOrExpired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of the notification step of an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(String),
}

/// A freshly issued token and whether its mail went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: AccountToken,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub invitation_ttl: Duration,
    pub reset_ttl: Duration,
    pub frontend_base_url: String,
}

impl TokenSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            invitation_ttl: config.invitation_ttl,
            reset_ttl: config.reset_ttl,
            frontend_base_url: config.frontend_base_url.clone(),
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Invitation => self.invitation_ttl,
            TokenKind::PasswordReset => self.reset_ttl,
        }
    }

    fn link(&self, kind: TokenKind, token: &str) -> String {
        match kind {
            TokenKind::Invitation => format!("{}/invite/{token}", self.frontend_base_url),
            TokenKind::PasswordReset => format!("{}/reset-password?token={token}", self.frontend_base_url),
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct TokenLifecycleManager {
    tokens: Arc<dyn TokenStore>,
    users: Arc<dyn Repository<UserAccount>>,
    mailer: Arc<dyn Mailer>,
    settings: TokenSettings,
}

impl TokenLifecycleManager {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        users: Arc<dyn Repository<UserAccount>>,
        mailer: Arc<dyn Mailer>,
        settings: TokenSettings,
    ) -> Self {
        Self {
            tokens,
            users,
            mailer,
            settings,
        }
    }

    /// Mint a token for `user`, replacing every token the user still holds,
    /// then mail the link.
    ///
    /// A mail failure is reported in [`IssuedToken::delivery`]; the stored
    /// token stays valid and can still be consumed.
    pub async fn issue(
        &self,
        user: &UserAccount,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let token = AccountToken::issue(user.id, kind, now, self.settings.ttl(kind));
        self.tokens.replace_for_user(token.clone())?;

        let delivery = match self.mailer.send(self.compose(user, &token)).await {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                tracing::warn!(user_id = %user.id, kind = %kind, error = %e, "token mail not delivered");
                Delivery::Failed(e.to_string())
            }
        };

        tracing::info!(user_id = %user.id, kind = %kind, expires_at = %token.expires_at, "token issued");
        Ok(IssuedToken { token, delivery })
    }

    /// Look up a live token of `kind`. Never mutates; an expired token stays
    /// stored until it is replaced or the user's tokens are cleared.
    pub fn validate(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountToken>, TokenError> {
        let found = self
            .tokens
            .find_by_token(token)?
            .filter(|t| t.kind == kind && t.is_live(now));
        if found.is_none() {
            tracing::debug!(kind = %kind, "token lookup missed");
        }
        Ok(found)
    }

    /// Spend a live token of `kind` to establish `credential_hash` on its
    /// user. The user ends up enabled, with no pending password change and
    /// no tokens left.
    pub fn consume(
        &self,
        kind: TokenKind,
        token: &str,
        credential_hash: String,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, TokenError> {
        let live = self.validate(kind, token, now)?.ok_or(TokenError::InvalidOrExpired)?;

        // Removing the presented token is the claim: a concurrent consume, or
        // a reissue in between, leaves nothing to take.
        match self.tokens.take(token)? {
            Some(claimed) if claimed.id == live.id => {}
            _ => return Err(TokenError::InvalidOrExpired),
        }
        self.tokens.delete_all_for_user(live.user_id)?;

        let mut user = self.users.get(&live.user_id)?.ok_or(TokenError::InvalidOrExpired)?;
        user.establish_credential(credential_hash);
        self.users.save(user.clone())?;

        tracing::info!(user_id = %user.id, kind = %kind, "token consumed; credential established");
        Ok(user)
    }

    /// Drop every token of the user (account deletion, password change).
    pub fn revoke_all(&self, user_id: UserId) -> Result<usize, TokenError> {
        Ok(self.tokens.delete_all_for_user(user_id)?.len())
    }

    fn compose(&self, user: &UserAccount, token: &AccountToken) -> OutgoingMail {
        let link = self.settings.link(token.kind, &token.token);
        let validity = describe_ttl(self.settings.ttl(token.kind));
        let (subject, intro) = match token.kind {
            TokenKind::Invitation => (
                "You have been invited to LabTrack",
                "An account has been created for you. Set your password to activate it:",
            ),
            TokenKind::PasswordReset => (
                "LabTrack password reset",
                "We received a request to reset your password. Choose a new one here:",
            ),
        };

        OutgoingMail {
            to: user.email.clone(),
            subject: subject.to_string(),
            body: format!(
                "Hello {},\n\n{intro}\n\n{link}\n\nThis link is valid for {validity} and can be used once.\n",
                user.name
            ),
        }
    }
}

fn describe_ttl(ttl: Duration) -> String {
    let hours = ttl.num_hours();
    match hours {
        1 => "1 hour".to_string(),
        h if h > 1 => format!("{h} hours"),
        _ => format!("{} minutes", ttl.num_minutes()),
    }
}
