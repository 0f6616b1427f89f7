//! Single-use, time-boxed account tokens (invitation and password reset).
//!
//! Lifecycle per (user, kind): NONE -> LIVE -> CONSUMED, or LIVE -> EXPIRED.
//! Expiry is evaluated lazily against the caller's `now`; nothing sweeps.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use labtrack_core::{Entity, TokenId, UserId};

/// Length of generated token strings.
pub const TOKEN_LENGTH: usize = 48;

/// Which flow a token belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Invitation,
    PasswordReset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Invitation => "invitation",
            TokenKind::PasswordReset => "password_reset",
        }
    }
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored token row.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountToken {
    pub id: TokenId,
    pub user_id: UserId,
    pub kind: TokenKind,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// Token strings are bearer secrets; keep them out of logs.
impl core::fmt::Debug for AccountToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountToken")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("kind", &self.kind)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Entity for AccountToken {
    type Id = TokenId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AccountToken {
    /// Mint a fresh token for `user_id` expiring `ttl` after `now`.
    pub fn issue(user_id: UserId, kind: TokenKind, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: TokenId::new(),
            user_id,
            kind,
            token: generate_token_string(),
            expires_at: now + ttl,
        }
    }

    /// Live means unexpired; consumed tokens no longer exist in storage.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Unguessable token string from the thread-local CSPRNG.
pub fn generate_token_string() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
