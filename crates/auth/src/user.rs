//! User accounts: the people who act on the system and the records the
//! policy engine guards as `ResourceKind::User`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labtrack_core::{DomainError, DomainResult, Entity, UnitId, UserId};

use crate::Role;

/// A persisted user account.
///
/// # Invariants
/// - `email` is trimmed, lower-cased and unique (uniqueness is checked by the
///   service against storage).
/// - `unit` is present iff `role` is not `Admin`.
/// - `enabled` stays false until a credential is established through an
///   invitation or reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub unit: Option<UnitId>,
    pub enabled: bool,
    pub must_change_password: bool,
    pub credential_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub unit: Option<UnitId>,
}

/// Editable profile fields. Credentials and activation flags are not part of
/// an update; they only change through the token lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub unit: Option<UnitId>,
}

pub fn normalize_email(email: &str) -> DomainResult<String> {
    let normalized = email.trim().to_lowercase();
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(normalized),
        _ => Err(DomainError::validation(format!("invalid email '{normalized}'"))),
    }
}

fn normalize_profile(
    name: String,
    email: &str,
    role: Role,
    unit: Option<UnitId>,
) -> DomainResult<(String, String, Option<UnitId>)> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    let email = normalize_email(email)?;
    let unit = match (role, unit) {
        (Role::Admin, _) => None,
        (_, Some(unit)) => Some(unit),
        (role, None) => {
            return Err(DomainError::invariant(format!("role {role} requires a unit")));
        }
    };
    Ok((name, email, unit))
}

impl NewUser {
    /// Build a fresh, disabled account with no credential.
    pub fn into_account(self, now: DateTime<Utc>) -> DomainResult<UserAccount> {
        let (name, email, unit) = normalize_profile(self.name, &self.email, self.role, self.unit)?;
        Ok(UserAccount {
            id: UserId::new(),
            name,
            email,
            role: self.role,
            unit,
            enabled: false,
            must_change_password: true,
            credential_hash: None,
            created_at: now,
        })
    }
}

impl UserAccount {
    /// Apply a profile update, keeping identity, credential and flags.
    pub fn updated(&self, update: UserUpdate) -> DomainResult<UserAccount> {
        let (name, email, unit) =
            normalize_profile(update.name, &update.email, update.role, update.unit)?;
        Ok(UserAccount {
            name,
            email,
            role: update.role,
            unit,
            ..self.clone()
        })
    }

    /// Establish a credential (activation or reset).
    pub fn establish_credential(&mut self, credential_hash: String) {
        self.credential_hash = Some(credential_hash);
        self.enabled = true;
        self.must_change_password = false;
    }

    /// Whether the account may log in at all.
    pub fn can_authenticate(&self) -> bool {
        self.enabled && self.credential_hash.is_some()
    }
}
