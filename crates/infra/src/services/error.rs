use thiserror::Error;

use labtrack_auth::{AuthzError, CredentialError, ResourceKind};
use labtrack_core::DomainError;

use crate::{StoreError, TokenError};

/// Failure of a service operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: String },

    /// Policy denial, including a malformed actor.
    #[error(transparent)]
    PermissionDenied(AuthzError),

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("password must be at least {min} characters long")]
    WeakCredential { min: usize },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("credential processing failed: {0}")]
    Credential(String),
}

impl ServiceError {
    pub fn not_found(kind: ResourceKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::PermissionDenied(value)
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::InvalidOrExpired => ServiceError::InvalidOrExpiredToken,
            TokenError::Store(e) => ServiceError::Store(e),
        }
    }
}

impl From<CredentialError> for ServiceError {
    fn from(value: CredentialError) -> Self {
        match value {
            CredentialError::Weak { min } => ServiceError::WeakCredential { min },
            CredentialError::Hashing(msg) => ServiceError::Credential(msg),
        }
    }
}
