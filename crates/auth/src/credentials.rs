//! Credential acceptance rules and the hashing boundary.
//!
//! Plaintext never leaves this module except as input to [`CredentialHasher`].

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use thiserror::Error;

/// Minimum length of a new password, in characters (not bytes).
pub const MIN_PASSWORD_CHARS: usize = 12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password must be at least {min} characters long")]
    Weak { min: usize },

    #[error("credential hashing failed: {0}")]
    Hashing(String),
}

/// Check a new password against the acceptance rule.
///
/// Must run before any token is consumed or any hash is computed.
pub fn validate_new_password(password: &str) -> Result<(), CredentialError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(CredentialError::Weak {
            min: MIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

/// Opaque one-way credential hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;

    /// `false` for a mismatch and for an unparseable stored hash.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id hasher producing PHC strings with a random salt.
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher {
    argon: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

impl<H> CredentialHasher for std::sync::Arc<H>
where
    H: CredentialHasher + ?Sized,
{
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        (**self).hash(plaintext)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        (**self).verify(plaintext, hash)
    }
}
