//! `labtrack-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it holds the
//! role model, the unit-scoped policy engine, credential rules, and the pure
//! parts of the account token lifecycle.

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, Decision, DenyReason, ReadScope, authorize, decide, read_scope};
pub use claims::{Hs256Jwt, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use credentials::{
    Argon2Hasher, CredentialError, CredentialHasher, MIN_PASSWORD_CHARS, validate_new_password,
};
pub use permissions::{Action, ResourceKind, ResourceRef};
pub use principal::{Actor, ActorScope};
pub use roles::Role;
pub use token::{AccountToken, TOKEN_LENGTH, TokenKind, generate_token_string};
pub use user::{NewUser, UserAccount, UserUpdate, normalize_email};
