use labtrack_auth::{Actor, JwtClaims};

/// Authenticated caller of a request, resolved from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
    email: String,
}

impl ActorContext {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            actor: claims.actor(),
            email: claims.email.clone(),
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
