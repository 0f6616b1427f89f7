//! Configuration loading and representation.

use chrono::Duration;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub invitation_ttl: Duration,
    pub reset_ttl: Duration,
    /// Base URL used to build invitation and reset links.
    pub frontend_base_url: String,
    pub admin_email: String,
    /// When set, the seeded admin gets this password instead of an invitation.
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl: Duration::minutes(480),
            invitation_ttl: Duration::hours(24),
            reset_ttl: Duration::hours(1),
            frontend_base_url: "http://localhost:5173".to_string(),
            admin_email: "admin@labtrack.local".to_string(),
            admin_password: None,
        }
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("invitation_ttl", &self.invitation_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .field("frontend_base_url", &self.frontend_base_url)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank variables
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            jwt_secret,
            jwt_ttl: positive("JWT_TTL_MINUTES", get("JWT_TTL_MINUTES"), Duration::try_minutes)?
                .unwrap_or(defaults.jwt_ttl),
            invitation_ttl: positive("INVITATION_TTL_HOURS", get("INVITATION_TTL_HOURS"), Duration::try_hours)?
                .unwrap_or(defaults.invitation_ttl),
            reset_ttl: positive("RESET_TTL_HOURS", get("RESET_TTL_HOURS"), Duration::try_hours)?
                .unwrap_or(defaults.reset_ttl),
            frontend_base_url: get("FRONTEND_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_base_url),
            admin_email: get("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: get("ADMIN_PASSWORD"),
        })
    }
}

fn positive(
    var: &'static str,
    raw: Option<String>,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    match value.parse::<i64>() {
        Ok(n) if n > 0 => match unit(n) {
            Some(duration) => Ok(Some(duration)),
            None => Err(ConfigError::Invalid {
                var,
                value,
                reason: "out of range".to_string(),
            }),
        },
        Ok(_) => Err(ConfigError::Invalid {
            var,
            value,
            reason: "must be positive".to_string(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            var,
            value,
            reason: e.to_string(),
        }),
    }
}
