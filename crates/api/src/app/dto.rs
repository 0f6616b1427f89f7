//! Request and response bodies that are not domain types themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labtrack_auth::{Role, UserAccount};
use labtrack_core::{UnitId, UserId};
use labtrack_infra::Delivery;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body of invitation activation and password reset.
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of an account. Never carries the credential hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub unit: Option<UnitId>,
    pub enabled: bool,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserView {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            unit: user.unit,
            enabled: user.enabled,
            must_change_password: user.must_change_password,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub user: UserView,
    pub invitation: DeliveryView,
}

#[derive(Debug, Serialize)]
pub struct DeliveryView {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Delivery> for DeliveryView {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Delivery::Delivered => Self {
                delivered: true,
                error: None,
            },
            Delivery::Failed(reason) => Self {
                delivered: false,
                error: Some(reason),
            },
        }
    }
}

/// Owner of a live invitation or reset token, as shown before the password
/// form is submitted.
#[derive(Debug, Serialize)]
pub struct TokenOwnerView {
    pub name: String,
    pub email: String,
}

impl From<UserAccount> for TokenOwnerView {
    fn from(user: UserAccount) -> Self {
        Self {
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub unit: Option<UnitId>,
}
