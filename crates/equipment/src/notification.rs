use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labtrack_core::{DomainError, DomainResult, Entity, NotificationId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

/// An in-app notification. Notifications are not unit-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub details: Option<String>,
    /// In-app path the notification points to.
    pub link: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            link: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn into_notification(self, now: DateTime<Utc>) -> DomainResult<Notification> {
        if self.message.trim().is_empty() {
            return Err(DomainError::validation("message must not be empty"));
        }
        Ok(Notification {
            id: NotificationId::new(),
            kind: self.kind,
            message: self.message,
            details: self.details,
            link: self.link,
            timestamp: now,
            read: false,
        })
    }
}
