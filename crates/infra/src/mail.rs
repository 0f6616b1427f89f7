//! Outgoing mail boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

#[async_trait]
impl<M> Mailer for Arc<M>
where
    M: Mailer + ?Sized,
{
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        (**self).send(mail).await
    }
}

/// Delivery stub that records the envelope in the log.
///
/// The body carries a bearer link and is never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail handed to transport");
        Ok(())
    }
}

/// Outbox mailer for tests/dev. Can be switched to fail every send.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    outbox: Mutex<Vec<OutgoingMail>>,
    failing: AtomicBool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Mails delivered so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.clone(),
            Err(_) => vec![],
        }
    }

    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Transport("outbox configured to fail".to_string()));
        }
        self.outbox
            .lock()
            .map_err(|_| MailError::Transport("outbox lock poisoned".to_string()))?
            .push(mail);
        Ok(())
    }
}
