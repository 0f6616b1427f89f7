//! Infrastructure layer: storage, mail, configuration, and the services that
//! tie the policy engine, the scheduling calculator, and the token lifecycle
//! to persisted records.

pub mod config;
pub mod mail;
pub mod repository;
pub mod seed;
pub mod services;
pub mod token_store;
pub mod tokens;

pub use config::{AppConfig, ConfigError};
pub use mail::{InMemoryMailer, MailError, Mailer, OutgoingMail, TracingMailer};
pub use repository::{InMemoryRepository, Repository, StoreError};
pub use seed::seed_admin;
pub use token_store::{InMemoryTokenStore, TokenStore};
pub use tokens::{Delivery, IssuedToken, TokenError, TokenLifecycleManager, TokenSettings};
