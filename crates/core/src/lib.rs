//! `labtrack-core`: shared domain building blocks.
//!
//! Identifiers, the unit scoping boundary, and the domain error model. No
//! infrastructure concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod unit;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EquipmentId, IssueReportId, MaintenanceRecordId, NotificationId, TokenId, UserId};
pub use unit::UnitId;
