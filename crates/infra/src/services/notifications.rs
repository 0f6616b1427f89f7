use std::sync::Arc;

use chrono::{DateTime, Utc};

use labtrack_auth::{Action, Actor, ResourceKind, ResourceRef, read_scope};
use labtrack_core::NotificationId;
use labtrack_equipment::{NewNotification, Notification};

use super::{ServiceError, guard};
use crate::Repository;

fn notification_ref(id: NotificationId) -> ResourceRef {
    ResourceRef::new(ResourceKind::Notification, None).with_id(id)
}

/// Global in-app notifications. Every user sees the same feed; only admins
/// create or delete entries by hand.
pub struct NotificationService {
    notifications: Arc<dyn Repository<Notification>>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn Repository<Notification>>) -> Self {
        Self { notifications }
    }

    fn load(&self, id: NotificationId) -> Result<Notification, ServiceError> {
        self.notifications
            .get(&id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Notification, id))
    }

    /// Newest first.
    pub fn list(&self, actor: &Actor) -> Result<Vec<Notification>, ServiceError> {
        read_scope(actor, ResourceKind::Notification)?;
        let mut all = self.notifications.list()?;
        all.reverse();
        Ok(all)
    }

    pub fn create(
        &self,
        actor: &Actor,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, ServiceError> {
        guard(actor, Action::Create, ResourceRef::new(ResourceKind::Notification, None))?;
        self.publish(notification, now)
    }

    pub fn mark_read(&self, actor: &Actor, id: NotificationId) -> Result<Notification, ServiceError> {
        let mut notification = self.load(id)?;
        guard(actor, Action::Update, notification_ref(id))?;

        notification.read = true;
        self.notifications.save(notification.clone())?;
        Ok(notification)
    }

    pub fn delete(&self, actor: &Actor, id: NotificationId) -> Result<(), ServiceError> {
        self.load(id)?;
        guard(actor, Action::Delete, notification_ref(id))?;
        self.notifications.delete(&id)?;

        tracing::info!(notification_id = %id, actor = %actor.id, "notification deleted");
        Ok(())
    }

    /// System-generated notification; no actor involved.
    pub fn publish(&self, notification: NewNotification, now: DateTime<Utc>) -> Result<Notification, ServiceError> {
        let notification = notification.into_notification(now)?;
        self.notifications.save(notification.clone())?;

        tracing::info!(notification_id = %notification.id, kind = ?notification.kind, "notification published");
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::*;
    use chrono::Duration;
    use labtrack_auth::AuthzError;
    use labtrack_equipment::NotificationKind;

    #[test]
    fn every_role_reads_and_marks_read() {
        let h = Harness::new();
        let n = h
            .notifications
            .publish(NewNotification::new(NotificationKind::Info, "Calibration due"), now())
            .unwrap();

        for actor in [admin(), unit_manager("genomics"), equipment_manager("chemistry")] {
            assert_eq!(h.notifications.list(&actor).unwrap().len(), 1);
        }
        let marked = h.notifications.mark_read(&equipment_manager("chemistry"), n.id).unwrap();
        assert!(marked.read);
        assert!(h.notifications.list(&admin()).unwrap()[0].read);
    }

    #[test]
    fn only_admin_creates_and_deletes() {
        let h = Harness::new();
        let um = unit_manager("genomics");
        assert!(matches!(
            h.notifications.create(&um, NewNotification::new(NotificationKind::Info, "hi"), now()),
            Err(ServiceError::PermissionDenied(AuthzError::PermissionDenied { .. }))
        ));

        let n = h
            .notifications
            .create(&admin(), NewNotification::new(NotificationKind::Success, "Backup done"), now())
            .unwrap();
        assert!(h.notifications.delete(&um, n.id).is_err());
        h.notifications.delete(&admin(), n.id).unwrap();
        assert!(h.notifications.list(&admin()).unwrap().is_empty());
    }

    #[test]
    fn malformed_actor_cannot_read_notifications() {
        let h = Harness::new();
        assert!(matches!(
            h.notifications.list(&malformed()),
            Err(ServiceError::PermissionDenied(AuthzError::MalformedActor { .. }))
        ));
    }

    #[test]
    fn feed_is_newest_first() {
        let h = Harness::new();
        h.notifications
            .publish(NewNotification::new(NotificationKind::Info, "older"), now())
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        h.notifications
            .publish(NewNotification::new(NotificationKind::Info, "newer"), now() + Duration::minutes(1))
            .unwrap();

        let feed = h.notifications.list(&admin()).unwrap();
        assert_eq!(feed[0].message, "newer");
    }

    #[test]
    fn unknown_notification_is_not_found() {
        let h = Harness::new();
        assert!(matches!(
            h.notifications.mark_read(&admin(), NotificationId::new()),
            Err(ServiceError::NotFound { .. })
        ));
    }
}
