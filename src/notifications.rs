use crate::events::{Event, EventBus};
use crate::models::{Notification, NotificationKind, ReminderModal, Toast};
use crate::storage::{Storage, NOTIFICATIONS_KEY};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

pub const DEFAULT_TOAST_MS: u64 = 3000;
pub const DEFAULT_RETENTION: usize = 200;

/// Owns delivered notifications plus the transient toast and modal surfaces.
pub struct NotificationCenter {
    storage: Storage,
    notifications: Vec<Notification>,
    next_id: u64,
    retention: usize,
    toasts: Vec<Toast>,
    next_toast_id: u64,
    modal: Option<ReminderModal>,
    events: EventBus,
}

impl NotificationCenter {
    pub async fn load(storage: Storage, retention: usize, events: EventBus) -> Self {
        let notifications: Vec<Notification> = storage.load_records(NOTIFICATIONS_KEY).await;
        let next_id = notifications
            .iter()
            .map(|n| n.id)
            .max()
            .map_or(1, |id| id + 1);
        let mut center = Self {
            storage,
            notifications,
            next_id,
            retention: retention.max(1),
            toasts: Vec::new(),
            next_toast_id: 1,
            modal: None,
            events,
        };
        center.enforce_retention();
        center
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn list_unread(&self) -> Vec<&Notification> {
        self.notifications.iter().filter(|n| !n.read).collect()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub async fn add(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Notification {
        self.add_at(title, message, kind, Local::now().naive_local())
            .await
    }

    pub async fn add_at(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        now: NaiveDateTime,
    ) -> Notification {
        let notification = Notification {
            id: self.next_id,
            title: title.into(),
            message: message.into(),
            kind,
            timestamp: now,
            read: false,
        };
        self.next_id += 1;
        self.notifications.push(notification.clone());
        self.enforce_retention();
        self.save().await;

        self.events.publish(Event::NotificationAdded {
            id: notification.id,
        });
        self.publish_badge();
        notification
    }

    /// Marks the notification read. Unknown ids and repeated calls are no-ops.
    pub async fn mark_read(&mut self, id: u64) -> bool {
        let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id && !n.read)
        else {
            return false;
        };
        notification.read = true;

        self.save().await;
        self.events.publish(Event::NotificationRead { id });
        self.publish_badge();
        true
    }

    pub async fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.save().await;
            self.publish_badge();
        }
        changed
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: NotificationKind, duration_ms: u64) -> Toast {
        self.show_toast_at(message, kind, duration_ms, Local::now().naive_local())
    }

    pub fn show_toast_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: u64,
        now: NaiveDateTime,
    ) -> Toast {
        self.toasts.retain(|toast| toast.is_visible(now));

        let toast = Toast {
            id: self.next_toast_id,
            message: message.into(),
            kind,
            shown_at: now,
            duration_ms,
        };
        self.next_toast_id += 1;
        self.toasts.push(toast.clone());

        self.events.publish(Event::ToastShown {
            toast: toast.clone(),
        });
        toast
    }

    pub fn active_toasts(&self, now: NaiveDateTime) -> Vec<&Toast> {
        self.toasts.iter().filter(|t| t.is_visible(now)).collect()
    }

    pub fn show_reminder_modal(&mut self, title: &str, message: &str, icon: &str) -> ReminderModal {
        self.show_reminder_modal_at(title, message, icon, Local::now().naive_local())
    }

    /// Shows the reminder modal, replacing any modal already on screen.
    pub fn show_reminder_modal_at(
        &mut self,
        title: &str,
        message: &str,
        icon: &str,
        now: NaiveDateTime,
    ) -> ReminderModal {
        let modal = ReminderModal {
            title: title.to_string(),
            message: message.to_string(),
            icon: icon.to_string(),
            shown_at: now,
        };
        if self.modal.replace(modal.clone()).is_some() {
            debug!("replaced reminder modal with '{title}'");
        }

        self.events.publish(Event::ModalShown {
            modal: modal.clone(),
        });
        modal
    }

    pub fn current_modal(&self) -> Option<&ReminderModal> {
        self.modal.as_ref()
    }

    pub fn dismiss_modal(&mut self) -> bool {
        let dismissed = self.modal.take().is_some();
        if dismissed {
            self.events.publish(Event::ModalDismissed);
        }
        dismissed
    }

    /// Drops the oldest notifications past the retention cap, read ones first.
    fn enforce_retention(&mut self) {
        while self.notifications.len() > self.retention {
            let index = self
                .notifications
                .iter()
                .position(|n| n.read)
                .unwrap_or(0);
            self.notifications.remove(index);
        }
    }

    fn publish_badge(&self) {
        self.events.publish(Event::BadgeChanged {
            unread: self.unread_count(),
        });
    }

    async fn save(&mut self) {
        if let Err(err) = self
            .storage
            .persist(NOTIFICATIONS_KEY, &self.notifications)
            .await
        {
            warn!("notifications are in-memory only for this session: {err}");
            self.storage = Storage::in_memory();
        }
    }
}

/// Renders how long ago `timestamp` was, relative to `now`.
pub fn format_relative(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = now - timestamp;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        timestamp.format("%-m/%-d/%Y").to_string()
    }
}
