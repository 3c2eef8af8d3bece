use crate::events::EventBus;
use crate::notifications::NotificationCenter;
use crate::reminders::ReminderStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub reminders: Arc<Mutex<ReminderStore>>,
    pub notifications: Arc<Mutex<NotificationCenter>>,
    pub events: EventBus,
}

impl AppState {
    pub fn new(reminders: ReminderStore, notifications: NotificationCenter, events: EventBus) -> Self {
        Self {
            reminders: Arc::new(Mutex::new(reminders)),
            notifications: Arc::new(Mutex::new(notifications)),
            events,
        }
    }
}
