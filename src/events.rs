use crate::models::{ReminderModal, Toast};
use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// State changes published by the reminder store, the notification center
/// and the scheduler. Presentation layers subscribe and re-render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    ReminderAdded { id: u64 },
    ReminderDeleted { id: u64 },
    ReminderCompleted { id: u64 },
    ReminderFired { id: u64, at: NaiveDateTime },
    NotificationAdded { id: u64 },
    NotificationRead { id: u64 },
    BadgeChanged { unread: usize },
    ToastShown { toast: Toast },
    ModalShown { modal: ReminderModal },
    ModalDismissed,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

/// Logs every published event until the bus is dropped.
pub fn spawn_event_log(mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(?event, "event"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("event log lagged, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
