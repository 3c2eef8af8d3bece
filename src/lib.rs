pub mod app;
pub mod chime;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod reminders;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use events::{spawn_event_log, Event, EventBus};
pub use notifications::NotificationCenter;
pub use reminders::ReminderStore;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
pub use state::AppState;
pub use storage::Storage;
