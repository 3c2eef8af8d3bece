use crate::chime::Chime;
use crate::errors::ReminderError;
use crate::events::{Event, EventBus};
use crate::models::{Frequency, NotificationKind, Reminder, ReminderKind, TimeOfDay};
use crate::notifications::NotificationCenter;
use crate::reminders::ReminderStore;
use chrono::{Datelike, Local, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const REMINDER_TOAST_MS: u64 = 5000;
const WEEKLY_COOLDOWN_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    /// Extra minutes after `reminder.time` during which a reminder still
    /// matches. Zero means the exact minute only.
    pub grace_minutes: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            grace_minutes: 0,
        }
    }
}

/// Polls the reminder store and delivers due reminders to the
/// notification center. Fire history lives only as long as the scheduler.
pub struct Scheduler {
    reminders: Arc<Mutex<ReminderStore>>,
    notifications: Arc<Mutex<NotificationCenter>>,
    chime: Arc<dyn Chime>,
    events: EventBus,
    config: SchedulerConfig,
    last_fired: HashMap<u64, NaiveDateTime>,
}

impl Scheduler {
    pub fn new(
        reminders: Arc<Mutex<ReminderStore>>,
        notifications: Arc<Mutex<NotificationCenter>>,
        chime: Arc<dyn Chime>,
        events: EventBus,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            reminders,
            notifications,
            chime,
            events,
            config,
            last_fired: HashMap::new(),
        }
    }

    pub fn last_fired(&self, id: u64) -> Option<NaiveDateTime> {
        self.last_fired.get(&id).copied()
    }

    pub async fn tick(&mut self) -> Vec<u64> {
        self.tick_at(Local::now().naive_local()).await
    }

    /// Evaluates every active reminder against `now` and fires the due ones.
    /// Returns the ids that fired.
    pub async fn tick_at(&mut self, now: NaiveDateTime) -> Vec<u64> {
        let due: Vec<Reminder> = {
            let store = self.reminders.lock().await;
            let active = store.list_active();
            self.last_fired
                .retain(|id, _| active.iter().any(|reminder| reminder.id == *id));
            active
                .into_iter()
                .filter(|reminder| {
                    let last = self.last_fired.get(&reminder.id).copied();
                    match should_fire(reminder, now, last, self.config.grace_minutes) {
                        Ok(fire) => fire,
                        Err(err) => {
                            warn!("skipping reminder: {err}");
                            false
                        }
                    }
                })
                .cloned()
                .collect()
        };

        let mut fired = Vec::with_capacity(due.len());
        for reminder in due {
            self.last_fired.insert(reminder.id, now);
            self.deliver(&reminder, now).await;
            fired.push(reminder.id);
        }
        fired
    }

    async fn deliver(&self, reminder: &Reminder, now: NaiveDateTime) {
        info!(id = reminder.id, "reminder triggered: {}", reminder.title);

        {
            let mut center = self.notifications.lock().await;
            center.show_toast_at(
                format!("⏰ {}", reminder.message),
                NotificationKind::Info,
                REMINDER_TOAST_MS,
                now,
            );
            center
                .add_at(
                    format!("🔔 {}", reminder.title),
                    reminder.message.clone(),
                    NotificationKind::Info,
                    now,
                )
                .await;
            if reminder.kind == ReminderKind::Preset {
                center.show_reminder_modal_at(&reminder.title, &reminder.message, reminder.icon(), now);
            }
        }

        self.events.publish(Event::ReminderFired {
            id: reminder.id,
            at: now,
        });

        if let Err(err) = self.chime.play() {
            debug!("chime failed: {err}");
        }
    }

    /// Runs the scheduler on the tokio runtime: one evaluation right away,
    /// then one per interval until the handle is stopped or dropped.
    pub fn spawn(mut self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                "reminder scheduler started (interval: {}s)",
                self.config.interval.as_secs()
            );

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {
                        let fired = self.tick().await;
                        debug!("scheduler tick fired {} reminders", fired.len());
                    }
                }
            }

            info!("reminder scheduler stopped");
        });

        SchedulerHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

pub struct SchedulerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops polling and waits for the task to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            warn!("reminder scheduler task ended abnormally: {err}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Decides whether `reminder` fires at `now`, given when it last fired in
/// this session.
pub fn should_fire(
    reminder: &Reminder,
    now: NaiveDateTime,
    last_fired: Option<NaiveDateTime>,
    grace_minutes: u32,
) -> Result<bool, ReminderError> {
    if !reminder.is_active() {
        return Ok(false);
    }
    if !time_matches(reminder.time, now, grace_minutes) {
        return Ok(false);
    }

    let today = now.date();
    let fire = match reminder.frequency {
        Frequency::Once => last_fired.is_none(),
        Frequency::Daily => last_fired.is_none_or(|last| last.date() != today),
        Frequency::Weekly => {
            let day = reminder.day.filter(|d| *d <= 6).ok_or_else(|| {
                ReminderError::Inconsistent {
                    id: reminder.id,
                    reason: "weekly reminder without a valid day".to_string(),
                }
            })?;
            let weekday = now.weekday().num_days_from_sunday() as u8;
            day == weekday
                && last_fired
                    .is_none_or(|last| (now - last).num_days() >= WEEKLY_COOLDOWN_DAYS)
        }
        Frequency::Monthly => {
            now.day() == 1
                && last_fired
                    .is_none_or(|last| last.year() != now.year() || last.month() != now.month())
        }
    };
    Ok(fire)
}

fn time_matches(time: TimeOfDay, now: NaiveDateTime, grace_minutes: u32) -> bool {
    let target = time.minutes_since_midnight();
    let current = TimeOfDay::of(now).minutes_since_midnight();
    current >= target && current - target <= grace_minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewReminder, Preset};
    use crate::notifications::DEFAULT_RETENTION;
    use crate::storage::Storage;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingChime(AtomicUsize);

    impl Chime for CountingChime {
        fn play(&self) -> std::io::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("no audio device"))
        }
    }

    fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn reminder(frequency: Frequency, time: &str, day: Option<u8>) -> Reminder {
        Reminder {
            id: 1,
            title: "t".to_string(),
            message: "m".to_string(),
            frequency,
            time: time.parse().unwrap(),
            day,
            kind: ReminderKind::Custom,
            preset: None,
            enabled: true,
            completed: false,
            created_at: at(2026, 1, 1, 0, 0),
            completed_at: None,
        }
    }

    async fn setup(
        chime: Arc<dyn Chime>,
    ) -> (Arc<Mutex<ReminderStore>>, Arc<Mutex<NotificationCenter>>, Scheduler) {
        let events = EventBus::default();
        let store = Arc::new(Mutex::new(
            ReminderStore::load(Storage::in_memory(), events.clone()).await,
        ));
        let center = Arc::new(Mutex::new(
            NotificationCenter::load(Storage::in_memory(), DEFAULT_RETENTION, events.clone()).await,
        ));
        let scheduler = Scheduler::new(
            store.clone(),
            center.clone(),
            chime,
            events,
            SchedulerConfig::default(),
        );
        (store, center, scheduler)
    }

    #[test]
    fn exact_minute_required_without_grace() {
        let r = reminder(Frequency::Daily, "09:00", None);
        assert!(should_fire(&r, at(2026, 10, 19, 9, 0), None, 0).unwrap());
        assert!(!should_fire(&r, at(2026, 10, 19, 8, 59), None, 0).unwrap());
        assert!(!should_fire(&r, at(2026, 10, 19, 9, 1), None, 0).unwrap());
    }

    #[test]
    fn grace_window_widens_match_forward_only() {
        let r = reminder(Frequency::Daily, "09:00", None);
        assert!(should_fire(&r, at(2026, 10, 19, 9, 3), None, 5).unwrap());
        assert!(should_fire(&r, at(2026, 10, 19, 9, 5), None, 5).unwrap());
        assert!(!should_fire(&r, at(2026, 10, 19, 9, 6), None, 5).unwrap());
        assert!(!should_fire(&r, at(2026, 10, 19, 8, 59), None, 5).unwrap());
    }

    #[test]
    fn daily_fires_once_per_calendar_date() {
        let r = reminder(Frequency::Daily, "09:00", None);
        let day1 = at(2026, 10, 19, 9, 0);
        assert!(!should_fire(&r, day1, Some(day1), 0).unwrap());
        assert!(should_fire(&r, at(2026, 10, 20, 9, 0), Some(day1), 0).unwrap());
    }

    #[test]
    fn weekly_needs_matching_day_and_seven_days() {
        let r = reminder(Frequency::Weekly, "08:00", Some(3));
        let wednesday = at(2026, 10, 21, 8, 0);
        assert!(!should_fire(&r, at(2026, 10, 20, 8, 0), None, 0).unwrap());
        assert!(should_fire(&r, wednesday, None, 0).unwrap());
        assert!(!should_fire(&r, wednesday, Some(wednesday), 0).unwrap());
        assert!(should_fire(&r, at(2026, 10, 28, 8, 0), Some(wednesday), 0).unwrap());
        // Fired a minute later last week: not yet seven whole days.
        let late = wednesday + ChronoDuration::minutes(1);
        assert!(!should_fire(&r, at(2026, 10, 28, 8, 0), Some(late), 0).unwrap());
    }

    #[test]
    fn weekly_without_day_is_inconsistent() {
        let r = reminder(Frequency::Weekly, "08:00", None);
        let err = should_fire(&r, at(2026, 10, 21, 8, 0), None, 0).unwrap_err();
        assert!(matches!(err, ReminderError::Inconsistent { id: 1, .. }));
    }

    #[test]
    fn monthly_only_on_first_and_once_per_month() {
        let r = reminder(Frequency::Monthly, "20:00", None);
        let nov_first = at(2026, 11, 1, 20, 0);
        assert!(!should_fire(&r, at(2026, 11, 2, 20, 0), None, 0).unwrap());
        assert!(should_fire(&r, nov_first, None, 0).unwrap());
        assert!(!should_fire(&r, nov_first, Some(nov_first), 0).unwrap());
        assert!(should_fire(&r, at(2026, 12, 1, 20, 0), Some(nov_first), 0).unwrap());
        assert!(should_fire(&r, at(2027, 11, 1, 20, 0), Some(nov_first), 0).unwrap());
    }

    #[test]
    fn once_fires_only_without_history() {
        let r = reminder(Frequency::Once, "07:30", None);
        let first = at(2026, 10, 19, 7, 30);
        assert!(should_fire(&r, first, None, 0).unwrap());
        assert!(!should_fire(&r, at(2026, 10, 20, 7, 30), Some(first), 0).unwrap());
    }

    #[test]
    fn inactive_reminders_never_fire() {
        let mut r = reminder(Frequency::Daily, "09:00", None);
        r.enabled = false;
        assert!(!should_fire(&r, at(2026, 10, 19, 9, 0), None, 0).unwrap());
        r.enabled = true;
        r.completed = true;
        assert!(!should_fire(&r, at(2026, 10, 19, 9, 0), None, 0).unwrap());
    }

    #[tokio::test]
    async fn tick_delivers_toast_notification_and_chime() {
        let chime = Arc::new(CountingChime::default());
        let (store, center, mut scheduler) = setup(chime.clone()).await;
        let r = store
            .lock()
            .await
            .add(NewReminder::custom("Log Expenses", "msg", Frequency::Daily, "09:00"))
            .await
            .unwrap();

        let now = at(2026, 10, 19, 9, 0);
        assert_eq!(scheduler.tick_at(now).await, vec![r.id]);
        assert_eq!(scheduler.last_fired(r.id), Some(now));
        assert_eq!(chime.0.load(Ordering::SeqCst), 1);

        let center = center.lock().await;
        assert_eq!(center.unread_count(), 1);
        assert_eq!(center.all()[0].title, "🔔 Log Expenses");
        let toasts = center.active_toasts(now);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "⏰ msg");
        assert_eq!(toasts[0].duration_ms, REMINDER_TOAST_MS);
        assert!(center.current_modal().is_none());
    }

    #[tokio::test]
    async fn preset_fire_opens_modal_with_icon() {
        let (store, center, mut scheduler) = setup(Arc::new(crate::chime::Silent)).await;
        store
            .lock()
            .await
            .enable_preset(Preset::MonthlySavings, Some("20:00"), None)
            .await
            .unwrap();

        scheduler.tick_at(at(2026, 11, 1, 20, 0)).await;
        let center = center.lock().await;
        let modal = center.current_modal().unwrap();
        assert_eq!(modal.title, "Monthly Savings Review");
        assert_eq!(modal.icon, "💙");
    }

    #[tokio::test]
    async fn one_bad_record_does_not_block_others() {
        let (store, center, mut scheduler) = setup(Arc::new(crate::chime::Silent)).await;
        let mut broken = reminder(Frequency::Weekly, "09:00", None);
        broken.id = 50;
        let good = reminder(Frequency::Daily, "09:00", None);
        *store.lock().await = ReminderStore::from_records(
            Storage::in_memory(),
            vec![broken, good],
            EventBus::default(),
        );

        let fired = scheduler.tick_at(at(2026, 10, 21, 9, 0)).await;
        assert_eq!(fired, vec![1]);
        assert_eq!(center.lock().await.unread_count(), 1);
    }

    #[tokio::test]
    async fn deleted_and_completed_reminders_stop_firing() {
        let (store, center, mut scheduler) = setup(Arc::new(crate::chime::Silent)).await;
        let (a, b) = {
            let mut store = store.lock().await;
            let a = store
                .add(NewReminder::custom("a", "m", Frequency::Daily, "09:00"))
                .await
                .unwrap();
            let b = store
                .add(NewReminder::custom("b", "m", Frequency::Daily, "09:00"))
                .await
                .unwrap();
            (a, b)
        };
        {
            let mut store = store.lock().await;
            store.delete(a.id).await;
            store.mark_done(b.id).await;
        }

        assert!(scheduler.tick_at(at(2026, 10, 19, 9, 0)).await.is_empty());
        assert_eq!(center.lock().await.unread_count(), 0);
    }

    #[tokio::test]
    async fn fire_history_is_dropped_for_removed_reminders() {
        let (store, _center, mut scheduler) = setup(Arc::new(crate::chime::Silent)).await;
        let first = store
            .lock()
            .await
            .enable_preset(Preset::DailyExpense, Some("09:00"), None)
            .await
            .unwrap();
        let now = at(2026, 10, 19, 9, 0);
        scheduler.tick_at(now).await;
        assert_eq!(scheduler.last_fired(first.id), Some(now));

        let second = store
            .lock()
            .await
            .enable_preset(Preset::DailyExpense, Some("18:00"), None)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        scheduler.tick_at(at(2026, 10, 19, 9, 1)).await;
        assert_eq!(scheduler.last_fired(first.id), None);
        assert!(scheduler.last_fired.is_empty());
    }

    #[tokio::test]
    async fn spawned_scheduler_stops_on_request() {
        let (_store, _center, scheduler) = setup(Arc::new(crate::chime::Silent)).await;
        let handle = scheduler.spawn();
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        handle.stop().await;
    }
}
