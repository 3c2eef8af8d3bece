use budget_reminders::chime::Silent;
use budget_reminders::models::{Frequency, NewReminder, Preset};
use budget_reminders::notifications::DEFAULT_RETENTION;
use budget_reminders::{Event, EventBus, NotificationCenter, ReminderStore, Scheduler, SchedulerConfig, Storage};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::Mutex;

struct Harness {
    store: Arc<Mutex<ReminderStore>>,
    center: Arc<Mutex<NotificationCenter>>,
    scheduler: Scheduler,
    events: EventBus,
}

async fn harness() -> Harness {
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
        Arc::new(Silent),
        events.clone(),
        SchedulerConfig::default(),
    );
    Harness {
        store,
        center,
        scheduler,
        events,
    }
}

fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

async fn unread(h: &Harness) -> usize {
    h.center.lock().await.unread_count()
}

#[tokio::test]
async fn daily_reminder_fires_once_per_day() {
    let mut h = harness().await;
    h.store
        .lock()
        .await
        .add(NewReminder::custom("Log Expenses", "msg", Frequency::Daily, "09:00"))
        .await
        .unwrap();

    h.scheduler.tick_at(at(2026, 10, 19, 9, 0)).await;
    assert_eq!(unread(&h).await, 1);
    assert_eq!(h.center.lock().await.all()[0].title, "🔔 Log Expenses");

    h.scheduler.tick_at(at(2026, 10, 19, 9, 0)).await;
    assert_eq!(unread(&h).await, 1);

    h.scheduler.tick_at(at(2026, 10, 20, 9, 0)).await;
    assert_eq!(unread(&h).await, 2);
}

#[tokio::test]
async fn weekly_budget_preset_fires_on_wednesday_with_modal() {
    let mut h = harness().await;
    let mut rx = h.events.subscribe();
    h.store
        .lock()
        .await
        .enable_preset(Preset::WeeklyBudget, Some("08:00"), Some(3))
        .await
        .unwrap();

    // 2026-10-19 is a Monday.
    assert!(h.scheduler.tick_at(at(2026, 10, 19, 8, 0)).await.is_empty());
    assert!(h.scheduler.tick_at(at(2026, 10, 20, 8, 0)).await.is_empty());
    assert_eq!(h.scheduler.tick_at(at(2026, 10, 21, 8, 0)).await.len(), 1);

    let center = h.center.lock().await;
    assert_eq!(center.unread_count(), 1);
    let modal = center.current_modal().unwrap();
    assert_eq!(modal.title, "Weekly Budget Check-in");
    assert_eq!(modal.icon, "📊");
    drop(center);

    let mut modals = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, Event::ModalShown { .. }) {
            modals += 1;
        }
    }
    assert_eq!(modals, 1);
}

#[tokio::test]
async fn weekly_fires_are_at_least_seven_days_apart() {
    let mut h = harness().await;
    let reminder = h
        .store
        .lock()
        .await
        .add(NewReminder::custom("Budget", "m", Frequency::Weekly, "08:00").on_day(3))
        .await
        .unwrap();

    let mut fires = Vec::new();
    let start = at(2026, 10, 1, 8, 0);
    for offset in 0..60 {
        let now = start + Duration::days(offset);
        if !h.scheduler.tick_at(now).await.is_empty() {
            fires.push(now);
        }
    }

    assert!(fires.len() >= 8);
    for pair in fires.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::days(7));
    }
    assert_eq!(h.scheduler.last_fired(reminder.id), fires.last().copied());
}

#[tokio::test]
async fn monthly_fires_on_the_first_once_per_month() {
    let mut h = harness().await;
    h.store
        .lock()
        .await
        .add(NewReminder::custom("Savings", "m", Frequency::Monthly, "20:00"))
        .await
        .unwrap();

    let start = at(2026, 10, 1, 20, 0);
    let mut fire_days = Vec::new();
    for offset in 0..95 {
        let now = start + Duration::days(offset);
        for _ in 0..2 {
            if !h.scheduler.tick_at(now).await.is_empty() {
                fire_days.push(now.date());
            }
        }
    }

    assert_eq!(
        fire_days,
        vec![
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        ]
    );
}

#[tokio::test]
async fn once_reminder_fires_a_single_time() {
    let mut h = harness().await;
    h.store
        .lock()
        .await
        .add(NewReminder::custom("Pay rent", "m", Frequency::Once, "07:30"))
        .await
        .unwrap();

    let mut total = 0;
    for day in 19..=25 {
        total += h.scheduler.tick_at(at(2026, 10, day, 7, 30)).await.len();
    }
    assert_eq!(total, 1);
    assert_eq!(unread(&h).await, 1);
}

#[tokio::test]
async fn completed_reminder_stays_in_collection_but_stops_firing() {
    let mut h = harness().await;
    let reminder = h
        .store
        .lock()
        .await
        .add(NewReminder::custom("Log Expenses", "msg", Frequency::Daily, "09:00"))
        .await
        .unwrap();

    h.store.lock().await.mark_done(reminder.id).await;
    {
        let store = h.store.lock().await;
        assert!(store.list_active().is_empty());
        assert_eq!(store.all().len(), 1);
    }

    assert!(h.scheduler.tick_at(at(2026, 10, 19, 9, 0)).await.is_empty());
    assert_eq!(unread(&h).await, 0);
}

#[tokio::test]
async fn grace_window_catches_a_late_tick_without_double_firing() {
    let events = EventBus::default();
    let store = Arc::new(Mutex::new(
        ReminderStore::load(Storage::in_memory(), events.clone()).await,
    ));
    let center = Arc::new(Mutex::new(
        NotificationCenter::load(Storage::in_memory(), DEFAULT_RETENTION, events.clone()).await,
    ));
    let mut scheduler = Scheduler::new(
        store.clone(),
        center.clone(),
        Arc::new(Silent),
        events,
        SchedulerConfig {
            grace_minutes: 2,
            ..SchedulerConfig::default()
        },
    );
    store
        .lock()
        .await
        .add(NewReminder::custom("Log Expenses", "msg", Frequency::Daily, "09:00"))
        .await
        .unwrap();

    assert!(scheduler.tick_at(at(2026, 10, 19, 8, 59)).await.is_empty());
    assert_eq!(scheduler.tick_at(at(2026, 10, 19, 9, 1)).await.len(), 1);
    assert!(scheduler.tick_at(at(2026, 10, 19, 9, 2)).await.is_empty());
    assert_eq!(center.lock().await.unread_count(), 1);
}
