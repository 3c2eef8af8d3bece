use crate::errors::ReminderError;
use crate::events::{Event, EventBus};
use crate::models::{
    Frequency, NewReminder, Preset, PresetState, Reminder, ReminderKind, TimeOfDay,
};
use crate::storage::{Storage, REMINDERS_KEY};
use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

pub const DEFAULT_PRESET_TIME: &str = "10:00";

/// Owns the reminder collection and its persisted blob.
pub struct ReminderStore {
    storage: Storage,
    reminders: Vec<Reminder>,
    next_id: u64,
    events: EventBus,
}

impl ReminderStore {
    pub async fn load(storage: Storage, events: EventBus) -> Self {
        let reminders: Vec<Reminder> = storage.load_records(REMINDERS_KEY).await;
        info!("loaded {} reminders", reminders.len());
        Self::from_records(storage, reminders, events)
    }

    pub fn from_records(storage: Storage, reminders: Vec<Reminder>, events: EventBus) -> Self {
        let next_id = reminders.iter().map(|r| r.id).max().map_or(1, |id| id + 1);
        Self {
            storage,
            reminders,
            next_id,
            events,
        }
    }

    pub fn all(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: u64) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn list_active(&self) -> Vec<&Reminder> {
        self.reminders.iter().filter(|r| r.is_active()).collect()
    }

    pub async fn add(&mut self, definition: NewReminder) -> Result<Reminder, ReminderError> {
        self.add_at(definition, Local::now().naive_local()).await
    }

    pub async fn add_at(
        &mut self,
        definition: NewReminder,
        now: NaiveDateTime,
    ) -> Result<Reminder, ReminderError> {
        let (frequency, time, day) = validate(&definition)?;

        let reminder = Reminder {
            id: self.next_id,
            title: definition.title.trim().to_string(),
            message: definition.message.trim().to_string(),
            frequency,
            time,
            day,
            kind: definition.kind,
            preset: definition.preset,
            enabled: definition.enabled,
            completed: false,
            created_at: now,
            completed_at: None,
        };
        self.next_id += 1;
        self.reminders.push(reminder.clone());
        self.save().await;

        info!(id = reminder.id, "added {} reminder '{}'", frequency.as_str(), reminder.title);
        self.events.publish(Event::ReminderAdded { id: reminder.id });
        Ok(reminder)
    }

    /// Removes the reminder. Returns false when no such reminder exists.
    pub async fn delete(&mut self, id: u64) -> bool {
        let before = self.reminders.len();
        self.reminders.retain(|r| r.id != id);
        if self.reminders.len() == before {
            return false;
        }

        self.save().await;
        self.events.publish(Event::ReminderDeleted { id });
        true
    }

    pub async fn mark_done(&mut self, id: u64) -> Option<Reminder> {
        self.mark_done_at(id, Local::now().naive_local()).await
    }

    /// Marks the reminder completed. Absent or already completed reminders are
    /// left untouched and yield `None`.
    pub async fn mark_done_at(&mut self, id: u64, now: NaiveDateTime) -> Option<Reminder> {
        let reminder = self
            .reminders
            .iter_mut()
            .find(|r| r.id == id && !r.completed)?;
        reminder.completed = true;
        reminder.completed_at = Some(now);
        let updated = reminder.clone();

        self.save().await;
        self.events.publish(Event::ReminderCompleted { id });
        Some(updated)
    }

    /// Turns a preset on. An existing reminder for the same preset is
    /// replaced so each preset exists at most once.
    pub async fn enable_preset(
        &mut self,
        preset: Preset,
        time: Option<&str>,
        day: Option<i64>,
    ) -> Result<Reminder, ReminderError> {
        let time = time
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_PRESET_TIME);
        let mut definition = NewReminder::from_preset(preset, time);
        definition.day = day;
        validate(&definition)?;

        self.disable_preset(preset).await;
        self.add(definition).await
    }

    pub async fn disable_preset(&mut self, preset: Preset) -> bool {
        let ids: Vec<u64> = self
            .reminders
            .iter()
            .filter(|r| r.preset == Some(preset))
            .map(|r| r.id)
            .collect();

        let mut removed = false;
        for id in ids {
            removed |= self.delete(id).await;
        }
        removed
    }

    pub fn preset_states(&self) -> Vec<PresetState> {
        Preset::ALL
            .into_iter()
            .map(|preset| PresetState {
                preset,
                title: preset.title().to_string(),
                enabled: self
                    .reminders
                    .iter()
                    .any(|r| r.preset == Some(preset)),
            })
            .collect()
    }

    async fn save(&mut self) {
        if let Err(err) = self.storage.persist(REMINDERS_KEY, &self.reminders).await {
            warn!("reminders are in-memory only for this session: {err}");
            self.storage = Storage::in_memory();
        }
    }
}

/// Checks a definition and returns its parsed schedule. A day given for a
/// non-weekly reminder is dropped.
pub fn validate(
    definition: &NewReminder,
) -> Result<(Frequency, TimeOfDay, Option<u8>), ReminderError> {
    if definition.title.trim().is_empty()
        || definition.message.trim().is_empty()
        || definition.frequency.trim().is_empty()
        || definition.time.trim().is_empty()
    {
        return Err(ReminderError::validation("Please fill in all fields"));
    }

    let frequency: Frequency = definition
        .frequency
        .parse()
        .map_err(ReminderError::Validation)?;
    let time: TimeOfDay = definition.time.parse().map_err(ReminderError::Validation)?;

    let day = match (frequency, definition.day) {
        (Frequency::Weekly, Some(day)) if (0..=6).contains(&day) => Some(day as u8),
        (Frequency::Weekly, Some(day)) => {
            return Err(ReminderError::validation(format!(
                "day must be between 0 (Sunday) and 6 (Saturday), got {day}"
            )));
        }
        (Frequency::Weekly, None) => {
            return Err(ReminderError::validation("weekly reminders need a day"));
        }
        _ => None,
    };

    if definition.kind == ReminderKind::Preset && definition.preset.is_none() {
        return Err(ReminderError::validation("preset reminders need a template"));
    }

    Ok((frequency, time, day))
}
