use chrono::{Duration, NaiveDateTime, Timelike};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Frequency::Once => "⏰",
            Frequency::Daily => "📅",
            Frequency::Weekly => "🗓️",
            Frequency::Monthly => "📆",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "once" => Ok(Frequency::Once),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("unknown frequency '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Preset,
    #[default]
    Custom,
}

/// Built-in reminder templates, toggled on and off as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    DailyExpense,
    WeeklyBudget,
    MonthlySavings,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::DailyExpense,
        Preset::WeeklyBudget,
        Preset::MonthlySavings,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Preset::DailyExpense => "daily-expense",
            Preset::WeeklyBudget => "weekly-budget",
            Preset::MonthlySavings => "monthly-savings",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Preset::ALL.into_iter().find(|preset| preset.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            Preset::DailyExpense => "Daily Expense Logging",
            Preset::WeeklyBudget => "Weekly Budget Check-in",
            Preset::MonthlySavings => "Monthly Savings Review",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Preset::DailyExpense => "💸 \"Hey 👋 have you tracked your spending today?\"",
            Preset::WeeklyBudget => "📊 \"Just a quick check-in — how's your budget going?\"",
            Preset::MonthlySavings => "💙 \"Small savings today = big goals tomorrow 💙\"",
        }
    }

    pub fn frequency(self) -> Frequency {
        match self {
            Preset::DailyExpense => Frequency::Daily,
            Preset::WeeklyBudget => Frequency::Weekly,
            Preset::MonthlySavings => Frequency::Monthly,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Preset::DailyExpense => "💸",
            Preset::WeeklyBudget => "📊",
            Preset::MonthlySavings => "💙",
        }
    }
}

/// Wall-clock time of day with minute resolution, stored as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn of(at: NaiveDateTime) -> Self {
        Self {
            hour: at.hour() as u8,
            minute: at.minute() as u8,
        }
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("time must be HH:MM, got '{value}'");
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub frequency: Frequency,
    pub time: TimeOfDay,
    /// Day of week, 0 = Sunday. Only set for weekly reminders.
    #[serde(default)]
    pub day: Option<u8>,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    pub enabled: bool,
    #[serde(default)]
    pub completed: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

impl Reminder {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.completed
    }

    pub fn icon(&self) -> &'static str {
        self.preset.map(Preset::icon).unwrap_or("🔔")
    }

    pub fn day_name(&self) -> Option<&'static str> {
        self.day
            .and_then(|day| WEEKDAY_NAMES.get(usize::from(day)))
            .copied()
    }
}

/// A reminder definition as submitted by a form or API client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewReminder {
    pub title: String,
    pub message: String,
    pub frequency: String,
    pub time: String,
    #[serde(deserialize_with = "deserialize_day")]
    pub day: Option<i64>,
    #[serde(skip)]
    pub kind: ReminderKind,
    #[serde(skip)]
    pub preset: Option<Preset>,
    #[serde(skip)]
    pub enabled: bool,
}

impl Default for NewReminder {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            frequency: String::new(),
            time: String::new(),
            day: None,
            kind: ReminderKind::Custom,
            preset: None,
            enabled: true,
        }
    }
}

impl NewReminder {
    pub fn custom(
        title: impl Into<String>,
        message: impl Into<String>,
        frequency: Frequency,
        time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            frequency: frequency.as_str().to_string(),
            time: time.into(),
            ..Self::default()
        }
    }

    pub fn from_preset(preset: Preset, time: impl Into<String>) -> Self {
        Self {
            title: preset.title().to_string(),
            message: preset.message().to_string(),
            frequency: preset.frequency().as_str().to_string(),
            time: time.into(),
            kind: ReminderKind::Preset,
            preset: Some(preset),
            ..Self::default()
        }
    }

    pub fn on_day(mut self, day: i64) -> Self {
        self.day = Some(day);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Info => "ℹ️",
            NotificationKind::Success => "✅",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Error => "❌",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            NotificationKind::Info => "Info",
            NotificationKind::Success => "Success!",
            NotificationKind::Warning => "Warning",
            NotificationKind::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub timestamp: NaiveDateTime,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: NaiveDateTime,
    pub duration_ms: u64,
}

impl Toast {
    pub fn expires_at(&self) -> NaiveDateTime {
        self.shown_at + Duration::milliseconds(self.duration_ms as i64)
    }

    pub fn is_visible(&self, now: NaiveDateTime) -> bool {
        now < self.expires_at()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderModal {
    pub title: String,
    pub message: String,
    pub icon: String,
    pub shown_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RemindersQuery {
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct PresetToggle {
    pub enabled: bool,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_day")]
    pub day: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetState {
    pub preset: Preset,
    pub title: String,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub age: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub unread_count: usize,
    pub notifications: Vec<NotificationView>,
}

/// Accepts a weekday as a number, a numeric string, an empty string or null.
fn deserialize_day<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DayVisitor;

    impl<'de> Visitor<'de> for DayVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a day of week as a number or numeric string")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| E::custom("day out of range"))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let value = value.trim();
            if value.is_empty() || value == "null" {
                return Ok(None);
            }
            value
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid day '{value}'")))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(DayVisitor)
        }
    }

    deserializer.deserialize_any(DayVisitor)
}
