use crate::chime::{Chime, Silent, TerminalBell};
use crate::errors::ConfigError;
use crate::notifications::DEFAULT_RETENTION;
use crate::scheduler::SchedulerConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChimeMode {
    Bell,
    Off,
}

impl FromStr for ChimeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "bell" => Ok(ChimeMode::Bell),
            "off" | "none" => Ok(ChimeMode::Off),
            _ => Err("expected 'bell' or 'off'".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub grace_minutes: u32,
    pub notification_retention: usize,
    pub chime: ChimeMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let poll_secs: u64 = parse_or(&lookup, "REMINDER_POLL_SECS", 60)?;
        if poll_secs == 0 {
            return Err(ConfigError {
                key: "REMINDER_POLL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port: parse_or(&lookup, "PORT", 8080)?,
            data_dir: lookup("APP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            poll_interval: Duration::from_secs(poll_secs),
            grace_minutes: parse_or(&lookup, "REMINDER_GRACE_MINUTES", 0)?,
            notification_retention: parse_or(&lookup, "NOTIFICATION_RETENTION", DEFAULT_RETENTION)?,
            chime: parse_or(&lookup, "REMINDER_CHIME", ChimeMode::Bell)?,
        })
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.poll_interval,
            grace_minutes: self.grace_minutes,
        }
    }

    pub fn chime(&self) -> Arc<dyn Chime> {
        match self.chime {
            ChimeMode::Bell => Arc::new(TerminalBell),
            ChimeMode::Off => Arc::new(Silent),
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError {
            key,
            reason: err.to_string(),
            value,
        }),
    }
}
