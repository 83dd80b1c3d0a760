//! Environment-driven configuration.

use std::fmt::Display;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::FixedOffset;
use thiserror::Error;
use tracing::{info, warn};

use crate::booking::{CancellationPolicy, DEFAULT_CANCELLATION_WINDOW_HOURS};
use crate::notify::{Dispatcher, NotifyError, TelegramNotifier};

/// Upper bound for the cancellation window, one leap year.
pub const MAX_CANCEL_WINDOW_HOURS: i64 = 24 * 366;

pub const PUBLIC_HORIZON_DAYS: RangeInclusive<i64> = 1..=366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },

    #[error("notifier setup failed: {0}")]
    Notifier(#[from] NotifyError),
}

/// Which backend holds profiles, slots and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store `{other}`, expected sqlite or memory")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub store: StoreKind,
    pub database: PathBuf,
    pub cancel_window_hours: i64,
    pub public_horizon_days: i64,
    /// The school's local offset, used for slot generation and notifications.
    pub utc_offset: FixedOffset,
    pub bootstrap_admin: Option<String>,
    /// Present only when both the bot token and chat id are set.
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let offset_minutes: i32 = try_load(&lookup, "LESSONBOOK_UTC_OFFSET_MINUTES", "0")?;
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                key: "LESSONBOOK_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
                message: "offset out of range".to_string(),
            })?;

        let cancel_window_hours = in_range(
            "LESSONBOOK_CANCEL_WINDOW_HOURS",
            try_load(
                &lookup,
                "LESSONBOOK_CANCEL_WINDOW_HOURS",
                &DEFAULT_CANCELLATION_WINDOW_HOURS.to_string(),
            )?,
            0..=MAX_CANCEL_WINDOW_HOURS,
        )?;
        let public_horizon_days = in_range(
            "LESSONBOOK_PUBLIC_HORIZON_DAYS",
            try_load(&lookup, "LESSONBOOK_PUBLIC_HORIZON_DAYS", "14")?,
            PUBLIC_HORIZON_DAYS,
        )?;

        let telegram = match (
            non_empty(&lookup, "TELEGRAM_BOT_TOKEN"),
            non_empty(&lookup, "TELEGRAM_CHAT_ID"),
        ) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                token,
                chat_id,
                api_base: try_load(
                    &lookup,
                    "TELEGRAM_API_BASE",
                    crate::notify::TELEGRAM_API_BASE,
                )?,
            }),
            (None, None) => None,
            _ => {
                warn!("Only one of TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID is set, notifications disabled");
                None
            }
        };

        Ok(Self {
            addr: try_load(&lookup, "LESSONBOOK_ADDR", "0.0.0.0:8080")?,
            store: try_load(&lookup, "LESSONBOOK_STORE", "sqlite")?,
            database: try_load(&lookup, "LESSONBOOK_DATABASE", "lessonbook.sqlite3")?,
            cancel_window_hours,
            public_horizon_days,
            utc_offset,
            bootstrap_admin: non_empty(&lookup, "LESSONBOOK_BOOTSTRAP_ADMIN"),
            telegram,
        })
    }

    pub fn policy(&self) -> CancellationPolicy {
        CancellationPolicy::from_hours(self.cancel_window_hours)
    }

    /// Builds the notification dispatcher described by this config.
    pub fn dispatcher(&self) -> Result<Dispatcher, ConfigError> {
        let Some(telegram) = &self.telegram else {
            info!("Telegram not configured, booking notifications disabled");
            return Ok(Dispatcher::disabled());
        };

        let notifier = TelegramNotifier::new(
            &telegram.api_base,
            &telegram.token,
            &telegram.chat_id,
            self.utc_offset,
        )?;
        info!("Booking notifications go to Telegram chat {}", telegram.chat_id);
        Ok(Dispatcher::new(Arc::new(notifier)))
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn in_range(
    key: &'static str,
    value: i64,
    range: RangeInclusive<i64>,
) -> Result<i64, ConfigError> {
    if range.contains(&value) {
        return Ok(value);
    }
    warn!("{key} value {value} is outside {range:?}");
    Err(ConfigError::Invalid {
        key,
        value: value.to_string(),
        message: format!("must be between {} and {}", range.start(), range.end()),
    })
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = non_empty(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            message: e.to_string(),
            value,
        }
    })
}
