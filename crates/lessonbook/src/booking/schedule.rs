//! Bulk slot generation from a weekly template.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::types::NewSlot;

/// Longest date range accepted in one request.
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("date range longer than 366 days")]
    RangeTooLong,

    #[error("invalid hours {start}..{end}")]
    InvalidHours { start: u32, end: u32 },

    #[error("lesson duration must be positive")]
    ZeroDuration,

    #[error("weekday {0} out of range (0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(u8),
}

/// A weekly template: lessons of `duration_minutes` separated by
/// `break_minutes`, between `start_hour` and `end_hour` local time, on the
/// listed weekdays.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTemplate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 0 = Sunday, 1 = Monday, ..., 6 = Saturday
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<u8>,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub break_minutes: u32,
}

fn default_weekdays() -> Vec<u8> {
    vec![1, 2, 3, 4, 5]
}

fn default_start_hour() -> u32 {
    10
}

fn default_end_hour() -> u32 {
    18
}

fn default_duration() -> u32 {
    60
}

impl SlotTemplate {
    fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_date < self.start_date {
            return Err(ScheduleError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if (self.end_date - self.start_date).num_days() > MAX_RANGE_DAYS {
            return Err(ScheduleError::RangeTooLong);
        }
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(ScheduleError::InvalidHours {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        if self.duration_minutes == 0 {
            return Err(ScheduleError::ZeroDuration);
        }
        if let Some(&day) = self.weekdays.iter().find(|&&d| d > 6) {
            return Err(ScheduleError::InvalidWeekday(day));
        }
        Ok(())
    }

    /// Expands the template into concrete slots, interpreting hours in `offset`.
    ///
    /// Slots that would run past `end_hour` are dropped.
    pub fn expand(&self, offset: FixedOffset) -> Result<Vec<NewSlot>, ScheduleError> {
        self.validate()?;

        let lesson = Duration::minutes(i64::from(self.duration_minutes));
        let step = lesson + Duration::minutes(i64::from(self.break_minutes));
        let mut slots = Vec::new();

        for date in self.start_date.iter_days().take_while(|d| *d <= self.end_date) {
            let weekday = date.weekday().num_days_from_sunday() as u8;
            if !self.weekdays.contains(&weekday) {
                continue;
            }

            let Some(day_start) = local(offset, date, self.start_hour) else {
                continue;
            };
            let Some(day_end) = local(offset, date, self.end_hour) else {
                continue;
            };

            let mut start = day_start;
            while start + lesson <= day_end {
                slots.push(NewSlot {
                    start_time: start,
                    end_time: start + lesson,
                });
                start += step;
            }
        }

        Ok(slots)
    }
}

/// `hour` o'clock on `date` in `offset`, as UTC. Hour 24 is midnight next day.
fn local(offset: FixedOffset, date: NaiveDate, hour: u32) -> Option<chrono::DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)? + Duration::hours(i64::from(hour));
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
