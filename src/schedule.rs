use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("unknown day {0:?} in schedule days")]
    UnknownDay(String),
    #[error("no days given in schedule days")]
    NoDays,
    #[error("invalid hour window {start}..{end}")]
    HourWindow { start: u32, end: u32 },
    #[error("schedule interval must be at least one minute")]
    ZeroInterval,
    #[error("schedule interval of {0} minutes is too large")]
    IntervalTooLarge(u64),
}

/// Weekdays on which scraping is allowed
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveDays {
    Every,
    Weekdays,
    Only(HashSet<Weekday>),
}

impl ActiveDays {
    pub fn contains(&self, day: Weekday) -> bool {
        match self {
            ActiveDays::Every => true,
            ActiveDays::Weekdays => !matches!(day, Weekday::Sat | Weekday::Sun),
            ActiveDays::Only(days) => days.contains(&day),
        }
    }
}

impl FromStr for ActiveDays {
    type Err = ScheduleError;

    /// Accepts "mon-sun", "mon-fri" or a comma-separated list such as "mon,wed,fri"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "mon-sun" => return Ok(ActiveDays::Every),
            "mon-fri" => return Ok(ActiveDays::Weekdays),
            _ => {}
        }

        let days = s
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| Weekday::from_str(d).map_err(|_| ScheduleError::UnknownDay(d.to_string())))
            .collect::<Result<HashSet<_>, _>>()?;

        if days.is_empty() {
            return Err(ScheduleError::NoDays);
        }
        Ok(ActiveDays::Only(days))
    }
}

/// When and how often scrape cycles run
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleWindow {
    pub interval_minutes: u64,
    /// First active hour (inclusive)
    pub start_hour: u32,
    /// Last active hour (exclusive)
    pub end_hour: u32,
    pub days: ActiveDays,
}

impl ScheduleWindow {
    pub fn new(
        interval_minutes: u64,
        start_hour: u32,
        end_hour: u32,
        days: ActiveDays,
    ) -> Result<Self, ScheduleError> {
        if interval_minutes == 0 {
            return Err(ScheduleError::ZeroInterval);
        }
        if interval_minutes.checked_mul(60).is_none() {
            return Err(ScheduleError::IntervalTooLarge(interval_minutes));
        }
        if start_hour > 24 || end_hour > 24 || start_hour > end_hour {
            return Err(ScheduleError::HourWindow {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            interval_minutes,
            start_hour,
            end_hour,
            days,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Whether a cycle may run at `now`
    pub fn is_active<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        if !self.days.contains(now.weekday()) {
            return false;
        }
        let hour = now.hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}
