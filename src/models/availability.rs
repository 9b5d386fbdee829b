use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opening hour assigned when a weekday is first opened.
pub const DEFAULT_OPEN_HOUR: u32 = 8;
/// Closing hour assigned when a weekday is first opened.
pub const DEFAULT_CLOSE_HOUR: u32 = 17;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub professional_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    pub is_available: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Empty means every service is bookable that day.
    pub restricted_service_ids: BTreeSet<Uuid>,
}

impl AvailabilityRule {
    pub fn with_default_hours(professional_id: Uuid, day_of_week: u8, is_available: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            professional_id,
            day_of_week,
            is_available,
            start_time: clock(DEFAULT_OPEN_HOUR, 0),
            end_time: clock(DEFAULT_CLOSE_HOUR, 0),
            restricted_service_ids: BTreeSet::new(),
        }
    }

    /// Half-open check: `start <= time < end`.
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time < self.end_time
    }

    pub fn allows_service(&self, service_id: &Uuid) -> bool {
        self.restricted_service_ids.is_empty() || self.restricted_service_ids.contains(service_id)
    }

    /// End hour rounded up when the closing time has minutes.
    pub fn effective_end_hour(&self) -> u32 {
        if self.end_time.minute() > 0 {
            self.end_time.hour() + 1
        } else {
            self.end_time.hour()
        }
    }
}

/// Weekday index used throughout the agenda (0 = Sunday).
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Build a clock time, saturating to midnight on out-of-range input.
pub fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse "HH:MM" or "HH:MM:SS".
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
