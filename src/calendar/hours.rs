use std::collections::BTreeSet;

use chrono::Timelike;

use super::types::HourRange;
use crate::models::AvailabilityRule;

/// Rows shown when no weekday is open: 08:00 through 17:00.
pub const FALLBACK_HOUR_RANGE: HourRange = HourRange { start: 8, end: 18 };

/// Monday to Friday, in the 0 = Sunday numbering.
const FALLBACK_WORKING_DAYS: [u8; 5] = [1, 2, 3, 4, 5];

/// One hour axis for every day of the view: earliest opening to latest
/// closing across available rules, padded by an hour on each side.
pub fn derive_hour_range(rules: &[AvailabilityRule]) -> HourRange {
    let open: Vec<&AvailabilityRule> = rules.iter().filter(|r| r.is_available).collect();
    let (Some(min_start), Some(max_end)) = (
        open.iter().map(|r| r.start_time.hour()).min(),
        open.iter().map(|r| r.effective_end_hour()).max(),
    ) else {
        return FALLBACK_HOUR_RANGE;
    };

    let start = min_start.saturating_sub(1).min(23);
    let end = (max_end + 1).min(23);
    if start >= end {
        return FALLBACK_HOUR_RANGE;
    }
    HourRange { start, end }
}

/// Weekdays (0 = Sunday) shown as week columns, in Monday-first order.
pub fn working_days(rules: &[AvailabilityRule]) -> Vec<u8> {
    let open: BTreeSet<u8> = rules
        .iter()
        .filter(|r| r.is_available && r.day_of_week <= 6)
        .map(|r| r.day_of_week)
        .collect();
    if open.is_empty() {
        return FALLBACK_WORKING_DAYS.to_vec();
    }

    let mut days: Vec<u8> = open.into_iter().collect();
    days.sort_by_key(|d| (d + 6) % 7);
    days
}
