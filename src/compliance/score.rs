use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::classify::add_months;
use super::records::ComplianceRecord;
use crate::models::{Booking, BookingStatus, TimelineKind, WorkCategory};

// ═══════════════════════════════════════════
// Health score
// ═══════════════════════════════════════════

const POINTS_PROOF: u32 = 15;
const POINTS_SIGNATURE: u32 = 10;
const POINTS_GEO_STAMP: u32 = 5;
const POINTS_WARRANTY_ACTIVE: u32 = 40;
const POINTS_WARRANTY_GRACE: u32 = 20;
const POINTS_MAINTENANCE_AHEAD: u32 = 30;
const POINTS_MAINTENANCE_GRACE: u32 = 15;
const POINTS_PER_RECORD: u32 = 100;

const WARRANTY_GRACE_MONTHS: u32 = 6;
const MAINTENANCE_GRACE_MONTHS: u32 = 3;

/// Points earned by one record out of 100: proof coverage (30), warranty
/// status (40) and maintenance status (30).
pub fn record_points(record: &ComplianceRecord, today: NaiveDate) -> u32 {
    let mut points = 0;
    if record.has_proof {
        points += POINTS_PROOF;
    }
    if record.has_signature {
        points += POINTS_SIGNATURE;
    }
    if record.has_geo_stamp {
        points += POINTS_GEO_STAMP;
    }

    let warranty_end = record.warranty.end_date;
    if warranty_end > today {
        points += POINTS_WARRANTY_ACTIVE;
    } else if add_months(warranty_end, WARRANTY_GRACE_MONTHS) > today {
        points += POINTS_WARRANTY_GRACE;
    }

    let maintenance = record.next_maintenance_date;
    if maintenance > today {
        points += POINTS_MAINTENANCE_AHEAD;
    } else if add_months(maintenance, MAINTENANCE_GRACE_MONTHS) > today {
        points += POINTS_MAINTENANCE_GRACE;
    }
    points
}

/// 0-100, every record weighing the same. No records scores 0.
pub fn health_score(records: &[ComplianceRecord], today: NaiveDate) -> u8 {
    if records.is_empty() {
        return 0;
    }
    let earned: u32 = records.iter().map(|r| record_points(r, today)).sum();
    let possible = POINTS_PER_RECORD * records.len() as u32;
    (100.0 * f64::from(earned) / f64::from(possible)).round() as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyHealth {
    pub address: String,
    pub interventions: usize,
    pub score: u8,
}

/// Health score per property, keyed by intervention address.
pub fn health_by_property(records: &[ComplianceRecord], today: NaiveDate) -> Vec<PropertyHealth> {
    let mut by_address: BTreeMap<&str, Vec<ComplianceRecord>> = BTreeMap::new();
    for record in records {
        by_address
            .entry(record.address.trim())
            .or_default()
            .push(record.clone());
    }

    by_address
        .into_iter()
        .map(|(address, group)| PropertyHealth {
            address: address.to_string(),
            interventions: group.len(),
            score: health_score(&group, today),
        })
        .collect()
}

// ═══════════════════════════════════════════
// Punctuality
// ═══════════════════════════════════════════

/// Smallest denominator for which a rate is reported.
pub const PUNCTUALITY_MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctualityTier {
    Excellent,
    Good,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Punctuality {
    InsufficientData { samples: usize },
    Rate { percent: u8, completed: usize, total: usize },
}

impl Punctuality {
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Rate { percent, .. } => Some(*percent),
            Self::InsufficientData { .. } => None,
        }
    }

    /// 90 and above is excellent, 70 and above good.
    pub fn tier(&self) -> Option<PunctualityTier> {
        self.percent().map(|p| match p {
            90.. => PunctualityTier::Excellent,
            70..=89 => PunctualityTier::Good,
            _ => PunctualityTier::NeedsImprovement,
        })
    }
}

/// Completed share of the bookings that got past the request stage.
/// Pending requests do not count.
pub fn punctuality(bookings: &[Booking]) -> Punctuality {
    let completed = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
        .count();
    let total = bookings
        .iter()
        .filter(|b| b.status != BookingStatus::Pending)
        .count();

    if total < PUNCTUALITY_MIN_SAMPLES {
        return Punctuality::InsufficientData { samples: total };
    }
    let percent = (100.0 * completed as f64 / total as f64).round() as u8;
    Punctuality::Rate {
        percent,
        completed,
        total,
    }
}

// ═══════════════════════════════════════════
// Warranty & maintenance timeline
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub kind: TimelineKind,
    pub booking_id: Uuid,
    pub address: String,
    pub category: WorkCategory,
    /// Date already reached on `today`.
    pub past: bool,
}

/// Warranty ends and maintenance due dates of every record, oldest first.
pub fn maintenance_timeline(records: &[ComplianceRecord], today: NaiveDate) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = records
        .iter()
        .flat_map(|r| {
            [
                (r.warranty.end_date, TimelineKind::WarrantyEnd),
                (r.next_maintenance_date, TimelineKind::Maintenance),
            ]
            .into_iter()
            .map(move |(date, kind)| TimelineEntry {
                date,
                kind,
                booking_id: r.booking_id,
                address: r.address.clone(),
                category: r.category,
                past: date <= today,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.kind.as_str().cmp(b.kind.as_str())));
    entries
}
