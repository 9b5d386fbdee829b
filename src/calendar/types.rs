use std::ops::Range;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{AbsenceBlock, AbsenceSource, Booking, CalendarView, CellKind};

/// Shared hour axis of the day and week views. Rows are `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub fn rows(&self) -> Range<u32> {
        self.start..self.end
    }

    pub fn labels(&self) -> Vec<String> {
        self.rows().map(|h| format!("{h:02}:00")).collect()
    }
}

/// Absence covering a rendered date, distinguished by where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsenceMark {
    pub absence_id: Uuid,
    pub reason: String,
    pub label: String,
    pub source: AbsenceSource,
}

impl From<&AbsenceBlock> for AbsenceMark {
    fn from(block: &AbsenceBlock) -> Self {
        Self {
            absence_id: block.id,
            reason: block.reason.clone(),
            label: block.label.clone(),
            source: block.source,
        }
    }
}

/// Values an empty cell hands to the new-booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotPrefill {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCell {
    pub hour: u32,
    pub kind: CellKind,
    /// Every booking starting in this hour, any status.
    pub bookings: Vec<Booking>,
    pub absence: Option<AbsenceMark>,
    pub prefill: Option<SlotPrefill>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub cells: Vec<HourCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyGrid {
    pub view: CalendarView,
    pub hour_range: HourRange,
    pub hour_labels: Vec<String>,
    pub days: Vec<DayColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub booking_count: usize,
    pub absence: Option<AbsenceMark>,
}

/// Six Monday-first weeks covering the anchor's month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<MonthDay>>,
}

/// Render-ready calendar. Carries data only, no styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Grid {
    Hourly(HourlyGrid),
    Month(MonthGrid),
}

impl Grid {
    pub fn view(&self) -> CalendarView {
        match self {
            Self::Hourly(grid) => grid.view,
            Self::Month(_) => CalendarView::Month,
        }
    }
}
