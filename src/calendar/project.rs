use chrono::{Datelike, Days, NaiveDate};

use super::hours::{derive_hour_range, working_days};
use super::types::*;
use crate::models::*;

const MONTH_GRID_DAYS: usize = 42;

/// Project rules, absences and bookings into the requested view around
/// `anchor`. Pure: same inputs, same grid.
pub fn project(
    rules: &[AvailabilityRule],
    absences: &[AbsenceBlock],
    bookings: &[Booking],
    view: CalendarView,
    anchor: NaiveDate,
) -> Grid {
    match view {
        CalendarView::Day => Grid::Hourly(hourly_grid(rules, absences, bookings, view, vec![anchor])),
        CalendarView::Week => {
            let shown = working_days(rules);
            let dates = monday_of(anchor)
                .iter_days()
                .take(7)
                .filter(|d| shown.contains(&day_of_week(*d)))
                .collect();
            Grid::Hourly(hourly_grid(rules, absences, bookings, view, dates))
        }
        CalendarView::Month => Grid::Month(month_grid(absences, bookings, anchor)),
    }
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn first_absence<'a>(absences: &'a [AbsenceBlock], date: NaiveDate) -> Option<&'a AbsenceBlock> {
    absences.iter().find(|a| a.covers(date))
}

fn hourly_grid(
    rules: &[AvailabilityRule],
    absences: &[AbsenceBlock],
    bookings: &[Booking],
    view: CalendarView,
    dates: Vec<NaiveDate>,
) -> HourlyGrid {
    let hour_range = derive_hour_range(rules);
    let days = dates
        .into_iter()
        .map(|date| day_column(date, hour_range, absences, bookings))
        .collect();

    HourlyGrid {
        view,
        hour_range,
        hour_labels: hour_range.labels(),
        days,
    }
}

fn day_column(date: NaiveDate, hour_range: HourRange, absences: &[AbsenceBlock], bookings: &[Booking]) -> DayColumn {
    let absence = first_absence(absences, date).map(AbsenceMark::from);
    let on_day: Vec<&Booking> = bookings.iter().filter(|b| b.date == date).collect();

    let cells = hour_range
        .rows()
        .map(|hour| {
            let in_hour: Vec<Booking> = on_day
                .iter()
                .filter(|b| b.hour() == hour)
                .map(|b| (*b).clone())
                .collect();

            // Absence wins over bookings, bookings over an empty slot.
            let (kind, prefill) = if absence.is_some() {
                (CellKind::Absent, None)
            } else if !in_hour.is_empty() {
                (CellKind::Occupied, None)
            } else {
                (
                    CellKind::Empty,
                    Some(SlotPrefill {
                        date,
                        time: clock(hour, 0),
                    }),
                )
            };

            HourCell {
                hour,
                kind,
                bookings: in_hour,
                absence: absence.clone(),
                prefill,
            }
        })
        .collect();

    DayColumn {
        date,
        day_of_week: day_of_week(date),
        cells,
    }
}

fn month_grid(absences: &[AbsenceBlock], bookings: &[Booking], anchor: NaiveDate) -> MonthGrid {
    let first = anchor.with_day(1).unwrap_or(anchor);
    let days: Vec<MonthDay> = monday_of(first)
        .iter_days()
        .take(MONTH_GRID_DAYS)
        .map(|date| MonthDay {
            date,
            in_month: date.month() == first.month() && date.year() == first.year(),
            booking_count: bookings.iter().filter(|b| b.date == date).count(),
            absence: first_absence(absences, date).map(AbsenceMark::from),
        })
        .collect();

    MonthGrid {
        year: first.year(),
        month: first.month(),
        weeks: days.chunks(7).map(<[MonthDay]>::to_vec).collect(),
    }
}
