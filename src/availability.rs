//! Availability store: weekly opening rules and date-range absences for
//! one professional, plus the slot validation bookings go through.
//!
//! State is loaded once from the repository and kept in memory. Every
//! mutation is written through first and only applied to the in-memory
//! copy when the write succeeded, so a failed save leaves the store as it
//! was.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::AvailabilityRepository;
use crate::error::{AgendaError, SlotRejection};
use crate::models::*;

/// How strictly a slot is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCheck {
    /// Client request: weekday, hours, absences and service restriction.
    Request { service_id: Uuid },
    /// Professional's own entry: absences only.
    Manual,
}

/// Candidate start time offered to a client for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: NaiveTime,
    /// False when an existing booking overlaps. Informational only.
    pub available: bool,
}

pub struct AvailabilityStore<'r, R: AvailabilityRepository + ?Sized> {
    repo: &'r R,
    professional_id: Uuid,
    rules: Vec<AvailabilityRule>,
    absences: Vec<AbsenceBlock>,
}

impl<'r, R: AvailabilityRepository + ?Sized> AvailabilityStore<'r, R> {
    pub fn load(repo: &'r R, professional_id: Uuid) -> Result<Self, AgendaError> {
        let mut rules = repo.load_availability(&professional_id)?;
        rules.sort_by_key(|r| r.day_of_week);
        let absences = repo.load_absences(&professional_id)?;
        tracing::debug!(
            %professional_id,
            rules = rules.len(),
            absences = absences.len(),
            "Availability loaded"
        );
        Ok(Self {
            repo,
            professional_id,
            rules,
            absences,
        })
    }

    pub fn professional_id(&self) -> Uuid {
        self.professional_id
    }

    pub fn rules(&self) -> &[AvailabilityRule] {
        &self.rules
    }

    pub fn absences(&self) -> &[AbsenceBlock] {
        &self.absences
    }

    pub fn rule_for(&self, day_of_week: u8) -> Option<&AvailabilityRule> {
        self.rules.iter().find(|r| r.day_of_week == day_of_week)
    }

    // ── Weekly rules ────────────────────────────────────────

    /// Open or close a weekday. A weekday without a row gets default hours.
    pub fn set_day_available(&mut self, day_of_week: u8, available: bool) -> Result<AvailabilityRule, AgendaError> {
        check_weekday(day_of_week)?;
        let mut rule = match self.rule_for(day_of_week) {
            Some(existing) => existing.clone(),
            None => AvailabilityRule::with_default_hours(self.professional_id, day_of_week, available),
        };
        rule.is_available = available;
        if available && rule.start_time >= rule.end_time {
            let defaults = AvailabilityRule::with_default_hours(self.professional_id, day_of_week, true);
            rule.start_time = defaults.start_time;
            rule.end_time = defaults.end_time;
        }

        self.repo.save_availability_rule(&rule)?;
        tracing::info!(day_of_week, available, "Weekday availability updated");
        Ok(self.commit_rule(rule))
    }

    /// Change one boundary of a weekday's hours. `Ok(None)` when the
    /// weekday has no row yet.
    pub fn set_day_hours(
        &mut self,
        day_of_week: u8,
        field: HourField,
        value: NaiveTime,
    ) -> Result<Option<AvailabilityRule>, AgendaError> {
        check_weekday(day_of_week)?;
        let Some(existing) = self.rule_for(day_of_week) else {
            tracing::debug!(day_of_week, "No availability row; hour change ignored");
            return Ok(None);
        };

        let mut rule = existing.clone();
        match field {
            HourField::Start => rule.start_time = value,
            HourField::End => rule.end_time = value,
        }
        if rule.is_available && rule.start_time >= rule.end_time {
            return Err(AgendaError::InvalidInput(format!(
                "opening time {} must be before closing time {}",
                format_clock(rule.start_time),
                format_clock(rule.end_time)
            )));
        }

        self.repo.save_availability_rule(&rule)?;
        tracing::info!(day_of_week, field = field.as_str(), value = %format_clock(value), "Weekday hours updated");
        Ok(Some(self.commit_rule(rule)))
    }

    /// Add or remove a service from a weekday's restriction list.
    pub fn set_day_service_restriction(
        &mut self,
        day_of_week: u8,
        service_id: Uuid,
        enabled: bool,
    ) -> Result<AvailabilityRule, AgendaError> {
        check_weekday(day_of_week)?;
        let mut rule = match self.rule_for(day_of_week) {
            Some(existing) => existing.clone(),
            None => AvailabilityRule::with_default_hours(self.professional_id, day_of_week, false),
        };
        if enabled {
            rule.restricted_service_ids.insert(service_id);
        } else {
            rule.restricted_service_ids.remove(&service_id);
        }

        self.repo.save_availability_rule(&rule)?;
        tracing::info!(day_of_week, %service_id, enabled, "Weekday service restriction updated");
        Ok(self.commit_rule(rule))
    }

    fn commit_rule(&mut self, rule: AvailabilityRule) -> AvailabilityRule {
        match self.rules.iter_mut().find(|r| r.day_of_week == rule.day_of_week) {
            Some(slot) => *slot = rule.clone(),
            None => {
                self.rules.push(rule.clone());
                self.rules.sort_by_key(|r| r.day_of_week);
            }
        }
        rule
    }

    // ── Absences ────────────────────────────────────────────

    /// Declare an absence by hand.
    pub fn add_absence(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
        label: &str,
    ) -> Result<AbsenceBlock, AgendaError> {
        self.insert_absence(start_date, end_date, reason, label, AbsenceSource::Manual)
    }

    /// Record an absence owned by another feature, e.g. days reserved by a
    /// signed quote. Such blocks cannot be removed through this store.
    pub fn add_derived_absence(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
        label: &str,
    ) -> Result<AbsenceBlock, AgendaError> {
        self.insert_absence(start_date, end_date, reason, label, AbsenceSource::Quote)
    }

    fn insert_absence(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
        label: &str,
        source: AbsenceSource,
    ) -> Result<AbsenceBlock, AgendaError> {
        if end_date < start_date {
            return Err(AgendaError::InvalidInput(format!(
                "absence ends ({end_date}) before it starts ({start_date})"
            )));
        }
        let block = AbsenceBlock {
            id: Uuid::new_v4(),
            professional_id: self.professional_id,
            start_date,
            end_date,
            reason: reason.to_string(),
            label: label.to_string(),
            source,
            created_at: Utc::now(),
        };

        self.repo.insert_absence(&block)?;
        tracing::info!(%start_date, %end_date, source = source.as_str(), "Absence added");

        self.absences.push(block.clone());
        // Same order the repository hands back: start date, then age.
        self.absences
            .sort_by(|a, b| (a.start_date, a.created_at).cmp(&(b.start_date, b.created_at)));
        Ok(block)
    }

    pub fn remove_absence(&mut self, id: &Uuid) -> Result<(), AgendaError> {
        let block = self
            .absences
            .iter()
            .find(|a| a.id == *id)
            .ok_or_else(|| AgendaError::not_found("AbsenceBlock", id))?;
        if block.source.is_auto_derived() {
            return Err(AgendaError::InvalidInput(format!(
                "absence {id} is managed by its {} and cannot be removed here",
                block.source.as_str()
            )));
        }

        self.repo.delete_absence(id)?;
        self.absences.retain(|a| a.id != *id);
        tracing::info!(%id, "Absence removed");
        Ok(())
    }

    /// First covering block wins; reasons are never merged.
    pub fn is_date_blocked(&self, date: NaiveDate) -> BlockStatus {
        self.absences
            .iter()
            .find(|a| a.covers(date))
            .map(BlockStatus::from_block)
            .unwrap_or_else(BlockStatus::open)
    }

    // ── Slot validation ─────────────────────────────────────

    /// Validate a slot against declared availability. Existing bookings
    /// are deliberately not consulted.
    pub fn check_slot(&self, date: NaiveDate, time: NaiveTime, check: SlotCheck) -> Result<(), SlotRejection> {
        let block = self.is_date_blocked(date);
        if block.blocked {
            return Err(SlotRejection::Absent {
                reason: block.reason.unwrap_or_default(),
            });
        }

        let SlotCheck::Request { service_id } = check else {
            return Ok(());
        };

        let weekday = day_of_week(date);
        let rule = match self.rule_for(weekday) {
            Some(rule) if rule.is_available => rule,
            _ => return Err(SlotRejection::DayClosed { day_of_week: weekday }),
        };
        if !rule.contains_time(time) {
            return Err(SlotRejection::OutsideHours {
                start: format_clock(rule.start_time),
                end: format_clock(rule.end_time),
            });
        }
        if !rule.allows_service(&service_id) {
            return Err(SlotRejection::ServiceRestricted);
        }
        Ok(())
    }

    /// Start times offered for `date`, stepping by `duration_minutes` from
    /// opening while the whole slot fits before closing.
    pub fn time_slots_for_date(
        &self,
        date: NaiveDate,
        duration_minutes: u32,
        bookings: &[Booking],
    ) -> Vec<TimeSlot> {
        if self.is_date_blocked(date).blocked {
            return Vec::new();
        }
        let Some(rule) = self.rule_for(day_of_week(date)).filter(|r| r.is_available) else {
            return Vec::new();
        };

        let step = if duration_minutes == 0 {
            DEFAULT_DURATION_MINUTES
        } else {
            duration_minutes
        };
        let open = minutes_of(rule.start_time);
        let close = minutes_of(rule.end_time);
        let taken: Vec<(u32, u32)> = bookings
            .iter()
            .filter(|b| b.date == date && b.status != BookingStatus::Cancelled)
            .map(Booking::minute_span)
            .collect();

        let mut slots = Vec::new();
        let mut start = open;
        loop {
            let end = start.saturating_add(step);
            if end > close {
                break;
            }
            let overlaps = taken.iter().any(|&(b_start, b_end)| start < b_end && end > b_start);
            slots.push(TimeSlot {
                time: clock(start / 60, start % 60),
                available: !overlaps,
            });
            start = end;
        }
        slots
    }
}

fn minutes_of(time: NaiveTime) -> u32 {
    use chrono::Timelike;
    time.hour() * 60 + time.minute()
}

fn check_weekday(day_of_week: u8) -> Result<(), AgendaError> {
    if day_of_week > 6 {
        return Err(AgendaError::InvalidInput(format!(
            "day_of_week must be between 0 and 6, got {day_of_week}"
        )));
    }
    Ok(())
}
