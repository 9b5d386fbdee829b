//! Async facade over the synchronous agenda core.
//!
//! Each call opens its own connection on a blocking thread, loads the
//! component it needs, runs one operation and publishes the lifecycle
//! events it produced on a broadcast channel. Calls on the same booking
//! must still be serialized by the caller.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::availability::{AvailabilityStore, TimeSlot};
use crate::booking::{BookingEvent, BookingLifecycle};
use crate::calendar::{self, Grid};
use crate::compliance::{ComplianceReport, ComplianceScorer};
use crate::config::AgendaSettings;
use crate::db::{open_database, BookingRepository, DatabaseError, ProfileRepository};
use crate::error::AgendaError;
use crate::models::*;

#[derive(Clone)]
pub struct AgendaService {
    db_path: PathBuf,
    settings: AgendaSettings,
    events: broadcast::Sender<BookingEvent>,
}

impl AgendaService {
    /// Open the database named by `settings`, creating its directory and
    /// schema when missing.
    pub fn open(settings: AgendaSettings) -> Result<Self, AgendaError> {
        let db_path = settings.database_path();
        Self::open_at(&db_path, settings)
    }

    pub fn open_at(db_path: &Path, settings: AgendaSettings) -> Result<Self, AgendaError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Persistence(DatabaseError::Unavailable(format!(
                    "cannot create {}: {e}",
                    parent.display()
                )))
            })?;
        }
        open_database(db_path)?;

        let (events, _) = broadcast::channel(settings.event_capacity.max(1));
        tracing::info!(path = %db_path.display(), "Agenda service ready");
        Ok(Self {
            db_path: db_path.to_path_buf(),
            settings,
            events,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Receive lifecycle events from every operation that follows.
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }

    async fn run<T, F>(&self, op: F) -> Result<T, AgendaError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, AgendaError> + Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open_database(&path)?;
            op(&conn)
        })
        .await
        .map_err(|e| AgendaError::Task(e.to_string()))?
    }

    async fn with_lifecycle<T, F>(&self, professional_id: Uuid, op: F) -> Result<T, AgendaError>
    where
        T: Send + 'static,
        F: FnOnce(&mut BookingLifecycle<'_, Connection>) -> Result<T, AgendaError> + Send + 'static,
    {
        let default_duration = self.settings.default_duration_minutes;
        let (value, events) = self
            .run(move |conn| {
                let mut lifecycle =
                    BookingLifecycle::load(conn, professional_id)?.with_default_duration(default_duration);
                let value = op(&mut lifecycle)?;
                Ok((value, lifecycle.drain_events()))
            })
            .await?;

        for event in events {
            // No subscriber is not an error.
            if self.events.send(event).is_err() {
                tracing::debug!("Lifecycle event dropped, no subscribers");
            }
        }
        Ok(value)
    }

    async fn with_availability<T, F>(&self, professional_id: Uuid, op: F) -> Result<T, AgendaError>
    where
        T: Send + 'static,
        F: FnOnce(&mut AvailabilityStore<'_, Connection>) -> Result<T, AgendaError> + Send + 'static,
    {
        self.run(move |conn| {
            let mut store = AvailabilityStore::load(conn, professional_id)?;
            op(&mut store)
        })
        .await
    }

    // ═══════════════════════════════════════════
    // Profile
    // ═══════════════════════════════════════════

    pub async fn create_profile(&self, kind: ProfileKind, display_name: &str) -> Result<ProfessionalProfile, AgendaError> {
        let profile = ProfessionalProfile::new(kind, display_name);
        self.run(move |conn| {
            conn.save_profile(&profile)?;
            tracing::info!(id = %profile.id, kind = profile.kind.as_str(), "Professional profile created");
            Ok(profile)
        })
        .await
    }

    pub async fn set_auto_accept(&self, professional_id: Uuid, enabled: bool) -> Result<(), AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.set_auto_accept(enabled)).await
    }

    // ═══════════════════════════════════════════
    // Availability
    // ═══════════════════════════════════════════

    pub async fn set_day_available(&self, professional_id: Uuid, day_of_week: u8, available: bool) -> Result<AvailabilityRule, AgendaError> {
        self.with_availability(professional_id, move |s| s.set_day_available(day_of_week, available))
            .await
    }

    pub async fn set_day_hours(
        &self,
        professional_id: Uuid,
        day_of_week: u8,
        field: HourField,
        value: NaiveTime,
    ) -> Result<Option<AvailabilityRule>, AgendaError> {
        self.with_availability(professional_id, move |s| s.set_day_hours(day_of_week, field, value))
            .await
    }

    pub async fn set_day_service_restriction(
        &self,
        professional_id: Uuid,
        day_of_week: u8,
        service_id: Uuid,
        enabled: bool,
    ) -> Result<AvailabilityRule, AgendaError> {
        self.with_availability(professional_id, move |s| {
            s.set_day_service_restriction(day_of_week, service_id, enabled)
        })
        .await
    }

    pub async fn add_absence(
        &self,
        professional_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
        label: String,
    ) -> Result<AbsenceBlock, AgendaError> {
        self.with_availability(professional_id, move |s| s.add_absence(start_date, end_date, &reason, &label))
            .await
    }

    pub async fn add_derived_absence(
        &self,
        professional_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
        label: String,
    ) -> Result<AbsenceBlock, AgendaError> {
        self.with_availability(professional_id, move |s| {
            s.add_derived_absence(start_date, end_date, &reason, &label)
        })
        .await
    }

    pub async fn remove_absence(&self, professional_id: Uuid, absence_id: Uuid) -> Result<(), AgendaError> {
        self.with_availability(professional_id, move |s| s.remove_absence(&absence_id))
            .await
    }

    pub async fn is_date_blocked(&self, professional_id: Uuid, date: NaiveDate) -> Result<BlockStatus, AgendaError> {
        self.with_availability(professional_id, move |s| Ok(s.is_date_blocked(date)))
            .await
    }

    /// Candidate start times for a client picking a slot.
    pub async fn time_slots(&self, professional_id: Uuid, date: NaiveDate, duration_minutes: u32) -> Result<Vec<TimeSlot>, AgendaError> {
        self.with_lifecycle(professional_id, move |l| {
            let day: Vec<Booking> = l.for_date(date).into_iter().cloned().collect();
            Ok(l.availability().time_slots_for_date(date, duration_minutes, &day))
        })
        .await
    }

    // ═══════════════════════════════════════════
    // Bookings
    // ═══════════════════════════════════════════

    pub async fn request_booking(&self, professional_id: Uuid, request: BookingRequest) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.request_booking(request)).await
    }

    pub async fn create_manual_booking(&self, professional_id: Uuid, request: ManualBookingRequest) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.create_manual_booking(request))
            .await
    }

    pub async fn confirm(&self, professional_id: Uuid, booking_id: Uuid) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.confirm(&booking_id)).await
    }

    pub async fn refuse(&self, professional_id: Uuid, booking_id: Uuid) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.refuse(&booking_id)).await
    }

    pub async fn cancel(&self, professional_id: Uuid, booking_id: Uuid, actor: Actor) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.cancel(&booking_id, actor)).await
    }

    pub async fn complete(&self, professional_id: Uuid, booking_id: Uuid) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.complete(&booking_id)).await
    }

    pub async fn reopen(&self, professional_id: Uuid, booking_id: Uuid) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.reopen(&booking_id)).await
    }

    pub async fn transition(
        &self,
        professional_id: Uuid,
        booking_id: Uuid,
        target: BookingStatus,
        actor: Actor,
    ) -> Result<Booking, AgendaError> {
        self.with_lifecycle(professional_id, move |l| l.transition(&booking_id, target, actor))
            .await
    }

    pub async fn bookings(&self, filter: BookingFilter) -> Result<Vec<Booking>, AgendaError> {
        self.run(move |conn| Ok(conn.load_bookings(&filter)?)).await
    }

    // ═══════════════════════════════════════════
    // Projections
    // ═══════════════════════════════════════════

    pub async fn calendar(&self, professional_id: Uuid, view: CalendarView, anchor: NaiveDate) -> Result<Grid, AgendaError> {
        self.with_lifecycle(professional_id, move |l| {
            let store = l.availability();
            Ok(calendar::project(store.rules(), store.absences(), l.bookings(), view, anchor))
        })
        .await
    }

    pub async fn compliance_report(&self, professional_id: Uuid, today: NaiveDate) -> Result<ComplianceReport, AgendaError> {
        self.run(move |conn| {
            if conn.load_profile(&professional_id)?.is_none() {
                return Err(AgendaError::not_found("ProfessionalProfile", professional_id));
            }
            let bookings = conn.load_bookings(&BookingFilter::for_professional(professional_id))?;
            ComplianceScorer::new(conn).report(&bookings, today)
        })
        .await
    }
}
