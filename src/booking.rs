//! Booking lifecycle: creation contract, the status state machine and the
//! auto-accept policy for one professional.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──complete──▶ completed (terminal)
//!    │                     │
//!    └──refuse──▶ cancelled ◀──cancel──┘
//!                   │
//!                   └──reopen──▶ pending
//! ```
//!
//! Every successful operation queues a [`BookingEvent`]; callers collect
//! them with [`BookingLifecycle::drain_events`] and forward them to
//! whoever delivers notifications.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::availability::{AvailabilityStore, SlotCheck};
use crate::db::AgendaRepository;
use crate::error::{AgendaError, SlotRejection};
use crate::models::*;

/// Lifecycle notification for messaging collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking_id: Uuid,
    pub professional_id: Uuid,
    pub status: BookingStatus,
    pub actor: Actor,
    pub at: DateTime<Utc>,
}

/// Whether the state machine allows moving from `from` to `to`.
pub fn is_allowed_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled) | (Cancelled, Pending)
    )
}

fn event_kind_for(target: BookingStatus) -> BookingEventKind {
    match target {
        BookingStatus::Pending => BookingEventKind::Reopened,
        BookingStatus::Confirmed => BookingEventKind::Confirmed,
        BookingStatus::Completed => BookingEventKind::Completed,
        BookingStatus::Cancelled => BookingEventKind::Cancelled,
    }
}

pub struct BookingLifecycle<'r, R: AgendaRepository + ?Sized> {
    repo: &'r R,
    profile: ProfessionalProfile,
    availability: AvailabilityStore<'r, R>,
    bookings: Vec<Booking>,
    default_duration_minutes: u32,
    events: Vec<BookingEvent>,
}

impl<'r, R: AgendaRepository + ?Sized> BookingLifecycle<'r, R> {
    pub fn load(repo: &'r R, professional_id: Uuid) -> Result<Self, AgendaError> {
        let profile = repo
            .load_profile(&professional_id)?
            .ok_or_else(|| AgendaError::not_found("ProfessionalProfile", professional_id))?;
        let availability = AvailabilityStore::load(repo, professional_id)?;
        let bookings = repo.load_bookings(&BookingFilter::for_professional(professional_id))?;

        tracing::debug!(
            %professional_id,
            bookings = bookings.len(),
            auto_accept = profile.auto_accept,
            "Booking lifecycle loaded"
        );
        Ok(Self {
            repo,
            profile,
            availability,
            bookings,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            events: Vec::new(),
        })
    }

    /// Duration used for manual bookings with neither a service nor an
    /// explicit duration.
    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        if minutes > 0 {
            self.default_duration_minutes = minutes;
        }
        self
    }

    pub fn profile(&self) -> &ProfessionalProfile {
        &self.profile
    }

    pub fn availability(&self) -> &AvailabilityStore<'r, R> {
        &self.availability
    }

    pub fn availability_mut(&mut self) -> &mut AvailabilityStore<'r, R> {
        &mut self.availability
    }

    // ═══════════════════════════════════════════
    // Creation
    // ═══════════════════════════════════════════

    /// Client request through the booking flow. Validated against declared
    /// availability only; overlapping bookings are accepted.
    pub fn request_booking(&mut self, request: BookingRequest) -> Result<Booking, AgendaError> {
        let service = self.resolve_service(&request.service_id)?;
        if !service.active {
            return Err(AgendaError::SlotUnavailable(SlotRejection::ServiceInactive));
        }
        let duration_minutes = checked_duration(
            request
                .duration_minutes
                .unwrap_or_else(|| nonzero_or(service.duration_minutes, self.default_duration_minutes)),
        )?;

        self.availability
            .check_slot(
                request.date,
                request.time,
                SlotCheck::Request {
                    service_id: service.id,
                },
            )
            .map_err(|rejection| {
                tracing::debug!(date = %request.date, %rejection, "Booking request rejected");
                AgendaError::SlotUnavailable(rejection)
            })?;

        let now = Utc::now();
        let auto_accepted = self.profile.auto_accept;
        let booking = Booking {
            id: Uuid::new_v4(),
            professional_id: self.profile.id,
            client_id: request.client_id,
            service_id: Some(service.id),
            date: request.date,
            time: request.time,
            duration_minutes,
            address: request.address,
            notes: request.notes,
            client: request.client,
            price_ht: request.price_ht.unwrap_or(service.price_ht),
            price_ttc: request.price_ttc.unwrap_or(service.price_ttc),
            status: if auto_accepted {
                BookingStatus::Confirmed
            } else {
                BookingStatus::Pending
            },
            origin: BookingOrigin::ClientRequest,
            last_actor: Some(Actor::Client),
            created_at: now,
            confirmed_at: auto_accepted.then_some(now),
            cancelled_at: None,
            completed_at: None,
        };

        self.repo.insert_booking(&booking)?;
        tracing::info!(
            booking_id = %booking.id,
            date = %booking.date,
            status = booking.status.as_str(),
            "Booking requested"
        );

        self.queue_event(BookingEventKind::Created, &booking, Actor::Client, now);
        if auto_accepted {
            self.queue_event(BookingEventKind::Confirmed, &booking, Actor::System, now);
        }
        self.insert_sorted(booking.clone());
        Ok(booking)
    }

    /// Entry made by the professional in their own calendar. Always
    /// confirmed; only absences are enforced.
    pub fn create_manual_booking(&mut self, request: ManualBookingRequest) -> Result<Booking, AgendaError> {
        let service = match request.service_id {
            Some(id) => Some(self.resolve_service(&id)?),
            None => None,
        };
        let duration_minutes = checked_duration(request.duration_minutes.unwrap_or_else(|| {
            service
                .as_ref()
                .map(|s| nonzero_or(s.duration_minutes, self.default_duration_minutes))
                .unwrap_or(self.default_duration_minutes)
        }))?;

        self.availability
            .check_slot(request.date, request.time, SlotCheck::Manual)
            .map_err(AgendaError::SlotUnavailable)?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            professional_id: self.profile.id,
            client_id: None,
            service_id: service.as_ref().map(|s| s.id),
            date: request.date,
            time: request.time,
            duration_minutes,
            address: request.address,
            notes: request.notes,
            client: request.client,
            price_ht: request
                .price_ht
                .or(service.as_ref().map(|s| s.price_ht))
                .unwrap_or_default(),
            price_ttc: request
                .price_ttc
                .or(service.as_ref().map(|s| s.price_ttc))
                .unwrap_or_default(),
            status: BookingStatus::Confirmed,
            origin: BookingOrigin::Manual,
            last_actor: Some(Actor::Professional),
            created_at: now,
            confirmed_at: Some(now),
            cancelled_at: None,
            completed_at: None,
        };

        self.repo.insert_booking(&booking)?;
        tracing::info!(booking_id = %booking.id, date = %booking.date, "Manual booking created");

        self.queue_event(BookingEventKind::Created, &booking, Actor::Professional, now);
        self.insert_sorted(booking.clone());
        Ok(booking)
    }

    fn insert_sorted(&mut self, booking: Booking) {
        let key = (booking.date, booking.time, booking.created_at);
        let pos = self
            .bookings
            .partition_point(|b| (b.date, b.time, b.created_at) <= key);
        self.bookings.insert(pos, booking);
    }

    fn resolve_service(&self, service_id: &Uuid) -> Result<ServiceOffering, AgendaError> {
        self.repo
            .find_service(service_id)?
            .filter(|s| s.professional_id == self.profile.id)
            .ok_or_else(|| AgendaError::not_found("ServiceOffering", service_id))
    }

    // ═══════════════════════════════════════════
    // Transitions
    // ═══════════════════════════════════════════

    pub fn confirm(&mut self, id: &Uuid) -> Result<Booking, AgendaError> {
        self.transition(id, BookingStatus::Confirmed, Actor::Professional)
    }

    /// Decline a pending request.
    pub fn refuse(&mut self, id: &Uuid) -> Result<Booking, AgendaError> {
        let current = self.find(id)?.status;
        if current != BookingStatus::Pending {
            return Err(AgendaError::InvalidTransition {
                from: current,
                to: BookingStatus::Cancelled,
            });
        }
        self.transition(id, BookingStatus::Cancelled, Actor::Professional)
    }

    /// Client- and professional-initiated cancellation share this path.
    pub fn cancel(&mut self, id: &Uuid, actor: Actor) -> Result<Booking, AgendaError> {
        self.transition(id, BookingStatus::Cancelled, actor)
    }

    pub fn complete(&mut self, id: &Uuid) -> Result<Booking, AgendaError> {
        self.transition(id, BookingStatus::Completed, Actor::Professional)
    }

    pub fn reopen(&mut self, id: &Uuid) -> Result<Booking, AgendaError> {
        self.transition(id, BookingStatus::Pending, Actor::Professional)
    }

    /// The only path that changes a booking's status.
    pub fn transition(&mut self, id: &Uuid, target: BookingStatus, actor: Actor) -> Result<Booking, AgendaError> {
        let current = self.find(id)?;
        if !is_allowed_transition(current.status, target) {
            tracing::debug!(%id, from = current.status.as_str(), to = target.as_str(), "Transition refused");
            return Err(AgendaError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let now = Utc::now();
        let mut updated = current.clone();
        updated.status = target;
        updated.last_actor = Some(actor);
        match target {
            BookingStatus::Confirmed => updated.confirmed_at = Some(now),
            BookingStatus::Cancelled => updated.cancelled_at = Some(now),
            BookingStatus::Completed => updated.completed_at = Some(now),
            BookingStatus::Pending => {
                updated.confirmed_at = None;
                updated.cancelled_at = None;
            }
        }

        self.repo.update_booking(&updated)?;
        tracing::info!(%id, from = current.status.as_str(), to = target.as_str(), actor = actor.as_str(), "Booking transitioned");

        self.queue_event(event_kind_for(target), &updated, actor, now);
        if let Some(slot) = self.bookings.iter_mut().find(|b| b.id == *id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    // ═══════════════════════════════════════════
    // Policy
    // ═══════════════════════════════════════════

    pub fn auto_accept(&self) -> bool {
        self.profile.auto_accept
    }

    /// Applies to requests made after the change; existing bookings keep
    /// their status.
    pub fn set_auto_accept(&mut self, enabled: bool) -> Result<(), AgendaError> {
        let mut profile = self.profile.clone();
        profile.auto_accept = enabled;
        self.repo.save_profile(&profile)?;
        self.profile = profile;
        tracing::info!(professional_id = %self.profile.id, enabled, "Auto-accept updated");
        Ok(())
    }

    // ═══════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════

    pub fn get(&self, id: &Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == *id)
    }

    /// Every booking of the professional, ordered by date, time and creation.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn completed_bookings(&self) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Completed)
            .collect()
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<&Booking> {
        let mut day: Vec<&Booking> = self.bookings.iter().filter(|b| b.date == date).collect();
        day.sort_by_key(|b| (b.time, b.created_at));
        day
    }

    pub fn drain_events(&mut self) -> Vec<BookingEvent> {
        std::mem::take(&mut self.events)
    }

    fn find(&self, id: &Uuid) -> Result<&Booking, AgendaError> {
        self.get(id).ok_or_else(|| AgendaError::not_found("Booking", id))
    }

    fn queue_event(&mut self, kind: BookingEventKind, booking: &Booking, actor: Actor, at: DateTime<Utc>) {
        self.events.push(BookingEvent {
            kind,
            booking_id: booking.id,
            professional_id: booking.professional_id,
            status: booking.status,
            actor,
            at,
        });
    }
}

fn checked_duration(minutes: u32) -> Result<u32, AgendaError> {
    match minutes {
        0 => Err(AgendaError::InvalidInput("duration must be positive".into())),
        m if m > MAX_DURATION_MINUTES => Err(AgendaError::InvalidInput(format!(
            "duration of {m} minutes exceeds one day ({MAX_DURATION_MINUTES})"
        ))),
        m => Ok(m),
    }
}

fn nonzero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::{insert_service, BookingRepository, DatabaseError};
    use crate::test_support::{date, failing_store, seed_professional, seed_service};
    use chrono::NaiveTime;
    use rusqlite::Connection;

    const MONDAY: &str = "2026-03-02";

    fn setup() -> (Connection, Uuid, ServiceOffering) {
        let conn = open_memory_database().unwrap();
        let pro = seed_professional(&conn);
        let service = seed_service(&conn, pro, "Réparation fuite", 90);
        {
            let mut store = AvailabilityStore::load(&conn, pro).unwrap();
            store.set_day_available(1, true).unwrap(); // Monday 08:00-17:00
        }
        (conn, pro, service)
    }

    fn request(service_id: Uuid, day: &str, hour: u32) -> BookingRequest {
        BookingRequest {
            service_id,
            date: date(day),
            time: clock(hour, 0),
            duration_minutes: None,
            address: "8 rue Mercière, Lyon".into(),
            notes: Some("Fuite sous l'évier".into()),
            client_id: Some(Uuid::new_v4()),
            client: Some(ClientContact {
                name: "Jeanne Petit".into(),
                phone: Some("0612345678".into()),
                email: None,
            }),
            price_ht: None,
            price_ttc: None,
        }
    }

    fn manual(day: &str, hour: u32) -> ManualBookingRequest {
        ManualBookingRequest {
            service_id: None,
            date: date(day),
            time: clock(hour, 0),
            duration_minutes: None,
            address: "Chantier Vaise".into(),
            notes: None,
            client: None,
            price_ht: None,
            price_ttc: None,
        }
    }

    #[test]
    fn unknown_professional_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = BookingLifecycle::load(&conn, Uuid::new_v4());
        assert!(matches!(result, Err(AgendaError::NotFound { .. })));
    }

    #[test]
    fn request_defaults_come_from_service() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let booking = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.duration_minutes, 90);
        assert_eq!(booking.price_ht, 100.0);
        assert_eq!(booking.origin, BookingOrigin::ClientRequest);
        assert!(booking.confirmed_at.is_none());

        let stored = conn.get_booking(&booking.id).unwrap().unwrap();
        assert_eq!(stored, booking);
    }

    #[test]
    fn explicit_duration_overrides_service() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let mut req = request(service.id, MONDAY, 10);
        req.duration_minutes = Some(30);
        assert_eq!(lifecycle.request_booking(req).unwrap().duration_minutes, 30);
    }

    #[test]
    fn durations_longer_than_a_day_are_rejected() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();

        let mut req = request(service.id, MONDAY, 10);
        req.duration_minutes = Some(u32::MAX);
        assert!(matches!(lifecycle.request_booking(req), Err(AgendaError::InvalidInput(_))));

        let mut req = manual(MONDAY, 10);
        req.duration_minutes = Some(MAX_DURATION_MINUTES + 1);
        assert!(matches!(lifecycle.create_manual_booking(req), Err(AgendaError::InvalidInput(_))));

        assert!(lifecycle.bookings().is_empty());
        assert!(lifecycle.drain_events().is_empty());

        let mut req = manual(MONDAY, 10);
        req.duration_minutes = Some(MAX_DURATION_MINUTES);
        assert_eq!(lifecycle.create_manual_booking(req).unwrap().duration_minutes, MAX_DURATION_MINUTES);
    }

    #[test]
    fn new_bookings_keep_chronological_order() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        lifecycle.request_booking(request(service.id, MONDAY, 14)).unwrap();
        lifecycle.create_manual_booking(manual("2026-03-01", 9)).unwrap();
        lifecycle.request_booking(request(service.id, MONDAY, 8)).unwrap();

        let order: Vec<(NaiveDate, NaiveTime)> =
            lifecycle.bookings().iter().map(|b| (b.date, b.time)).collect();
        assert_eq!(
            order,
            vec![
                (date("2026-03-01"), clock(9, 0)),
                (date(MONDAY), clock(8, 0)),
                (date(MONDAY), clock(14, 0)),
            ]
        );

        let reloaded = BookingLifecycle::load(&conn, pro).unwrap();
        let ids: Vec<Uuid> = reloaded.bookings().iter().map(|b| b.id).collect();
        let in_memory: Vec<Uuid> = lifecycle.bookings().iter().map(|b| b.id).collect();
        assert_eq!(ids, in_memory);
    }

    #[test]
    fn auto_accept_determines_initial_status() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();

        for hour in [9, 11] {
            let b = lifecycle.request_booking(request(service.id, MONDAY, hour)).unwrap();
            assert_eq!(b.status, BookingStatus::Pending);
        }

        lifecycle.set_auto_accept(true).unwrap();
        for hour in [9, 13, 16] {
            let b = lifecycle.request_booking(request(service.id, MONDAY, hour)).unwrap();
            assert_eq!(b.status, BookingStatus::Confirmed);
            assert!(b.confirmed_at.is_some());
        }

        let reloaded = BookingLifecycle::load(&conn, pro).unwrap();
        assert!(reloaded.auto_accept());
    }

    #[test]
    fn same_slot_can_be_booked_twice() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        assert_eq!(lifecycle.for_date(date(MONDAY)).len(), 2);
    }

    #[test]
    fn request_on_closed_day_or_outside_hours_fails() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();

        let closed = lifecycle.request_booking(request(service.id, "2026-03-03", 10));
        assert!(matches!(
            closed,
            Err(AgendaError::SlotUnavailable(SlotRejection::DayClosed { day_of_week: 2 }))
        ));
        let late = lifecycle.request_booking(request(service.id, MONDAY, 17));
        assert!(matches!(
            late,
            Err(AgendaError::SlotUnavailable(SlotRejection::OutsideHours { .. }))
        ));
        assert!(lifecycle.bookings().is_empty());
        assert!(lifecycle.drain_events().is_empty());
    }

    #[test]
    fn absence_blocks_requests_on_open_weekday() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        lifecycle
            .availability_mut()
            .add_absence(date(MONDAY), date("2026-03-06"), "Congés", "Vacances")
            .unwrap();

        let err = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap_err();
        assert!(matches!(err, AgendaError::SlotUnavailable(SlotRejection::Absent { .. })));
    }

    #[test]
    fn restricted_weekday_rejects_other_service() {
        let (conn, pro, service) = setup();
        let other = seed_service(&conn, pro, "Débouchage", 60);
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        lifecycle
            .availability_mut()
            .set_day_service_restriction(1, service.id, true)
            .unwrap();

        assert!(lifecycle.request_booking(request(service.id, MONDAY, 10)).is_ok());
        let err = lifecycle.request_booking(request(other.id, MONDAY, 10)).unwrap_err();
        assert!(matches!(err, AgendaError::SlotUnavailable(SlotRejection::ServiceRestricted)));
    }

    #[test]
    fn unknown_or_inactive_service_is_rejected() {
        let (conn, pro, _) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let err = lifecycle.request_booking(request(Uuid::new_v4(), MONDAY, 10)).unwrap_err();
        assert!(matches!(err, AgendaError::NotFound { .. }));

        let mut retired = seed_service(&conn, pro, "Ancien motif", 60);
        retired.id = Uuid::new_v4();
        retired.active = false;
        insert_service(&conn, &retired).unwrap();
        let err = lifecycle.request_booking(request(retired.id, MONDAY, 10)).unwrap_err();
        assert!(matches!(err, AgendaError::SlotUnavailable(SlotRejection::ServiceInactive)));
    }

    #[test]
    fn manual_booking_bypasses_hours_but_not_absences() {
        let (conn, pro, _) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();

        // Sunday evening, no rule at all
        let booking = lifecycle.create_manual_booking(manual("2026-03-01", 20)).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.origin, BookingOrigin::Manual);
        assert_eq!(booking.duration_minutes, 60);
        assert!(booking.confirmed_at.is_some());

        lifecycle
            .availability_mut()
            .add_absence(date("2026-03-08"), date("2026-03-08"), "Repos", "")
            .unwrap();
        let err = lifecycle.create_manual_booking(manual("2026-03-08", 10)).unwrap_err();
        assert!(matches!(err, AgendaError::SlotUnavailable(SlotRejection::Absent { .. })));
    }

    #[test]
    fn manual_booking_uses_service_when_given() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap().with_default_duration(45);
        let mut req = manual(MONDAY, 7);
        req.service_id = Some(service.id);
        assert_eq!(lifecycle.create_manual_booking(req).unwrap().duration_minutes, 90);
        assert_eq!(
            lifecycle.create_manual_booking(manual(MONDAY, 7)).unwrap().duration_minutes,
            45
        );
    }

    #[test]
    fn full_happy_path_sets_stamps() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let b = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();

        let confirmed = lifecycle.confirm(&b.id).unwrap();
        assert!(confirmed.confirmed_at.is_some());
        let completed = lifecycle.complete(&b.id).unwrap();
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.last_actor, Some(Actor::Professional));
        assert_eq!(lifecycle.completed_bookings().len(), 1);

        let stored = conn.get_booking(&b.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Completed);
    }

    #[test]
    fn completed_is_terminal() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let b = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        lifecycle.confirm(&b.id).unwrap();
        lifecycle.complete(&b.id).unwrap();

        for target in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let err = lifecycle.transition(&b.id, target, Actor::Professional).unwrap_err();
            assert!(matches!(
                err,
                AgendaError::InvalidTransition {
                    from: BookingStatus::Completed,
                    ..
                }
            ));
        }
        assert!(lifecycle.reopen(&b.id).is_err());
        assert!(lifecycle.cancel(&b.id, Actor::Client).is_err());
        assert_eq!(lifecycle.get(&b.id).unwrap().status, BookingStatus::Completed);
        assert_eq!(
            conn.get_booking(&b.id).unwrap().unwrap().status,
            BookingStatus::Completed
        );
    }

    #[test]
    fn pending_cannot_complete_directly() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let b = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        let err = lifecycle.complete(&b.id).unwrap_err();
        assert!(matches!(err, AgendaError::InvalidTransition { .. }));
        assert_eq!(lifecycle.get(&b.id).unwrap().status, BookingStatus::Pending);
    }

    #[test]
    fn refuse_only_applies_to_pending() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let b = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        lifecycle.confirm(&b.id).unwrap();
        assert!(lifecycle.refuse(&b.id).is_err());

        let other = lifecycle.request_booking(request(service.id, MONDAY, 11)).unwrap();
        let refused = lifecycle.refuse(&other.id).unwrap();
        assert_eq!(refused.status, BookingStatus::Cancelled);
        assert!(refused.cancelled_at.is_some());
    }

    #[test]
    fn reopen_then_confirm_preserves_fields() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let original = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();

        lifecycle.cancel(&original.id, Actor::Client).unwrap();
        let reopened = lifecycle.reopen(&original.id).unwrap();
        assert_eq!(reopened.status, BookingStatus::Pending);
        assert!(reopened.cancelled_at.is_none());
        assert!(reopened.confirmed_at.is_none());
        let confirmed = lifecycle.confirm(&original.id).unwrap();

        let strip = |b: &Booking| Booking {
            status: BookingStatus::Pending,
            last_actor: None,
            confirmed_at: None,
            cancelled_at: None,
            completed_at: None,
            ..b.clone()
        };
        assert_eq!(strip(&confirmed), strip(&original));
        assert_eq!(strip(&conn.get_booking(&original.id).unwrap().unwrap()), strip(&original));
    }

    #[test]
    fn unknown_booking_transition_is_not_found() {
        let (conn, pro, _) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        assert!(matches!(
            lifecycle.confirm(&Uuid::new_v4()),
            Err(AgendaError::NotFound { .. })
        ));
    }

    #[test]
    fn events_follow_operations() {
        let (conn, pro, service) = setup();
        let mut lifecycle = BookingLifecycle::load(&conn, pro).unwrap();
        let b = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        lifecycle.confirm(&b.id).unwrap();
        lifecycle.cancel(&b.id, Actor::Client).unwrap();
        lifecycle.reopen(&b.id).unwrap();

        let kinds: Vec<_> = lifecycle.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BookingEventKind::Created,
                BookingEventKind::Confirmed,
                BookingEventKind::Cancelled,
                BookingEventKind::Reopened,
            ]
        );
        assert!(lifecycle.drain_events().is_empty());

        lifecycle.set_auto_accept(true).unwrap();
        lifecycle.request_booking(request(service.id, MONDAY, 14)).unwrap();
        let events = lifecycle.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, BookingEventKind::Confirmed);
        assert_eq!(events[1].actor, Actor::System);
    }

    #[test]
    fn failed_write_keeps_previous_state() {
        let (conn, pro, service) = setup();
        let store = failing_store(conn);
        let mut lifecycle = BookingLifecycle::load(&store, pro).unwrap();
        let b = lifecycle.request_booking(request(service.id, MONDAY, 10)).unwrap();
        lifecycle.drain_events();

        store.fail_writes(true);
        let err = lifecycle.confirm(&b.id).unwrap_err();
        assert!(matches!(err, AgendaError::Persistence(DatabaseError::Unavailable(_))));
        assert_eq!(lifecycle.get(&b.id).unwrap().status, BookingStatus::Pending);
        assert!(lifecycle.drain_events().is_empty());

        assert!(lifecycle.request_booking(request(service.id, MONDAY, 11)).is_err());
        assert_eq!(lifecycle.bookings().len(), 1);

        assert!(lifecycle.set_auto_accept(true).is_err());
        assert!(!lifecycle.auto_accept());

        store.fail_writes(false);
        assert_eq!(
            store.conn().get_booking(&b.id).unwrap().unwrap().status,
            BookingStatus::Pending
        );
    }

    #[test]
    fn transition_table() {
        use BookingStatus::*;
        assert!(is_allowed_transition(Pending, Confirmed));
        assert!(is_allowed_transition(Cancelled, Pending));
        assert!(!is_allowed_transition(Cancelled, Confirmed));
        assert!(!is_allowed_transition(Pending, Pending));
        assert!(!is_allowed_transition(Completed, Cancelled));
    }
}
