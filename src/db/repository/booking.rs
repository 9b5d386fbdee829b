use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{
    date_col, datetime_col, enum_col, opt_datetime_col, opt_enum_col, opt_uuid_col, time_col,
    uuid_col,
};
use crate::db::DatabaseError;
use crate::legacy_notes;
use crate::models::*;

const BOOKING_COLUMNS: &str = "id, professional_id, client_id, service_id, booking_date,
    booking_time, duration_minutes, address, notes, client_name, client_phone, client_email,
    price_ht, price_ttc, status, origin, last_actor, created_at, confirmed_at, cancelled_at,
    completed_at";

fn booking_from_row(row: &Row) -> rusqlite::Result<Booking> {
    let notes: Option<String> = row.get(8)?;
    let client = match row.get::<_, Option<String>>(9)? {
        Some(name) => Some(ClientContact {
            name,
            phone: row.get(10)?,
            email: row.get(11)?,
        }),
        // Rows written before contacts had columns carry them in the notes.
        None => notes.as_deref().and_then(legacy_notes::parse_client_contact),
    };

    Ok(Booking {
        id: uuid_col(row, 0)?,
        professional_id: uuid_col(row, 1)?,
        client_id: opt_uuid_col(row, 2)?,
        service_id: opt_uuid_col(row, 3)?,
        date: date_col(row, 4)?,
        time: time_col(row, 5)?,
        duration_minutes: row.get(6)?,
        address: row.get(7)?,
        notes,
        client,
        price_ht: row.get(12)?,
        price_ttc: row.get(13)?,
        status: enum_col(row, 14)?,
        origin: enum_col(row, 15)?,
        last_actor: opt_enum_col(row, 16)?,
        created_at: datetime_col(row, 17)?,
        confirmed_at: opt_datetime_col(row, 18)?,
        cancelled_at: opt_datetime_col(row, 19)?,
        completed_at: opt_datetime_col(row, 20)?,
    })
}

pub fn get_booking_row(conn: &Connection, id: &Uuid) -> Result<Option<Booking>, DatabaseError> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id.to_string()],
            booking_from_row,
        )
        .optional()?;
    Ok(booking)
}

pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> Result<Vec<Booking>, DatabaseError> {
    let mut sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1=1");
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(id) = filter.professional_id {
        values.push(Box::new(id.to_string()));
        sql.push_str(&format!(" AND professional_id = ?{}", values.len()));
    }
    if let Some(id) = filter.client_id {
        values.push(Box::new(id.to_string()));
        sql.push_str(&format!(" AND client_id = ?{}", values.len()));
    }
    if let Some(status) = filter.status {
        values.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND status = ?{}", values.len()));
    }
    if let Some(from) = filter.date_from {
        values.push(Box::new(from.to_string()));
        sql.push_str(&format!(" AND booking_date >= ?{}", values.len()));
    }
    if let Some(to) = filter.date_to {
        values.push(Box::new(to.to_string()));
        sql.push_str(&format!(" AND booking_date <= ?{}", values.len()));
    }
    sql.push_str(" ORDER BY booking_date, booking_time, created_at");

    let refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(refs.as_slice(), booking_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn insert_booking_row(conn: &Connection, booking: &Booking) -> Result<(), DatabaseError> {
    let (client_name, client_phone, client_email) = contact_columns(booking);
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                     ?18, ?19, ?20, ?21)"
        ),
        params![
            booking.id.to_string(),
            booking.professional_id.to_string(),
            booking.client_id.map(|id| id.to_string()),
            booking.service_id.map(|id| id.to_string()),
            booking.date.to_string(),
            format_clock(booking.time),
            booking.duration_minutes,
            booking.address,
            booking.notes,
            client_name,
            client_phone,
            client_email,
            booking.price_ht,
            booking.price_ttc,
            booking.status.as_str(),
            booking.origin.as_str(),
            booking.last_actor.map(|a| a.as_str()),
            booking.created_at.to_rfc3339(),
            booking.confirmed_at.map(|t| t.to_rfc3339()),
            booking.cancelled_at.map(|t| t.to_rfc3339()),
            booking.completed_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

/// Persists status, actor and transition stamps. Other fields are fixed at creation.
pub fn update_booking_row(conn: &Connection, booking: &Booking) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE bookings SET status = ?1, last_actor = ?2, confirmed_at = ?3, cancelled_at = ?4,
                             completed_at = ?5
         WHERE id = ?6",
        params![
            booking.status.as_str(),
            booking.last_actor.map(|a| a.as_str()),
            booking.confirmed_at.map(|t| t.to_rfc3339()),
            booking.cancelled_at.map(|t| t.to_rfc3339()),
            booking.completed_at.map(|t| t.to_rfc3339()),
            booking.id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Booking".into(),
            id: booking.id.to_string(),
        });
    }
    Ok(())
}

fn contact_columns(booking: &Booking) -> (Option<&str>, Option<&str>, Option<&str>) {
    match &booking.client {
        Some(contact) => (
            Some(contact.name.as_str()),
            contact.phone.as_deref(),
            contact.email.as_deref(),
        ),
        None => (None, None, None),
    }
}
