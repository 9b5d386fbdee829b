use std::collections::BTreeSet;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{conversion_error, time_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

pub fn get_availability(
    conn: &Connection,
    professional_id: &Uuid,
) -> Result<Vec<AvailabilityRule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, professional_id, day_of_week, is_available, start_time, end_time,
                restricted_service_ids
         FROM availability WHERE professional_id = ?1
         ORDER BY day_of_week",
    )?;

    let rows = stmt.query_map(params![professional_id.to_string()], |row| {
        let raw_services: String = row.get(6)?;
        let restricted_service_ids: BTreeSet<Uuid> =
            serde_json::from_str(&raw_services).map_err(|e| conversion_error(6, e))?;
        Ok(AvailabilityRule {
            id: uuid_col(row, 0)?,
            professional_id: uuid_col(row, 1)?,
            day_of_week: row.get(2)?,
            is_available: row.get::<_, i32>(3)? != 0,
            start_time: time_col(row, 4)?,
            end_time: time_col(row, 5)?,
            restricted_service_ids,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn upsert_availability_rule(conn: &Connection, rule: &AvailabilityRule) -> Result<(), DatabaseError> {
    let services = serde_json::to_string(&rule.restricted_service_ids)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Unserializable service list: {e}")))?;
    conn.execute(
        "INSERT INTO availability (id, professional_id, day_of_week, is_available, start_time,
                                   end_time, restricted_service_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(professional_id, day_of_week) DO UPDATE SET
           is_available = excluded.is_available,
           start_time = excluded.start_time,
           end_time = excluded.end_time,
           restricted_service_ids = excluded.restricted_service_ids",
        params![
            rule.id.to_string(),
            rule.professional_id.to_string(),
            rule.day_of_week,
            rule.is_available as i32,
            format_clock(rule.start_time),
            format_clock(rule.end_time),
            services,
        ],
    )?;
    Ok(())
}
