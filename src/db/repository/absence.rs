use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{date_col, datetime_col, enum_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

/// Absences in precedence order: earliest start first, then oldest entry.
pub fn get_absences(conn: &Connection, professional_id: &Uuid) -> Result<Vec<AbsenceBlock>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, professional_id, start_date, end_date, reason, label, source, created_at
         FROM absences WHERE professional_id = ?1
         ORDER BY start_date, created_at",
    )?;

    let rows = stmt.query_map(params![professional_id.to_string()], |row| {
        Ok(AbsenceBlock {
            id: uuid_col(row, 0)?,
            professional_id: uuid_col(row, 1)?,
            start_date: date_col(row, 2)?,
            end_date: date_col(row, 3)?,
            reason: row.get(4)?,
            label: row.get(5)?,
            source: enum_col(row, 6)?,
            created_at: datetime_col(row, 7)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn insert_absence_row(conn: &Connection, block: &AbsenceBlock) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO absences (id, professional_id, start_date, end_date, reason, label, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            block.id.to_string(),
            block.professional_id.to_string(),
            block.start_date.to_string(),
            block.end_date.to_string(),
            block.reason,
            block.label,
            block.source.as_str(),
            block.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn delete_absence_row(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM absences WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "AbsenceBlock".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
