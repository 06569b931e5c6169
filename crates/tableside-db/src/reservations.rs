use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use tableside_model::{parse_reservation_date, parse_reservation_time, Reservation};

use crate::DbError;

pub fn list_reservations(conn: &Connection) -> Result<Vec<Reservation>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, phone, people, date, time, approved, table_id
         FROM reservations ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        let date: String = row.get(5)?;
        let time: String = row.get(6)?;
        let start_time = if date.is_empty() || time.is_empty() {
            None
        } else {
            Some(format!("{date}T{time}"))
        };
        Ok(Reservation {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            phone: row.get(3)?,
            people_count: row.get(4)?,
            date: Some(date),
            time: Some(time),
            start_time,
            approved: row.get::<_, i64>(7)? != 0,
            table_id: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// Full-replace sync. Rows whose date+time cannot be resolved (directly or
/// from a `StartTime` fallback) are skipped, not failed.
pub fn sync_reservations(conn: &Connection, items: &[Reservation]) -> Result<usize, DbError> {
    conn.execute("DELETE FROM reservations", [])?;

    let mut count = 0;
    for item in items {
        if item.id <= 0 {
            continue;
        }

        let mut date = item
            .date
            .as_deref()
            .and_then(parse_reservation_date);
        let mut time = item
            .time
            .as_deref()
            .and_then(parse_reservation_time);

        if (date.is_none() || time.is_none()) && item.start_time.is_some() {
            let raw = item.start_time.as_deref().unwrap_or_default().replace(' ', "T");
            if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S") {
                date = date.or(Some(dt.date()));
                time = time.or(Some(dt.time()));
            }
        }

        let (Some(date), Some(time)) = (date, time) else {
            continue;
        };

        let first_name = non_blank(&item.first_name);
        let last_name = non_blank(&item.last_name);
        conn.execute(
            "INSERT INTO reservations
                 (id, first_name, last_name, phone, people, date, time, approved, table_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                item.id,
                first_name,
                last_name,
                item.phone,
                item.people_count,
                date.format("%Y-%m-%d").to_string(),
                time.format("%H:%M:%S").to_string(),
                item.approved as i64,
                item.table_id,
            ],
        )?;
        count += 1;
    }
    Ok(count)
}

fn non_blank(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "—".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn set_reservation_approved(
    conn: &Connection,
    reservation_id: i64,
    approved: bool,
) -> Result<(), DbError> {
    let updated = conn.execute(
        "UPDATE reservations SET approved = ?2 WHERE id = ?1",
        params![reservation_id, approved as i64],
    )?;
    if updated == 0 {
        return Err(DbError::not_found(format!(
            "Reservation {reservation_id} not found"
        )));
    }
    Ok(())
}
