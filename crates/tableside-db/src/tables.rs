use std::collections::{HashMap, HashSet};

use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::TableNode;

use crate::{DbError, DEFAULT_ZONE_ID, DEFAULT_ZONE_NAME};

pub const DEFAULT_WIDTH: i64 = 80;
pub const DEFAULT_HEIGHT: i64 = 160;
pub const DEFAULT_SEATS: i64 = 4;

pub fn ensure_default_zone(conn: &Connection) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row(
            "SELECT 1 FROM zones WHERE id = ?1",
            params![DEFAULT_ZONE_ID],
            |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    if !exists {
        conn.execute(
            "INSERT INTO zones (id, name) VALUES (?1, ?2)",
            params![DEFAULT_ZONE_ID, DEFAULT_ZONE_NAME],
        )?;
    }
    Ok(())
}

/// Creates a table row when the client references an id we have never seen.
pub fn ensure_table(conn: &Connection, table_id: i64) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM tables WHERE id = ?1", params![table_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        ensure_default_zone(conn)?;
        conn.execute(
            "INSERT INTO tables (id, seats, zone_id) VALUES (?1, ?2, ?3)",
            params![table_id, DEFAULT_SEATS, DEFAULT_ZONE_ID],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO table_zones (table_id, zone_id) VALUES (?1, ?2)",
            params![table_id, DEFAULT_ZONE_ID],
        )?;
    }
    Ok(())
}

pub fn list_tables(conn: &Connection) -> Result<Vec<TableNode>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, m.name, m.x, m.y, t.seats, m.level
         FROM tables t JOIN table_map m ON m.table_id = t.id
         ORDER BY t.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(TableNode {
            id: row.get(0)?,
            name: row.get(1)?,
            x: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
            y: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seats: row.get::<_, Option<i64>>(4)?.unwrap_or(DEFAULT_SEATS),
            status: "wolny".to_string(),
            level: row.get::<_, Option<i64>>(5)?.unwrap_or(1),
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// Floor-plan sync: per level, map rows absent from the payload are removed,
/// the rest are upserted by table id.
pub fn sync_tables(conn: &Connection, items: &[TableNode]) -> Result<usize, DbError> {
    ensure_default_zone(conn)?;

    let levels: HashSet<i64> = items.iter().map(|i| i.level.max(1)).collect();
    let mut ids_by_level: HashMap<i64, HashSet<i64>> = HashMap::new();
    for item in items {
        if item.id > 0 {
            ids_by_level
                .entry(item.level.max(1))
                .or_default()
                .insert(item.id);
        }
    }

    for level in levels {
        let ids = ids_by_level.get(&level);
        match ids {
            Some(ids) if !ids.is_empty() => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    "DELETE FROM table_map WHERE level = ? AND table_id NOT IN ({placeholders})"
                );
                let mut params_vec: Vec<i64> = vec![level];
                params_vec.extend(ids.iter().copied());
                conn.execute(&sql, rusqlite::params_from_iter(params_vec))?;
            }
            _ => {
                conn.execute("DELETE FROM table_map WHERE level = ?1", params![level])?;
            }
        }
    }

    let mut count = 0;
    for item in items {
        if item.id <= 0 {
            continue;
        }
        ensure_table(conn, item.id)?;

        let name = item.name.trim();
        let level = item.level.max(1);
        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM table_map WHERE table_id = ?1",
                params![item.id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if exists {
            conn.execute(
                "UPDATE table_map SET x = ?2, y = ?3, rotation = 0, name = ?4, level = ?5
                 WHERE table_id = ?1",
                params![item.id, item.x, item.y, name, level],
            )?;
        } else {
            conn.execute(
                "INSERT INTO table_map (table_id, x, y, rotation, name, level)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5)",
                params![item.id, item.x, item.y, name, level],
            )?;
        }
        count += 1;
    }
    Ok(count)
}

pub fn patch_table_seats(conn: &Connection, table_id: i64, seats: i64) -> Result<(), DbError> {
    let updated = conn.execute(
        "UPDATE tables SET seats = ?2 WHERE id = ?1",
        params![table_id, seats],
    )?;
    if updated == 0 {
        return Err(DbError::not_found("Table not found"));
    }
    Ok(())
}
