use std::collections::{HashMap, HashSet};

use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::TableGroup;

use crate::tables::ensure_table;
use crate::{DbError, DEFAULT_ZONE_ID};

pub fn list_table_groups(conn: &Connection) -> Result<Vec<TableGroup>, DbError> {
    let mut stmt = conn.prepare("SELECT id, name FROM zones ORDER BY id")?;
    let zones = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let mut result = Vec::with_capacity(zones.len());
    for (zone_id, name) in zones {
        let mut stmt =
            conn.prepare("SELECT table_id FROM table_zones WHERE zone_id = ?1 ORDER BY table_id")?;
        let table_ids = stmt
            .query_map(params![zone_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut stmt = conn.prepare(
            "SELECT w.staff_id FROM waiter_zones wz
             JOIN waiters w ON w.id = wz.waiter_id
             WHERE wz.zone_id = ?1 ORDER BY w.staff_id",
        )?;
        let staff_ids = stmt
            .query_map(params![zone_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        result.push(TableGroup {
            id: zone_id,
            name,
            assigned_table_ids: table_ids,
            assigned_staff_ids: staff_ids,
        });
    }
    Ok(result)
}

/// Zone sync: upserts the posted zones, replaces their table/waiter links,
/// and refreshes the legacy primary-zone columns on `tables` and `waiters`.
pub fn sync_table_groups(conn: &Connection, groups: &[TableGroup]) -> Result<usize, DbError> {
    crate::tables::ensure_default_zone(conn)?;

    let mut zone_ids = Vec::new();
    for group in groups {
        if group.id <= 0 {
            continue;
        }
        zone_ids.push(group.id);
        let exists: bool = conn
            .query_row("SELECT 1 FROM zones WHERE id = ?1", params![group.id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if exists {
            conn.execute(
                "UPDATE zones SET name = ?2 WHERE id = ?1",
                params![group.id, group.name],
            )?;
        } else {
            conn.execute(
                "INSERT INTO zones (id, name) VALUES (?1, ?2)",
                params![group.id, group.name],
            )?;
        }
    }

    // First zone mentioning an object becomes its legacy primary zone.
    let mut table_primary: HashMap<i64, i64> = HashMap::new();
    let mut staff_primary: HashMap<i64, i64> = HashMap::new();
    let mut zone_tables: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut zone_staff: HashMap<i64, Vec<i64>> = HashMap::new();
    for group in groups {
        if group.id <= 0 {
            continue;
        }
        let tables = zone_tables.entry(group.id).or_default();
        for &table_id in &group.assigned_table_ids {
            if !tables.contains(&table_id) {
                tables.push(table_id);
            }
            table_primary.entry(table_id).or_insert(group.id);
        }
        let staff = zone_staff.entry(group.id).or_default();
        for &staff_id in &group.assigned_staff_ids {
            if !staff.contains(&staff_id) {
                staff.push(staff_id);
            }
            staff_primary.entry(staff_id).or_insert(group.id);
        }
    }

    if !zone_ids.is_empty() {
        let placeholders = vec!["?"; zone_ids.len()].join(", ");
        conn.execute(
            &format!("DELETE FROM table_zones WHERE zone_id IN ({placeholders})"),
            rusqlite::params_from_iter(zone_ids.iter().copied()),
        )?;
        conn.execute(
            &format!("DELETE FROM waiter_zones WHERE zone_id IN ({placeholders})"),
            rusqlite::params_from_iter(zone_ids.iter().copied()),
        )?;
    }

    for (&zone_id, table_ids) in &zone_tables {
        for &table_id in table_ids {
            ensure_table(conn, table_id)?;
            conn.execute(
                "INSERT OR IGNORE INTO table_zones (table_id, zone_id) VALUES (?1, ?2)",
                params![table_id, zone_id],
            )?;
        }
    }

    // AssignedStaffIds carries staff ids; link rows need waiter ids. Staff
    // ids the client invented are skipped rather than failing the sync.
    let mut payload_staff: HashSet<i64> = HashSet::new();
    for staff_ids in zone_staff.values() {
        payload_staff.extend(staff_ids.iter().copied());
    }
    let mut staff_to_waiter: HashMap<i64, i64> = HashMap::new();
    for &staff_id in &payload_staff {
        let staff_exists: bool = conn
            .query_row("SELECT 1 FROM staff WHERE id = ?1", params![staff_id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if !staff_exists {
            continue;
        }
        let waiter_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM waiters WHERE staff_id = ?1",
                params![staff_id],
                |row| row.get(0),
            )
            .optional()?;
        let waiter_id = match waiter_id {
            Some(id) => id,
            None => {
                conn.execute(
                    "INSERT INTO waiters (staff_id, zone_id) VALUES (?1, ?2)",
                    params![staff_id, DEFAULT_ZONE_ID],
                )?;
                conn.last_insert_rowid()
            }
        };
        staff_to_waiter.insert(staff_id, waiter_id);
    }

    for (&zone_id, staff_ids) in &zone_staff {
        for staff_id in staff_ids {
            let Some(&waiter_id) = staff_to_waiter.get(staff_id) else {
                continue;
            };
            conn.execute(
                "INSERT OR IGNORE INTO waiter_zones (waiter_id, zone_id) VALUES (?1, ?2)",
                params![waiter_id, zone_id],
            )?;
        }
    }

    let mut stmt = conn.prepare("SELECT id FROM tables")?;
    let all_tables = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    for table_id in all_tables {
        let zone = table_primary.get(&table_id).copied().unwrap_or(DEFAULT_ZONE_ID);
        conn.execute(
            "UPDATE tables SET zone_id = ?2 WHERE id = ?1",
            params![table_id, zone],
        )?;
    }

    let mut stmt = conn.prepare("SELECT id, staff_id FROM waiters")?;
    let all_waiters = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    for (waiter_id, staff_id) in all_waiters {
        let zone = staff_primary.get(&staff_id).copied().unwrap_or(DEFAULT_ZONE_ID);
        conn.execute(
            "UPDATE waiters SET zone_id = ?2 WHERE id = ?1",
            params![waiter_id, zone],
        )?;
    }

    Ok(groups.len())
}
