use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::MenuItem;

use crate::DbError;

pub fn list_menu(conn: &Connection) -> Result<Vec<MenuItem>, DbError> {
    let mut stmt = conn.prepare("SELECT id, name, category, price FROM menu ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        let category: Option<String> = row.get(2)?;
        Ok(MenuItem {
            id: row.get(0)?,
            name: row.get(1)?,
            category: category.unwrap_or_else(|| "Inne".to_string()),
            price: row.get(3)?,
            is_active: true,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

pub fn find_menu_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>, DbError> {
    conn.query_row("SELECT id FROM menu WHERE name = ?1", params![name], |row| {
        row.get(0)
    })
    .optional()
    .map_err(DbError::from)
}

/// Inserts an auto-created menu row for an ad-hoc order item.
pub fn insert_auto_menu_item(
    conn: &Connection,
    name: &str,
    description: &str,
) -> Result<i64, DbError> {
    conn.execute(
        "INSERT INTO menu (name, price, description, allergens) VALUES (?1, 0, ?2, NULL)",
        params![name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Replace-style sync: rows absent from the payload are deleted together
/// with their order items, the rest are upserted by id.
pub fn sync_menu(conn: &Connection, items: &[MenuItem]) -> Result<usize, DbError> {
    let incoming: HashSet<i64> = items.iter().map(|i| i.id).filter(|id| *id > 0).collect();

    let mut stmt = conn.prepare("SELECT id FROM menu")?;
    let existing = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    for id in existing {
        if !incoming.contains(&id) {
            conn.execute("DELETE FROM order_items WHERE menu_id = ?1", params![id])?;
            conn.execute("DELETE FROM menu WHERE id = ?1", params![id])?;
        }
    }

    for item in items {
        if item.id <= 0 {
            continue;
        }
        let exists: bool = conn
            .query_row("SELECT 1 FROM menu WHERE id = ?1", params![item.id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        let category = if item.category.is_empty() {
            None
        } else {
            Some(item.category.as_str())
        };
        if exists {
            conn.execute(
                "UPDATE menu SET name = ?2, category = ?3, price = ?4,
                        description = COALESCE(description, '')
                 WHERE id = ?1",
                params![item.id, item.name, category, item.price],
            )?;
        } else {
            conn.execute(
                "INSERT INTO menu (id, name, category, price, description, allergens)
                 VALUES (?1, ?2, ?3, ?4, '', NULL)",
                params![item.id, item.name, category, item.price],
            )?;
        }
    }
    Ok(items.len())
}

pub fn delete_menu_item(conn: &Connection, menu_id: i64) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM menu WHERE id = ?1", params![menu_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Menu item not found"));
    }
    conn.execute("DELETE FROM order_items WHERE menu_id = ?1", params![menu_id])?;
    conn.execute("DELETE FROM menu WHERE id = ?1", params![menu_id])?;
    Ok(())
}
