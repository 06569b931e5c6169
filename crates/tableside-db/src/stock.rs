use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::StockItem;

use crate::DbError;

pub fn list_stock(conn: &Connection) -> Result<Vec<StockItem>, DbError> {
    let mut stmt = conn.prepare("SELECT id, name, unit, qty FROM stock ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(StockItem {
            id: row.get(0)?,
            name: row.get(1)?,
            unit: row.get(2)?,
            qty: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

pub fn create_stock_item(
    conn: &Connection,
    name: &str,
    unit: &str,
    qty: f64,
) -> Result<i64, DbError> {
    conn.execute(
        "INSERT INTO stock (name, unit, qty) VALUES (?1, ?2, ?3)",
        params![name, unit, qty],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn patch_stock_item(
    conn: &Connection,
    item_id: i64,
    name: Option<&str>,
    unit: Option<&str>,
    qty: Option<f64>,
) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM stock WHERE id = ?1", params![item_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Stock item not found"));
    }
    if let Some(name) = name {
        conn.execute(
            "UPDATE stock SET name = ?2 WHERE id = ?1",
            params![item_id, name.trim()],
        )?;
    }
    if let Some(unit) = unit {
        conn.execute(
            "UPDATE stock SET unit = ?2 WHERE id = ?1",
            params![item_id, unit.trim()],
        )?;
    }
    if let Some(qty) = qty {
        conn.execute(
            "UPDATE stock SET qty = ?2 WHERE id = ?1",
            params![item_id, qty],
        )?;
    }
    Ok(())
}

/// Applies a delta and returns the new quantity.
pub fn adjust_stock(conn: &Connection, item_id: i64, delta: f64) -> Result<f64, DbError> {
    let current: Option<f64> = conn
        .query_row("SELECT qty FROM stock WHERE id = ?1", params![item_id], |row| {
            row.get(0)
        })
        .optional()?;
    let Some(current) = current else {
        return Err(DbError::not_found("Stock item not found"));
    };
    let next = current + delta;
    conn.execute(
        "UPDATE stock SET qty = ?2 WHERE id = ?1",
        params![item_id, next],
    )?;
    Ok(next)
}
