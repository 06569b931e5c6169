use chrono::{Days, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use tableside_model::{bool_from_served, bool_from_status, Order, OrderItem, TableOrders};

use crate::tables::ensure_table;
use crate::{menu, DbError, DEFAULT_ZONE_ID, DEFAULT_ZONE_NAME};

const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub menu_id: i64,
    pub qty: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedItem {
    pub item_id: i64,
    pub order_id: i64,
    pub name: String,
    pub qty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncCounts {
    pub orders: usize,
    pub positions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeCounts {
    pub orders: usize,
    pub positions: usize,
}

#[must_use]
fn now_stamp() -> String {
    Utc::now().naive_utc().format(CREATED_AT_FORMAT).to_string()
}

/// Incoming timestamps are ISO with an optional `Z`/space; anything else
/// falls back to the current time, never an error.
#[must_use]
pub fn normalize_created_at(value: &str) -> String {
    let s = value.trim();
    if s.is_empty() {
        return now_stamp();
    }
    let s = s.strip_suffix('Z').unwrap_or(s).replace(' ', "T");
    match NaiveDateTime::parse_from_str(&s, CREATED_AT_FORMAT) {
        Ok(dt) => dt.format(CREATED_AT_FORMAT).to_string(),
        Err(_) => now_stamp(),
    }
}

fn day_bounds(date: NaiveDate) -> (String, String) {
    let start = format!("{}T00:00:00", date.format("%Y-%m-%d"));
    let next = date
        .checked_add_days(Days::new(1))
        .unwrap_or(date)
        .format("%Y-%m-%d");
    (start, format!("{next}T00:00:00"))
}

struct OrderRow {
    id: i64,
    created_at: String,
    status: String,
    notes: Option<String>,
    waiter_id: i64,
    table_id: i64,
}

fn load_items(
    conn: &Connection,
    order_id: i64,
    with_price: bool,
) -> Result<Vec<OrderItem>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT oi.id, m.name, oi.qty, oi.served, m.price
         FROM order_items oi JOIN menu m ON m.id = oi.menu_id
         WHERE oi.order_id = ?1 ORDER BY oi.id",
    )?;
    let rows = stmt.query_map(params![order_id], |row| {
        let served: String = row.get(3)?;
        let price: f64 = row.get(4)?;
        let qty: i64 = row.get(2)?;
        Ok(OrderItem {
            item_id: row.get(0)?,
            name: row.get(1)?,
            qty,
            is_served: bool_from_served(&served),
            price: with_price.then_some(price),
            line_total: with_price.then_some(price * qty as f64),
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

fn group_by_table(
    conn: &Connection,
    rows: Vec<OrderRow>,
    with_price: bool,
    with_meta: bool,
) -> Result<Vec<TableOrders>, DbError> {
    let mut grouped: Vec<TableOrders> = Vec::new();
    for row in rows {
        let items = load_items(conn, row.id, with_price)?;
        let any_items = !items.is_empty();
        let all_served = items.iter().all(|i| i.is_served);
        let order = Order {
            order_id: row.id,
            items,
            is_served: any_items && all_served,
            is_settled: bool_from_status(&row.status),
            created_at: row.created_at,
            notes: if with_meta { row.notes } else { None },
            waiter_id: with_meta.then_some(row.waiter_id),
        };
        match grouped.iter_mut().find(|g| g.table_id == row.table_id) {
            Some(group) => group.orders.push(order),
            None => grouped.push(TableOrders {
                table_id: row.table_id,
                orders: vec![order],
            }),
        }
    }
    Ok(grouped)
}

fn query_order_rows(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<OrderRow>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, |row| {
        Ok(OrderRow {
            id: row.get(0)?,
            created_at: row.get(1)?,
            status: row.get(2)?,
            notes: row.get(3)?,
            waiter_id: row.get(4)?,
            table_id: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

pub fn list_orders(conn: &Connection) -> Result<Vec<TableOrders>, DbError> {
    let rows = query_order_rows(
        conn,
        "SELECT id, created_at, status, notes, waiter_id, table_id FROM orders ORDER BY id",
        &[],
    )?;
    group_by_table(conn, rows, false, false)
}

pub fn closed_orders_for_day(
    conn: &Connection,
    date: NaiveDate,
) -> Result<Vec<TableOrders>, DbError> {
    let (start, end) = day_bounds(date);
    let rows = query_order_rows(
        conn,
        "SELECT id, created_at, status, notes, waiter_id, table_id FROM orders
         WHERE created_at >= ?1 AND created_at < ?2 AND status != 'open' ORDER BY id",
        &[&start, &end],
    )?;
    group_by_table(conn, rows, true, true)
}

pub fn create_order(
    conn: &Connection,
    table_id: i64,
    waiter_id: i64,
    notes: &str,
    items: &[NewOrderItem],
) -> Result<i64, DbError> {
    conn.execute(
        "INSERT INTO orders (created_at, status, notes, waiter_id, table_id)
         VALUES (?1, 'open', ?2, ?3, ?4)",
        params![now_stamp(), notes, waiter_id, table_id],
    )?;
    let order_id = conn.last_insert_rowid();
    for item in items {
        conn.execute(
            "INSERT INTO order_items (order_id, menu_id, qty, served) VALUES (?1, ?2, ?3, 'N')",
            params![order_id, item.menu_id, item.qty],
        )?;
    }
    Ok(order_id)
}

/// Adds an item by menu name, auto-creating the menu row for ad-hoc items.
pub fn add_order_item(
    conn: &Connection,
    order_id: i64,
    name: &str,
    qty: i64,
) -> Result<AddedItem, DbError> {
    let order_exists: bool = conn
        .query_row("SELECT 1 FROM orders WHERE id = ?1", params![order_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !order_exists {
        return Err(DbError::not_found("Order not found"));
    }

    let menu_id = match menu::find_menu_id_by_name(conn, name)? {
        Some(id) => id,
        None => menu::insert_auto_menu_item(conn, name, "AUTO")?,
    };
    conn.execute(
        "INSERT INTO order_items (order_id, menu_id, qty, served) VALUES (?1, ?2, ?3, 'N')",
        params![order_id, menu_id, qty],
    )?;
    Ok(AddedItem {
        item_id: conn.last_insert_rowid(),
        order_id,
        name: name.to_string(),
        qty,
    })
}

pub fn update_order_item(
    conn: &Connection,
    order_id: i64,
    item_id: i64,
    qty: Option<i64>,
    served: Option<bool>,
) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row(
            "SELECT 1 FROM order_items WHERE id = ?1 AND order_id = ?2",
            params![item_id, order_id],
            |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Item not found"));
    }
    if let Some(qty) = qty {
        conn.execute(
            "UPDATE order_items SET qty = ?3 WHERE id = ?1 AND order_id = ?2",
            params![item_id, order_id, qty],
        )?;
    }
    if let Some(served) = served {
        conn.execute(
            "UPDATE order_items SET served = ?3 WHERE id = ?1 AND order_id = ?2",
            params![item_id, order_id, if served { "Y" } else { "N" }],
        )?;
    }
    Ok(())
}

pub fn delete_order_item(conn: &Connection, order_id: i64, item_id: i64) -> Result<(), DbError> {
    let deleted = conn.execute(
        "DELETE FROM order_items WHERE id = ?1 AND order_id = ?2",
        params![item_id, order_id],
    )?;
    if deleted == 0 {
        return Err(DbError::not_found("Item not found"));
    }
    Ok(())
}

pub fn update_order_status(
    conn: &Connection,
    order_id: i64,
    status: Option<&str>,
    set_all_served: bool,
) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM orders WHERE id = ?1", params![order_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Order not found"));
    }
    if let Some(status) = status {
        conn.execute(
            "UPDATE orders SET status = ?2 WHERE id = ?1",
            params![order_id, status],
        )?;
    }
    if set_all_served {
        conn.execute(
            "UPDATE order_items SET served = 'Y' WHERE order_id = ?1",
            params![order_id],
        )?;
    }
    Ok(())
}

pub fn delete_order(conn: &Connection, order_id: i64) -> Result<(), DbError> {
    let exists: bool = conn
        .query_row("SELECT 1 FROM orders WHERE id = ?1", params![order_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(DbError::not_found("Order not found"));
    }
    conn.execute("DELETE FROM order_items WHERE order_id = ?1", params![order_id])?;
    conn.execute("DELETE FROM orders WHERE id = ?1", params![order_id])?;
    Ok(())
}

/// A waiter to own synced orders: the first one on file, else one built from
/// the first staff member, else a bootstrap "System" employee.
fn default_waiter_id(conn: &Connection) -> Result<i64, DbError> {
    let waiter: Option<i64> = conn
        .query_row("SELECT id FROM waiters ORDER BY id LIMIT 1", [], |row| row.get(0))
        .optional()?;
    if let Some(id) = waiter {
        return Ok(id);
    }

    let staff: Option<i64> = conn
        .query_row("SELECT id FROM staff ORDER BY id LIMIT 1", [], |row| row.get(0))
        .optional()?;
    let staff_id = match staff {
        Some(id) => id,
        None => {
            conn.execute(
                "INSERT INTO staff (staff_number, first_name, last_name, phone)
                 VALUES (1, 'System', 'System', '000000000')",
                [],
            )?;
            conn.last_insert_rowid()
        }
    };

    let zone: Option<i64> = conn
        .query_row("SELECT id FROM zones ORDER BY id LIMIT 1", [], |row| row.get(0))
        .optional()?;
    let zone_id = match zone {
        Some(id) => id,
        None => {
            conn.execute(
                "INSERT INTO zones (id, name) VALUES (?1, ?2)",
                params![DEFAULT_ZONE_ID, DEFAULT_ZONE_NAME],
            )?;
            DEFAULT_ZONE_ID
        }
    };

    conn.execute(
        "INSERT INTO waiters (staff_id, zone_id) VALUES (?1, ?2)",
        params![staff_id, zone_id],
    )?;
    let waiter_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT OR IGNORE INTO waiter_zones (waiter_id, zone_id) VALUES (?1, ?2)",
        params![waiter_id, zone_id],
    )?;
    Ok(waiter_id)
}

/// Full rebuild from the client's grouped export: wipes orders and items,
/// then reinserts everything, auto-creating tables and menu rows as needed.
pub fn sync_orders(conn: &Connection, payload: &[TableOrders]) -> Result<SyncCounts, DbError> {
    let waiter_id = default_waiter_id(conn)?;

    conn.execute("DELETE FROM order_items", [])?;
    conn.execute("DELETE FROM orders", [])?;

    let mut counts = SyncCounts::default();
    for block in payload {
        if block.table_id <= 0 {
            continue;
        }
        ensure_table(conn, block.table_id)?;

        for order in &block.orders {
            let created_at = normalize_created_at(&order.created_at);
            let status = if order.is_settled { "paid" } else { "open" };
            conn.execute(
                "INSERT INTO orders (created_at, status, notes, waiter_id, table_id)
                 VALUES (?1, ?2, NULL, ?3, ?4)",
                params![created_at, status, waiter_id, block.table_id],
            )?;
            let order_id = conn.last_insert_rowid();

            for item in &order.items {
                if item.name.is_empty() {
                    continue;
                }
                let menu_id = match menu::find_menu_id_by_name(conn, &item.name)? {
                    Some(id) => id,
                    None => menu::insert_auto_menu_item(conn, &item.name, "AUTO z orders.json")?,
                };
                conn.execute(
                    "INSERT INTO order_items (order_id, menu_id, qty, served)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        order_id,
                        menu_id,
                        item.qty.max(1),
                        if order.is_served { "Y" } else { "N" }
                    ],
                )?;
                counts.positions += 1;
            }
            counts.orders += 1;
        }
    }
    Ok(counts)
}

pub fn purge_closed_for_day(conn: &Connection, date: NaiveDate) -> Result<PurgeCounts, DbError> {
    let (start, end) = day_bounds(date);
    let mut stmt = conn.prepare(
        "SELECT id FROM orders WHERE created_at >= ?1 AND created_at < ?2 AND status != 'open'",
    )?;
    let ids = stmt
        .query_map(params![start, end], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    if ids.is_empty() {
        return Ok(PurgeCounts::default());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let positions = conn.execute(
        &format!("DELETE FROM order_items WHERE order_id IN ({placeholders})"),
        rusqlite::params_from_iter(ids.iter().copied()),
    )?;
    let orders = conn.execute(
        &format!("DELETE FROM orders WHERE id IN ({placeholders})"),
        rusqlite::params_from_iter(ids.iter().copied()),
    )?;
    Ok(PurgeCounts { orders, positions })
}
