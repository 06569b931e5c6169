use rusqlite::Connection;

use crate::DbError;

/// Creates all tables if missing. Safe to run on every startup.
pub fn init_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

         CREATE TABLE IF NOT EXISTS staff (
             id INTEGER PRIMARY KEY,
             staff_number INTEGER NOT NULL,
             first_name TEXT NOT NULL,
             last_name TEXT NOT NULL,
             phone TEXT NOT NULL
         );

         CREATE TABLE IF NOT EXISTS credentials (
             id INTEGER PRIMARY KEY,
             staff_id INTEGER NOT NULL UNIQUE REFERENCES staff(id),
             login TEXT NOT NULL,
             password TEXT NOT NULL,
             salt TEXT NOT NULL DEFAULT ''
         );

         CREATE TABLE IF NOT EXISTS zones (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL
         );

         CREATE TABLE IF NOT EXISTS tables (
             id INTEGER PRIMARY KEY,
             number INTEGER NOT NULL DEFAULT 0,
             seats INTEGER NOT NULL DEFAULT 4,
             zone_id INTEGER NOT NULL REFERENCES zones(id)
         );

         CREATE TABLE IF NOT EXISTS table_zones (
             table_id INTEGER NOT NULL REFERENCES tables(id),
             zone_id INTEGER NOT NULL REFERENCES zones(id),
             PRIMARY KEY (table_id, zone_id)
         );

         CREATE TABLE IF NOT EXISTS table_map (
             id INTEGER PRIMARY KEY,
             table_id INTEGER NOT NULL UNIQUE REFERENCES tables(id),
             x INTEGER,
             y INTEGER,
             rotation INTEGER,
             name TEXT NOT NULL,
             level INTEGER NOT NULL DEFAULT 0
         );

         CREATE TABLE IF NOT EXISTS waiters (
             id INTEGER PRIMARY KEY,
             staff_id INTEGER NOT NULL UNIQUE REFERENCES staff(id),
             zone_id INTEGER NOT NULL REFERENCES zones(id)
         );

         CREATE TABLE IF NOT EXISTS waiter_zones (
             waiter_id INTEGER NOT NULL REFERENCES waiters(id),
             zone_id INTEGER NOT NULL REFERENCES zones(id),
             PRIMARY KEY (waiter_id, zone_id)
         );

         CREATE TABLE IF NOT EXISTS menu (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             category TEXT,
             price REAL NOT NULL DEFAULT 0,
             description TEXT NOT NULL DEFAULT '',
             allergens TEXT
         );

         CREATE TABLE IF NOT EXISTS orders (
             id INTEGER PRIMARY KEY,
             created_at TEXT NOT NULL,
             status TEXT NOT NULL,
             notes TEXT,
             waiter_id INTEGER NOT NULL REFERENCES waiters(id),
             table_id INTEGER NOT NULL REFERENCES tables(id)
         );

         CREATE TABLE IF NOT EXISTS order_items (
             id INTEGER PRIMARY KEY,
             order_id INTEGER NOT NULL REFERENCES orders(id),
             menu_id INTEGER NOT NULL REFERENCES menu(id),
             qty INTEGER NOT NULL,
             served TEXT NOT NULL DEFAULT 'N'
         );

         CREATE TABLE IF NOT EXISTS reservations (
             id INTEGER PRIMARY KEY,
             first_name TEXT NOT NULL,
             last_name TEXT NOT NULL,
             phone TEXT,
             people INTEGER NOT NULL,
             date TEXT NOT NULL,
             time TEXT NOT NULL,
             approved INTEGER NOT NULL DEFAULT 0,
             table_id INTEGER
         );

         CREATE TABLE IF NOT EXISTS stock (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             unit TEXT NOT NULL,
             qty REAL NOT NULL DEFAULT 0
         );

         CREATE TABLE IF NOT EXISTS settings (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL UNIQUE,
             value TEXT NOT NULL,
             kind TEXT,
             description TEXT
         );

         CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id);
         CREATE INDEX IF NOT EXISTS idx_order_items_menu_id ON order_items(menu_id);
         CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);",
    )?;
    Ok(())
}
