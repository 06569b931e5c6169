//! Relational layer: SQLite schema bootstrap and per-table repositories.
//!
//! Every function takes an explicit connection handle; HTTP handlers wrap
//! each logical operation in one transaction and commit on success. Nothing
//! here owns a connection or keeps session state.

#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "tableside-db";

mod error;
mod schema;

pub mod menu;
pub mod orders;
pub mod reservations;
pub mod settings;
pub mod staff;
pub mod stock;
pub mod tables;
pub mod zones;

pub use error::{DbError, DbErrorCode};
pub use schema::init_schema;

pub const DEFAULT_ZONE_ID: i64 = 1;
pub const DEFAULT_ZONE_NAME: &str = "Sala główna";
