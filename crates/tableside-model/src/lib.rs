#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "tableside-model";

mod date;
mod domain;
mod report;
mod time;

pub use date::{InvalidDate, ReportDate};
pub use domain::{
    MenuItem, Order, OrderItem, Reservation, ReservationSettings, Setting, StaffMember, StockItem,
    TableGroup, TableNode, TableOrders,
};
pub use report::{DayReport, ReportEntry, ReportPayload};
pub use time::{
    bool_from_served, bool_from_status, parse_reservation_date, parse_reservation_time, utc_now_z,
};
