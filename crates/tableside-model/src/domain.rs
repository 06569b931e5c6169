use serde::{Deserialize, Serialize};

/// Staff member joined with their login credentials, as served by `/staff`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffMember {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Login")]
    pub login: String,
    #[serde(rename = "PasswordHash")]
    pub password_hash: String,
    #[serde(rename = "IsActive")]
    pub is_active: bool,
}

/// Floor-plan node: a table joined with its map placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNode {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "X")]
    pub x: i64,
    #[serde(rename = "Y")]
    pub y: i64,
    #[serde(rename = "Width")]
    pub width: i64,
    #[serde(rename = "Height")]
    pub height: i64,
    // Legacy wire key kept verbatim for the desktop client.
    #[serde(rename = "Ile_osob")]
    pub seats: i64,
    #[serde(rename = "status")]
    pub status: String,
    #[serde(rename = "Level")]
    pub level: i64,
}

/// Zone with its assigned tables and staff, as served by `/table-groups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableGroup {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "AssignedTableIds")]
    pub assigned_table_ids: Vec<i64>,
    #[serde(rename = "AssignedStaffIds")]
    pub assigned_staff_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    // The desktop client has exported this under three different keys.
    #[serde(rename = "Category", alias = "Type", alias = "Typ")]
    pub category: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "IsActive")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItem {
    #[serde(rename = "ItemId")]
    pub item_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Qty")]
    pub qty: i64,
    #[serde(rename = "IsServed")]
    pub is_served: bool,
    #[serde(rename = "Price", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "LineTotal", skip_serializing_if = "Option::is_none")]
    pub line_total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    #[serde(rename = "OrderId")]
    pub order_id: i64,
    #[serde(rename = "Items")]
    pub items: Vec<OrderItem>,
    #[serde(rename = "IsServed")]
    pub is_served: bool,
    #[serde(rename = "IsSettled")]
    pub is_settled: bool,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "WaiterId", skip_serializing_if = "Option::is_none")]
    pub waiter_id: Option<i64>,
}

/// Orders grouped under the table that owns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOrders {
    #[serde(rename = "TableId")]
    pub table_id: i64,
    #[serde(rename = "Orders")]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reservation {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
    #[serde(rename = "PeopleCount")]
    pub people_count: i64,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Time")]
    pub time: Option<String>,
    #[serde(rename = "StartTime")]
    pub start_time: Option<String>,
    #[serde(rename = "Approved")]
    pub approved: bool,
    #[serde(rename = "TableId")]
    pub table_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockItem {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Qty")]
    pub qty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Setting {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

/// Reservation settings view assembled from the key/value settings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSettings {
    #[serde(rename = "RequireApproval")]
    pub require_approval: bool,
    #[serde(rename = "ReservationIntervalMinutes")]
    pub reservation_interval_minutes: i64,
    #[serde(rename = "OpenFrom")]
    pub open_from: String,
    #[serde(rename = "CloseTo")]
    pub close_to: String,
}
