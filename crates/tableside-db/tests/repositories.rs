use chrono::NaiveDate;
use rusqlite::Connection;

use tableside_db::{
    init_schema, menu, orders, reservations, settings, staff, stock, tables, zones, DbErrorCode,
};
use tableside_model::{MenuItem, Order, OrderItem, Reservation, StaffMember, TableGroup, TableNode, TableOrders};

fn conn() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    init_schema(&conn).expect("init schema");
    conn
}

fn staff_item(id: i64, login: &str) -> StaffMember {
    StaffMember {
        id,
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        phone: "123456789".to_string(),
        email: None,
        login: login.to_string(),
        password_hash: format!("hash-{id}"),
        is_active: true,
    }
}

#[test]
fn staff_create_list_and_credentials() {
    let conn = conn();
    let id = staff::create_staff(&conn, "Anna", "Nowak", "500100200", "anna", "h1")
        .expect("create staff");

    let listed = staff::list_staff(&conn).expect("list staff");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].login, "anna");
    assert_eq!(listed[0].password_hash, "h1");

    let row = staff::find_credentials(&conn, "anna")
        .expect("query")
        .expect("row");
    assert_eq!(row.staff_id, id);
    assert_eq!(row.first_name.as_deref(), Some("Anna"));

    assert!(staff::find_credentials(&conn, "nobody").expect("query").is_none());
}

#[test]
fn staff_numbers_increment() {
    let conn = conn();
    staff::create_staff(&conn, "A", "A", "1", "a", "h").expect("first");
    staff::create_staff(&conn, "B", "B", "2", "b", "h").expect("second");
    let max: i64 = conn
        .query_row("SELECT MAX(staff_number) FROM staff", [], |r| r.get(0))
        .expect("max");
    assert_eq!(max, 2);
}

#[test]
fn staff_update_patches_only_given_fields() {
    let conn = conn();
    let id = staff::create_staff(&conn, "Anna", "Nowak", "500100200", "anna", "h1")
        .expect("create staff");
    staff::update_staff(
        &conn,
        id,
        &staff::StaffUpdate {
            phone: Some("600700800".to_string()),
            password_hash: Some("h2".to_string()),
            ..staff::StaffUpdate::default()
        },
    )
    .expect("update");

    let listed = staff::list_staff(&conn).expect("list");
    assert_eq!(listed[0].first_name, "Anna");
    assert_eq!(listed[0].phone, "600700800");
    assert_eq!(listed[0].password_hash, "h2");

    let err = staff::update_staff(&conn, 999, &staff::StaffUpdate::default()).expect_err("missing");
    assert_eq!(err.code, DbErrorCode::NotFound);
}

#[test]
fn staff_delete_with_orders_is_conflict() {
    let conn = conn();
    let sid = staff::create_staff(&conn, "Anna", "Nowak", "1", "anna", "h").expect("staff");
    tables::ensure_default_zone(&conn).expect("zone");
    tables::ensure_table(&conn, 1).expect("table");
    conn.execute(
        "INSERT INTO waiters (staff_id, zone_id) VALUES (?1, 1)",
        [sid],
    )
    .expect("waiter");
    let wid = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO orders (created_at, status, waiter_id, table_id)
         VALUES ('2025-06-01T12:00:00', 'open', ?1, 1)",
        [wid],
    )
    .expect("order");

    let err = staff::delete_staff(&conn, sid).expect_err("conflict");
    assert_eq!(err.code, DbErrorCode::Conflict);
    assert_eq!(err.detail_code, Some("HAS_ORDERS"));

    conn.execute("DELETE FROM orders", []).expect("clear orders");
    staff::delete_staff(&conn, sid).expect("delete");
    assert!(staff::list_staff(&conn).expect("list").is_empty());
}

#[test]
fn staff_sync_upserts_by_id() {
    let conn = conn();
    let stats =
        staff::sync_staff(&conn, &[staff_item(1, "a"), staff_item(2, "b")]).expect("sync one");
    assert_eq!((stats.new, stats.updated, stats.total), (2, 0, 2));

    let mut changed = staff_item(1, "a2");
    changed.first_name = "Changed".to_string();
    let stats = staff::sync_staff(&conn, &[changed]).expect("sync two");
    assert_eq!((stats.new, stats.updated, stats.total), (0, 1, 1));

    let listed = staff::list_staff(&conn).expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].first_name, "Changed");
    assert_eq!(listed[0].login, "a2");
}

#[test]
fn password_change_requires_matching_old_hash() {
    let conn = conn();
    let id = staff::create_staff(&conn, "A", "B", "1", "a", "old").expect("staff");

    let err = staff::change_password(&conn, id, "wrong", "new").expect_err("must fail");
    assert_eq!(err.code, DbErrorCode::Forbidden);

    staff::change_password(&conn, id, "old", "new").expect("change");
    let row = staff::find_credentials(&conn, "a").expect("query").expect("row");
    assert_eq!(row.password, "new");

    let err = staff::change_password(&conn, 999, "x", "y").expect_err("missing user");
    assert_eq!(err.code, DbErrorCode::NotFound);
}

fn menu_item(id: i64, name: &str, price: f64) -> MenuItem {
    MenuItem {
        id,
        name: name.to_string(),
        category: "Dania".to_string(),
        price,
        is_active: true,
    }
}

#[test]
fn menu_sync_removes_absent_rows_and_their_order_items() {
    let conn = conn();
    menu::sync_menu(&conn, &[menu_item(1, "Pierogi", 25.0), menu_item(2, "Żurek", 18.0)])
        .expect("seed menu");

    tables::ensure_default_zone(&conn).expect("zone");
    tables::ensure_table(&conn, 1).expect("table");
    let payload = vec![TableOrders {
        table_id: 1,
        orders: vec![Order {
            order_id: 0,
            items: vec![
                OrderItem {
                    name: "Pierogi".to_string(),
                    qty: 2,
                    ..OrderItem::default()
                },
                OrderItem {
                    name: "Żurek".to_string(),
                    qty: 1,
                    ..OrderItem::default()
                },
            ],
            created_at: "2025-06-01T12:00:00".to_string(),
            ..Order::default()
        }],
    }];
    orders::sync_orders(&conn, &payload).expect("orders");

    // Drop item 2 from the menu; its order items must go with it.
    menu::sync_menu(&conn, &[menu_item(1, "Pierogi", 26.0)]).expect("sync");

    let listed = menu::list_menu(&conn).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].price, 26.0);

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM order_items", [], |r| r.get(0))
        .expect("count");
    assert_eq!(remaining, 1);
}

#[test]
fn menu_delete_cascades_order_items() {
    let conn = conn();
    menu::sync_menu(&conn, &[menu_item(1, "Pierogi", 25.0)]).expect("menu");
    let err = menu::delete_menu_item(&conn, 42).expect_err("missing");
    assert_eq!(err.code, DbErrorCode::NotFound);
    menu::delete_menu_item(&conn, 1).expect("delete");
    assert!(menu::list_menu(&conn).expect("list").is_empty());
}

#[test]
fn menu_defaults_category_to_inne() {
    let conn = conn();
    conn.execute(
        "INSERT INTO menu (id, name, category, price, description) VALUES (1, 'X', NULL, 5, '')",
        [],
    )
    .expect("insert");
    let listed = menu::list_menu(&conn).expect("list");
    assert_eq!(listed[0].category, "Inne");
}

fn node(id: i64, name: &str, level: i64) -> TableNode {
    TableNode {
        id,
        name: name.to_string(),
        x: 10 * id,
        y: 20 * id,
        level,
        ..TableNode::default()
    }
}

#[test]
fn tables_sync_upserts_and_prunes_per_level() {
    let conn = conn();
    let count = tables::sync_tables(&conn, &[node(1, "S1", 1), node(2, "S2", 1)]).expect("sync");
    assert_eq!(count, 2);
    assert_eq!(tables::list_tables(&conn).expect("list").len(), 2);

    // Second sync for level 1 drops table 2's placement.
    tables::sync_tables(&conn, &[node(1, "S1b", 1)]).expect("resync");
    let listed = tables::list_tables(&conn).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "S1b");
    assert_eq!(listed[0].width, tables::DEFAULT_WIDTH);
    assert_eq!(listed[0].status, "wolny");
}

#[test]
fn table_seat_patch_validates_presence() {
    let conn = conn();
    tables::sync_tables(&conn, &[node(1, "S1", 1)]).expect("sync");
    tables::patch_table_seats(&conn, 1, 6).expect("patch");
    assert_eq!(tables::list_tables(&conn).expect("list")[0].seats, 6);

    let err = tables::patch_table_seats(&conn, 9, 4).expect_err("missing");
    assert_eq!(err.code, DbErrorCode::NotFound);
}

#[test]
fn table_groups_sync_replaces_links_and_sets_primary_zone() {
    let conn = conn();
    staff::sync_staff(&conn, &[staff_item(10, "w1")]).expect("staff");
    tables::sync_tables(&conn, &[node(1, "S1", 1), node(2, "S2", 1)]).expect("tables");

    let groups = vec![
        TableGroup {
            id: 1,
            name: "Sala".to_string(),
            assigned_table_ids: vec![1, 2],
            assigned_staff_ids: vec![10],
        },
        TableGroup {
            id: 2,
            name: "Ogródek".to_string(),
            assigned_table_ids: vec![2],
            assigned_staff_ids: vec![10, 999],
        },
    ];
    zones::sync_table_groups(&conn, &groups).expect("sync groups");

    let listed = zones::list_table_groups(&conn).expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].assigned_table_ids, vec![1, 2]);
    assert_eq!(listed[0].assigned_staff_ids, vec![10]);
    // Unknown staff id 999 is skipped, not an error.
    assert_eq!(listed[1].assigned_staff_ids, vec![10]);

    // Table 1 was first claimed by zone 1.
    let zone: i64 = conn
        .query_row("SELECT zone_id FROM tables WHERE id = 1", [], |r| r.get(0))
        .expect("zone");
    assert_eq!(zone, 1);
}

#[test]
fn orders_crud_flow() {
    let conn = conn();
    menu::sync_menu(&conn, &[menu_item(1, "Pierogi", 25.0)]).expect("menu");
    staff::sync_staff(&conn, &[staff_item(1, "w")]).expect("staff");
    tables::sync_tables(&conn, &[node(1, "S1", 1)]).expect("tables");
    zones::sync_table_groups(
        &conn,
        &[TableGroup {
            id: 1,
            name: "Sala".to_string(),
            assigned_table_ids: vec![1],
            assigned_staff_ids: vec![1],
        }],
    )
    .expect("groups");
    let waiter_id: i64 = conn
        .query_row("SELECT id FROM waiters LIMIT 1", [], |r| r.get(0))
        .expect("waiter");

    let order_id = orders::create_order(
        &conn,
        1,
        waiter_id,
        "bez cebuli",
        &[orders::NewOrderItem { menu_id: 1, qty: 2 }],
    )
    .expect("create");

    let added = orders::add_order_item(&conn, order_id, "Kompot", 1).expect("add item");
    assert_eq!(added.order_id, order_id);
    assert_eq!(added.qty, 1);
    // Ad-hoc item auto-created a menu row.
    assert!(menu::find_menu_id_by_name(&conn, "Kompot").expect("query").is_some());

    orders::update_order_item(&conn, order_id, added.item_id, Some(3), Some(true))
        .expect("update item");
    let grouped = orders::list_orders(&conn).expect("list");
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].table_id, 1);
    let order = &grouped[0].orders[0];
    assert_eq!(order.items.len(), 2);
    assert!(!order.is_served);
    assert!(!order.is_settled);
    assert!(order.items[0].price.is_none());

    orders::update_order_status(&conn, order_id, Some("paid"), true).expect("status");
    let grouped = orders::list_orders(&conn).expect("list again");
    let order = &grouped[0].orders[0];
    assert!(order.is_served);
    assert!(order.is_settled);

    orders::delete_order_item(&conn, order_id, added.item_id).expect("delete item");
    let err = orders::delete_order_item(&conn, order_id, added.item_id).expect_err("gone");
    assert_eq!(err.code, DbErrorCode::NotFound);

    orders::delete_order(&conn, order_id).expect("delete order");
    assert!(orders::list_orders(&conn).expect("final list").is_empty());
}

#[test]
fn orders_sync_rebuilds_from_grouped_payload() {
    let conn = conn();
    let payload = vec![
        TableOrders {
            table_id: 5,
            orders: vec![Order {
                items: vec![OrderItem {
                    name: "Pierogi".to_string(),
                    qty: 2,
                    ..OrderItem::default()
                }],
                is_settled: true,
                is_served: true,
                created_at: "2025-06-01T12:30:00".to_string(),
                ..Order::default()
            }],
        },
        TableOrders {
            table_id: 6,
            orders: vec![Order {
                items: vec![OrderItem {
                    name: "Żurek".to_string(),
                    qty: 1,
                    ..OrderItem::default()
                }],
                created_at: "bogus".to_string(),
                ..Order::default()
            }],
        },
    ];
    let counts = orders::sync_orders(&conn, &payload).expect("sync");
    assert_eq!((counts.orders, counts.positions), (2, 2));

    let grouped = orders::list_orders(&conn).expect("list");
    assert_eq!(grouped.len(), 2);
    let settled = grouped.iter().find(|g| g.table_id == 5).expect("table 5");
    assert!(settled.orders[0].is_settled);
    assert!(settled.orders[0].is_served);
    assert_eq!(settled.orders[0].created_at, "2025-06-01T12:30:00");

    // A second sync replaces everything instead of accumulating.
    orders::sync_orders(&conn, &payload[..1].to_vec()).expect("resync");
    assert_eq!(orders::list_orders(&conn).expect("list").len(), 1);
}

#[test]
fn closed_orders_day_filter_and_purge() {
    let conn = conn();
    let payload = vec![TableOrders {
        table_id: 1,
        orders: vec![
            Order {
                items: vec![OrderItem {
                    name: "Pierogi".to_string(),
                    qty: 2,
                    ..OrderItem::default()
                }],
                is_settled: true,
                created_at: "2025-06-01T12:00:00".to_string(),
                ..Order::default()
            },
            Order {
                items: vec![OrderItem {
                    name: "Żurek".to_string(),
                    qty: 1,
                    ..OrderItem::default()
                }],
                is_settled: false,
                created_at: "2025-06-01T13:00:00".to_string(),
                ..Order::default()
            },
            Order {
                items: Vec::new(),
                is_settled: true,
                created_at: "2025-06-02T09:00:00".to_string(),
                ..Order::default()
            },
        ],
    }];
    orders::sync_orders(&conn, &payload).expect("sync");

    let day = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");
    let closed = orders::closed_orders_for_day(&conn, day).expect("closed");
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].orders.len(), 1);
    let order = &closed[0].orders[0];
    assert!(order.is_settled);
    assert_eq!(order.items[0].price, Some(0.0));
    assert_eq!(order.items[0].line_total, Some(0.0));
    assert!(order.waiter_id.is_some());

    let purged = orders::purge_closed_for_day(&conn, day).expect("purge");
    assert_eq!((purged.orders, purged.positions), (1, 1));

    // The open order from that day survives.
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM orders", [], |r| r.get(0))
        .expect("count");
    assert_eq!(remaining, 2);

    let purged = orders::purge_closed_for_day(&conn, day).expect("second purge");
    assert_eq!((purged.orders, purged.positions), (0, 0));
}

fn reservation(id: i64, date: Option<&str>, time: Option<&str>, start: Option<&str>) -> Reservation {
    Reservation {
        id,
        first_name: "Jan".to_string(),
        last_name: "Kowalski".to_string(),
        phone: Some("555123456".to_string()),
        people_count: 4,
        date: date.map(str::to_string),
        time: time.map(str::to_string),
        start_time: start.map(str::to_string),
        approved: false,
        table_id: Some(1),
    }
}

#[test]
fn reservations_sync_parses_dates_and_skips_unresolvable_rows() {
    let conn = conn();
    let items = vec![
        reservation(1, Some("2026-01-14"), Some("18:30"), None),
        reservation(2, Some("15.01.2026"), Some("19:00:00"), None),
        reservation(3, None, None, Some("2026-01-16T20:00:00")),
        reservation(4, None, None, None),
    ];
    let count = reservations::sync_reservations(&conn, &items).expect("sync");
    assert_eq!(count, 3);

    let listed = reservations::list_reservations(&conn).expect("list");
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].date.as_deref(), Some("2026-01-14"));
    assert_eq!(listed[0].time.as_deref(), Some("18:30:00"));
    assert_eq!(listed[0].start_time.as_deref(), Some("2026-01-14T18:30:00"));
    assert_eq!(listed[1].date.as_deref(), Some("2026-01-15"));
    assert_eq!(listed[2].date.as_deref(), Some("2026-01-16"));
}

#[test]
fn reservations_sync_replaces_blank_names() {
    let conn = conn();
    let mut item = reservation(1, Some("2026-01-14"), Some("18:30"), None);
    item.first_name = "  ".to_string();
    item.last_name = String::new();
    reservations::sync_reservations(&conn, &[item]).expect("sync");
    let listed = reservations::list_reservations(&conn).expect("list");
    assert_eq!(listed[0].first_name, "—");
    assert_eq!(listed[0].last_name, "—");
}

#[test]
fn reservation_approval_patch() {
    let conn = conn();
    reservations::sync_reservations(&conn, &[reservation(1, Some("2026-01-14"), Some("18:30"), None)])
        .expect("sync");
    reservations::set_reservation_approved(&conn, 1, true).expect("approve");
    assert!(reservations::list_reservations(&conn).expect("list")[0].approved);

    let err = reservations::set_reservation_approved(&conn, 99, true).expect_err("missing");
    assert_eq!(err.code, DbErrorCode::NotFound);
    assert_eq!(err.message, "Reservation 99 not found");
}

#[test]
fn stock_flow() {
    let conn = conn();
    let id = stock::create_stock_item(&conn, "Mąka", "kg", 10.0).expect("create");
    stock::create_stock_item(&conn, "Cukier", "kg", 5.0).expect("create second");

    // Name-ordered listing.
    let listed = stock::list_stock(&conn).expect("list");
    assert_eq!(listed[0].name, "Cukier");
    assert_eq!(listed[1].name, "Mąka");

    stock::patch_stock_item(&conn, id, Some(" Mąka pszenna "), None, Some(12.5)).expect("patch");
    let listed = stock::list_stock(&conn).expect("list");
    let flour = listed.iter().find(|i| i.id == id).expect("flour");
    assert_eq!(flour.name, "Mąka pszenna");
    assert_eq!(flour.qty, 12.5);

    let new_qty = stock::adjust_stock(&conn, id, -2.0).expect("adjust");
    assert_eq!(new_qty, 10.5);

    let err = stock::adjust_stock(&conn, 999, 1.0).expect_err("missing");
    assert_eq!(err.code, DbErrorCode::NotFound);
}

#[test]
fn settings_upsert_and_reservation_view() {
    let conn = conn();
    let view = settings::reservation_settings(&conn).expect("empty view");
    assert!(!view.require_approval);
    assert_eq!(view.reservation_interval_minutes, 0);
    assert_eq!(view.open_from, "");

    settings::update_reservation_settings(
        &conn,
        &settings::ReservationSettingsUpdate {
            require_approval: Some(true),
            reservation_interval_minutes: Some(15),
            open_from: Some("10:00".to_string()),
            close_to: Some("22:00".to_string()),
        },
    )
    .expect("update");

    let view = settings::reservation_settings(&conn).expect("view");
    assert!(view.require_approval);
    assert_eq!(view.reservation_interval_minutes, 15);
    assert_eq!(view.open_from, "10:00");
    assert_eq!(view.close_to, "22:00");

    // Bulk-style raw writes keep existing type/description metadata.
    settings::set_value(&conn, settings::KEY_OPEN_FROM, "11:00", None, None).expect("raw set");
    let listed = settings::list_settings(&conn).expect("list");
    let open = listed
        .iter()
        .find(|s| s.name == settings::KEY_OPEN_FROM)
        .expect("open_from row");
    assert_eq!(open.value, "11:00");
    assert_eq!(open.kind.as_deref(), Some("time"));
}
