use std::io::Write;
use std::net::SocketAddr;

use flate2::write::GzEncoder;
use flate2::Compression;
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tableside_db::init_schema;
use tableside_server::{build_router, AppState, ServerConfig};

struct TestServer {
    addr: SocketAddr,
    _dir: TempDir,
}

async fn start_server() -> TestServer {
    let dir = TempDir::new().expect("tempdir");
    let conn = Connection::open_in_memory().expect("open db");
    init_schema(&conn).expect("schema");
    seed(&conn);

    let config = ServerConfig {
        raports_root: dir.path().join("raports"),
        token_secret: "integration-test-secret".to_string(),
        ..ServerConfig::default()
    };
    let state = AppState::new(conn, config);
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestServer { addr, _dir: dir }
}

fn seed(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO staff (id, staff_number, first_name, last_name, phone)
             VALUES (1, 1, 'Anna', 'Nowak', '500100200');
         INSERT INTO credentials (staff_id, login, password)
             VALUES (1, 'anna', 'tajnehaslo');
         INSERT INTO staff (id, staff_number, first_name, last_name, phone)
             VALUES (2, 2, 'Piotr', 'Wiśniewski', '500300400');
         INSERT INTO zones (id, name) VALUES (1, 'Sala główna');
         INSERT INTO tables (id, number, seats, zone_id) VALUES (1, 1, 4, 1);
         INSERT INTO table_map (table_id, x, y, rotation, name, level)
             VALUES (1, 10, 20, 0, 'S1', 1);
         INSERT INTO waiters (id, staff_id, zone_id) VALUES (1, 1, 1);
         INSERT INTO menu (id, name, category, price, description)
             VALUES (1, 'Pierogi', 'Dania', 25.0, '');",
    )
    .expect("seed data");
    // Piotr's stored credential is a digest, not plaintext.
    conn.execute(
        "INSERT INTO credentials (staff_id, login, password) VALUES (2, 'piotr', ?1)",
        [tableside_core::sha256_hex(b"sekret")],
    )
    .expect("seed digest credential");
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> (u16, Value) {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));

    stream.write_all(req.as_bytes()).await.expect("write head");
    stream.write_all(body).await.expect("write body");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    let text = String::from_utf8_lossy(&raw);
    let status: u16 = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status code");
    let payload = text
        .split("\r\n\r\n")
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or(Value::Null);
    (status, payload)
}

async fn send_json(
    addr: SocketAddr,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: &Value,
) -> (u16, Value) {
    let auth;
    let mut headers: Vec<(&str, &str)> = vec![("Content-Type", "application/json")];
    if let Some(token) = token {
        auth = format!("Bearer {token}");
        headers.push(("Authorization", auth.as_str()));
        let body = serde_json::to_vec(body).expect("body");
        return send(addr, method, path, &headers, &body).await;
    }
    let body = serde_json::to_vec(body).expect("body");
    send(addr, method, path, &headers, &body).await
}

async fn login(addr: SocketAddr, login: &str, password: &str) -> (u16, Value) {
    send_json(
        addr,
        "POST",
        "/login",
        None,
        &json!({"login": login, "password": password}),
    )
    .await
}

async fn token(addr: SocketAddr) -> String {
    let (status, body) = login(addr, "anna", "tajnehaslo").await;
    assert_eq!(status, 200);
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn healthz_needs_no_token() {
    let server = start_server().await;
    let (status, body) = send(server.addr, "GET", "/healthz", &[], b"").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn login_issues_token_and_reports_identity() {
    let server = start_server().await;
    let (status, body) = login(server.addr, "anna", "tajnehaslo").await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["id"], json!(1));
    assert_eq!(body["login"], "anna");
    assert_eq!(body["imie"], "Anna");
    assert_eq!(body["nazwisko"], "Nowak");
    assert_eq!(body["hash"], "tajnehaslo");
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
}

#[tokio::test]
async fn login_matches_stored_digest_against_presented_plaintext() {
    let server = start_server().await;
    // Piotr's stored value is sha256("sekret"); presenting the plaintext
    // must match, presenting anything else must not.
    let (status, body) = login(server.addr, "piotr", "sekret").await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], json!(true));

    let (status, _) = login(server.addr, "piotr", "zlehaslo").await;
    assert_eq!(status, 403);

    // The digest of the stored plaintext is not itself a valid password.
    let digest = tableside_core::sha256_hex(b"tajnehaslo");
    let (status, _) = login(server.addr, "anna", &digest).await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn login_failure_statuses() {
    let server = start_server().await;

    let (status, body) = send_json(server.addr, "POST", "/login", None, &json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], "Brak loginu");

    let (status, _) = send_json(
        server.addr,
        "POST",
        "/login",
        None,
        &json!({"login": "anna"}),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = login(server.addr, "ghost", "x").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Nieprawidłowy login");

    let (status, body) = login(server.addr, "anna", "wrong").await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Nieprawidłowe hasło");
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let server = start_server().await;

    let (status, body) = send(server.addr, "GET", "/menu", &[], b"").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Missing Bearer token");

    let (status, body) = send(
        server.addr,
        "GET",
        "/menu",
        &[("Authorization", "Bearer not.a.token")],
        b"",
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid token");

    let (status, body) = send(
        server.addr,
        "GET",
        "/menu",
        &[("Authorization", "Token abc")],
        b"",
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Missing Bearer token");
}

#[tokio::test]
async fn archive_day_flow_over_http() {
    let server = start_server().await;
    let token = token(server.addr).await;

    let (status, body) = send_json(
        server.addr,
        "POST",
        "/raports/archive",
        Some(&token),
        &json!({"Date": "2025-06-01", "Source": "POS", "Payload": {"x": 1}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["date"], "2025-06-01");
    assert_eq!(body["entries_added"], 1);
    assert_eq!(body["total_entries"], 1);

    let (status, body) = send_json(
        server.addr,
        "POST",
        "/raports/archive",
        Some(&token),
        &json!({"Date": "2025-06-01", "Source": "POS", "Payload": {"x": 2}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["total_entries"], 2);

    let auth = format!("Bearer {token}");
    let (status, body) = send(
        server.addr,
        "GET",
        "/raports/day?date=2025-06-01",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["Date"], "2025-06-01");
    let entries = body["Entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["Payload"], json!({"x": 1}));
    assert_eq!(entries[1]["Payload"], json!({"x": 2}));

    let (status, body) = send(
        server.addr,
        "GET",
        "/raports/exists?date=2025-06-01",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["Exists"], json!(true));

    let (status, body) = send(
        server.addr,
        "GET",
        "/raports/list?year=2025&month=06",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["Items"].as_array().expect("items").len(), 1);
    assert_eq!(body["Items"][0]["Date"], "2025-06-01");
}

#[tokio::test]
async fn unwritten_day_is_404_and_bad_date_is_400() {
    let server = start_server().await;
    let token = token(server.addr).await;
    let auth = format!("Bearer {token}");

    let (status, body) = send(
        server.addr,
        "GET",
        "/raports/day?date=2099-01-01",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Report not found");

    let (status, body) = send(
        server.addr,
        "GET",
        "/raports/day?date=01.06.2025",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid date format. Expected YYYY-MM-DD");

    let (status, body) = send(
        server.addr,
        "GET",
        "/raports/day",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing query param: date=YYYY-MM-DD");
}

#[tokio::test]
async fn upload_gz_appends_bulk_entries() {
    let server = start_server().await;
    let token = token(server.addr).await;
    let auth = format!("Bearer {token}");

    let report = json!({
        "Date": "2025-06-02",
        "Entries": [
            {"Source": "POS", "Payload": {"total": 120.5}},
            {"Source": "POS", "Payload": {"total": 80.0}},
        ],
    });
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&serde_json::to_vec(&report).expect("report"))
        .expect("gzip write");
    let gz_body = encoder.finish().expect("gzip finish");

    let (status, body) = send(
        server.addr,
        "POST",
        "/raports/upload-gz",
        &[("Authorization", &auth), ("Content-Type", "application/gzip")],
        &gz_body,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["entries_added"], 2);
    assert_eq!(body["total_entries"], 2);

    let (status, body) = send(
        server.addr,
        "POST",
        "/raports/upload-gz",
        &[("Authorization", &auth)],
        b"definitely not gzip",
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid gzip or JSON");
}

#[tokio::test]
async fn menu_and_orders_flow_over_http() {
    let server = start_server().await;
    let token = token(server.addr).await;
    let auth = format!("Bearer {token}");

    let (status, body) = send(server.addr, "GET", "/menu", &[("Authorization", &auth)], b"").await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["Name"], "Pierogi");

    let (status, body) = send_json(
        server.addr,
        "POST",
        "/orders",
        Some(&token),
        &json!({"TableId": 1, "WaiterId": 1, "Items": [{"MenuId": 1, "Qty": 2}], "Notes": "bez cebuli"}),
    )
    .await;
    assert_eq!(status, 201);
    let order_id = body["OrderId"].as_i64().expect("order id");

    let (status, body) = send(
        server.addr,
        "GET",
        "/orders",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["TableId"], 1);
    assert_eq!(body[0]["Orders"][0]["OrderId"], order_id);
    assert_eq!(body[0]["Orders"][0]["Items"][0]["Name"], "Pierogi");

    let (status, body) = send_json(
        server.addr,
        "POST",
        "/orders",
        Some(&token),
        &json!({"TableId": 1}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing TableId / WaiterId / Items");
}

#[tokio::test]
async fn staff_delete_conflict_surfaces_has_orders_code() {
    let server = start_server().await;
    let token = token(server.addr).await;

    let (status, _) = send_json(
        server.addr,
        "POST",
        "/orders",
        Some(&token),
        &json!({"TableId": 1, "WaiterId": 1, "Items": [{"MenuId": 1, "Qty": 1}]}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = send_json(
        server.addr,
        "DELETE",
        "/staff/1",
        Some(&token),
        &json!({}),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "Cannot delete staff with existing orders");
    assert_eq!(body["code"], "HAS_ORDERS");
}

#[tokio::test]
async fn foreign_secret_token_is_rejected() {
    let server = start_server().await;
    let other = tableside_auth::TokenService::new(tableside_auth::TokenConfig::new(
        b"some-other-secret".to_vec(),
    ));
    let forged = other.issue(1, "anna").expect("issue");
    let auth = format!("Bearer {forged}");

    let (status, body) = send(
        server.addr,
        "GET",
        "/menu",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let server = start_server().await;
    // Same secret as the server, zero TTL: expired the moment it is issued.
    let short_lived = tableside_auth::TokenService::new(
        tableside_auth::TokenConfig::new(b"integration-test-secret".to_vec())
            .with_ttl(std::time::Duration::from_secs(0)),
    );
    let stale = short_lived.issue(1, "anna").expect("issue");
    let auth = format!("Bearer {stale}");

    let (status, body) = send(
        server.addr,
        "GET",
        "/menu",
        &[("Authorization", &auth)],
        b"",
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Token expired");
}
