#![forbid(unsafe_code)]

use rusqlite::Connection;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tableside_archive::LockCapability;
use tableside_db::init_schema;
use tableside_server::config::env_bool;
use tableside_server::{build_router, validate_startup_config, AppState, ServerConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TABLESIDE_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = ServerConfig::from_env();
    validate_startup_config(&config)?;

    let conn = Connection::open(&config.db_path)
        .map_err(|e| format!("failed to open {}: {e}", config.db_path.display()))?;
    init_schema(&conn).map_err(|e| format!("schema init failed: {e}"))?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(conn, config);

    match state.archive.lock_capability() {
        Ok(LockCapability::OsAdvisory) => {
            info!(root = %state.archive.root().display(), "report archive lock: os advisory")
        }
        Ok(LockCapability::FallbackOnly) => warn!(
            root = %state.archive.root().display(),
            "report archive lock unsupported here; concurrent appends can lose entries"
        ),
        Err(e) => return Err(format!("archive root unusable: {e}")),
    }

    let app = build_router(state);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("tableside-server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
