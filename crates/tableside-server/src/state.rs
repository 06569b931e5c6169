use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use tableside_api::ApiError;
use tableside_archive::ReportArchive;
use tableside_auth::{TokenConfig, TokenService};
use tableside_db::DbError;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub archive: ReportArchive,
    pub tokens: TokenService,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(conn: Connection, config: ServerConfig) -> Self {
        let archive = ReportArchive::new(config.raports_root.clone())
            .with_max_upload_bytes(config.max_upload_bytes);
        let tokens = TokenService::new(
            TokenConfig::new(config.token_secret.as_bytes().to_vec()).with_ttl(config.token_ttl),
        );
        Self {
            db: Arc::new(Mutex::new(conn)),
            archive,
            tokens,
            config: Arc::new(config),
        }
    }

    /// Runs one logical operation in its own transaction; commit on success,
    /// rollback on drop otherwise.
    pub async fn with_db<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, ApiError> {
        let mut conn = self.db.lock().await;
        let tx = conn.transaction().map_err(DbError::from)?;
        let out = op(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(out)
    }
}
