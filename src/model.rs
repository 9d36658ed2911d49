pub mod entity;
pub mod memory;
pub mod migrate;
pub mod results;
pub mod seaorm;
pub mod store;
pub mod types;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::conf::{Backend, BackendKind};
use crate::erx::{self, ResultE};
use crate::model::memory::MemoryStore;
use crate::model::seaorm::SeaStore;
use crate::model::store::Store;

pub type SharedStore = Arc<dyn Store>;

/// open the configured store, running the migration first when `migrate` is set
pub async fn open_store(backend: &Backend) -> ResultE<SharedStore> {
    match backend.kind {
        BackendKind::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        },
        BackendKind::Sqlite | BackendKind::Postgres => {
            info!("Connecting to {}", backend.kind);
            let db = new_database_connection(backend).await?;
            if backend.migrate {
                migrate::Migrator::up(&db, None).await?;
                info!("Schema migrated");
            }
            Ok(Arc::new(SeaStore::new(db)))
        },
    }
}

pub async fn new_database_connection(backend: &Backend) -> ResultE<DatabaseConnection> {
    if backend.connect.trim().is_empty() {
        return Err(erx::Erx::store(&format!("{} backend connect string is empty", backend.kind)));
    }

    Database::connect(connect_options(backend)).await.map_err(erx::emp)
}

fn connect_options(backend: &Backend) -> ConnectOptions {
    const MAX_CONNECTIONS: u32 = 100;
    const MIN_CONNECTIONS: u32 = 2;
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(8);
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(8);
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 5);
    const MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);
    // sqlx falls back to its own recycling defaults when these are unset
    const PINNED: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

    let mut opt = ConnectOptions::new(backend.connect.clone());
    opt.connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug)
        .sqlx_slow_statements_logging_settings(log::LevelFilter::Warn, Duration::from_secs(2));

    // an in-memory sqlite database lives and dies with its single connection
    if is_memory_sqlite(backend) {
        opt.max_connections(1).min_connections(1).idle_timeout(PINNED).max_lifetime(PINNED);
    } else {
        opt.max_connections(MAX_CONNECTIONS).min_connections(MIN_CONNECTIONS).idle_timeout(IDLE_TIMEOUT).max_lifetime(MAX_LIFETIME);
    }

    opt
}

fn is_memory_sqlite(backend: &Backend) -> bool {
    backend.kind == BackendKind::Sqlite && backend.connect.contains(":memory:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(kind: BackendKind, connect: &str) -> Backend {
        Backend { kind, connect: connect.into(), migrate: true }
    }

    #[test]
    fn memory_sqlite_keeps_its_only_connection() {
        let opt = connect_options(&backend(BackendKind::Sqlite, "sqlite::memory:"));
        assert_eq!(opt.get_max_connections(), Some(1));
        assert_eq!(opt.get_min_connections(), Some(1));
        assert!(opt.get_idle_timeout().unwrap() >= Duration::from_secs(60 * 60 * 24 * 365));
        assert!(opt.get_max_lifetime().unwrap() >= Duration::from_secs(60 * 60 * 24 * 365));
    }

    #[test]
    fn file_backends_recycle_connections() {
        let opt = connect_options(&backend(BackendKind::Sqlite, "sqlite://data/questioneer.db?mode=rwc"));
        assert_eq!(opt.get_max_connections(), Some(100));
        assert_eq!(opt.get_idle_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(opt.get_max_lifetime(), Some(Duration::from_secs(3600)));
    }
}
