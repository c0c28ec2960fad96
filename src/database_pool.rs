use crate::database_migrate_refinery;
use crate::error::Error;
use crate::error::ErrorContext;
use crate::error::Result;
use log::info;
use once_cell::sync::OnceCell;
use r2d2::Pool;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use warp::http::status::StatusCode;

/// Lazily initialized handle to the backing item store.
///
/// The first call to `connect` (or `conn`) opens the SQLite database, runs
/// migrations and memoizes the resulting connection pool; every later call
/// reuses the cached pool. Initialization is single-flight: concurrent
/// first users block on the same `OnceCell` instead of racing to connect.
///
/// A failed first connection is reported to the caller and nothing is
/// cached, so a later request retries the connection instead of being stuck
/// with a dead handle.
pub struct DatabasePool {
    database_file: String,
    pool: OnceCell<Pool<SqliteConnectionManager>>,
}

impl DatabasePool {
    pub fn new(database_file: impl Into<String>) -> DatabasePool {
        DatabasePool {
            database_file: database_file.into(),
            pool: OnceCell::new(),
        }
    }

    /// Obtain the shared connection pool, connecting and migrating on first use.
    pub fn connect(&self) -> Result<&Pool<SqliteConnectionManager>> {
        self.pool.get_or_try_init(|| {
            let parent = std::path::Path::new(&self.database_file)
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty());
            if let Some(parent) = parent {
                std::fs::create_dir_all(parent).map_err(|err| Error {
                    code: StatusCode::INTERNAL_SERVER_ERROR,
                    msg: format!("Failed to create database directory, {}", err),
                })?;
            }
            let manager = SqliteConnectionManager::file(&self.database_file);
            let pool = Pool::new(manager)
                .context(|| format!("Failed to connect to database {}", self.database_file))?;
            let mut conn = pool
                .get()
                .context_str("Failed to check out the initial database connection")?;
            database_migrate_refinery::migrate(&mut conn)?;
            info!("Connected to database {}", self.database_file);
            Ok(pool)
        })
    }

    /// Check a single connection out of the (lazily created) pool.
    pub fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        let conn = self.connect()?.get()?;
        Ok(conn)
    }
}
