use std::{path::Path, sync::Arc};

use color_eyre::eyre::Context;
use migrations::MIGRATIONS;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};

use crate::errors::Result;

mod migrations;
mod usage;

pub use usage::GlyphUsage;

/// `SqliteStorage` persists the usage counters of the glyph catalogs in a SQLite database
#[derive(Clone)]
pub struct SqliteStorage {
    /// The single connection, shared across the blocking pool
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Creates a new instance of [`SqliteStorage`] using a persistent database file.
    ///
    /// If CMDPAL_STORAGE environment variable is set, it will use the specified path for the database file.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let db_path = if let Some(path) = std::env::var_os("CMDPAL_STORAGE") {
            tracing::info!("Using CMDPAL_STORAGE path: {}", path.to_string_lossy());
            path.into()
        } else {
            let db_path = data_dir.as_ref().join("storage.db3");
            tracing::info!("Using default storage path: {}", db_path.display());
            db_path
        };
        let conn = tokio::task::spawn_blocking(move || {
            Connection::open_with_flags(db_path, OpenFlags::default()).wrap_err("Error initializing SQLite client")
        })
        .await??;
        Self::init(conn).await
    }

    /// Creates a new in-memory instance of [`SqliteStorage`].
    ///
    /// This is primarily intended for testing purposes, where a persistent database is not required.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?).await
    }

    /// Applies the PRAGMA settings and every pending migration to a freshly opened connection
    async fn init(conn: Connection) -> Result<Self> {
        let storage = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        storage
            .conn_mut(|conn| {
                // In-memory databases silently keep their own journal mode
                conn.pragma_update(None, "journal_mode", "wal")
                    .wrap_err("Error applying journal mode pragma")?;
                conn.pragma_update(None, "synchronous", "normal")
                    .wrap_err("Error applying synchronous pragma")?;
                MIGRATIONS.to_latest(conn).wrap_err("Error applying migrations")?;
                Ok(())
            })
            .await?;
        Ok(storage)
    }

    /// Invokes the provided function with the [`rusqlite::Connection`], on the blocking pool
    async fn conn<F, T>(&self, func: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || func(&conn.lock())).await?
    }

    /// Invokes the provided function with a mutable [`rusqlite::Connection`], on the blocking pool
    async fn conn_mut<F, T>(&self, func: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || func(&mut conn.lock())).await?
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_migrations_are_valid() {
        assert!(MIGRATIONS.validate().is_ok());
    }

    #[test]
    fn test_first_migration_creates_the_whole_schema() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        MIGRATIONS.to_version(&mut conn, 1).unwrap();
        let columns = conn
            .prepare("SELECT name FROM pragma_table_info('glyph_usage')")
            .unwrap()
            .query_map([], |r| r.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(columns, vec!["catalog", "name", "usage_count", "last_used_at"]);
    }
}
