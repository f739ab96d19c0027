use chrono::{DateTime, Utc};
use tracing::instrument;

use super::SqliteStorage;
use crate::{errors::Result, model::Catalog};

/// A persisted usage counter of a catalog entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphUsage {
    pub name: String,
    pub usage_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl SqliteStorage {
    /// Increments the usage counter of the given catalog entry, returning the new count
    #[instrument(skip(self))]
    pub async fn increment_usage(&self, catalog: Catalog, name: &str) -> Result<u64> {
        let name = name.to_owned();
        self.conn_mut(move |conn| {
            let query = r#"
                INSERT INTO glyph_usage (catalog, name, usage_count, last_used_at)
                VALUES (?1, ?2, 1, ?3)
                ON CONFLICT (catalog, name) DO UPDATE SET
                    usage_count = usage_count + 1,
                    last_used_at = excluded.last_used_at
                RETURNING usage_count"#;
            tracing::trace!("Incrementing glyph usage:\n{query}");
            Ok(conn.query_row(query, (catalog.to_string(), name, Utc::now()), |r| r.get(0))?)
        })
        .await
    }

    /// Loads every usage counter of the given catalog, in first-use order
    #[instrument(skip(self))]
    pub async fn load_usage(&self, catalog: Catalog) -> Result<Vec<GlyphUsage>> {
        self.conn(move |conn| {
            let query = r#"
                SELECT name, usage_count, last_used_at
                FROM glyph_usage
                WHERE catalog = ?1 AND usage_count > 0
                ORDER BY rowid"#;
            tracing::trace!("Loading glyph usage:\n{query}");
            let mut stmt = conn.prepare(query)?;
            let usage = stmt
                .query_map([catalog.to_string()], |r| {
                    Ok(GlyphUsage {
                        name: r.get(0)?,
                        usage_count: r.get(1)?,
                        last_used_at: r.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(usage)
        })
        .await
    }

    /// Removes the usage counters of the given catalog, or of every catalog when none is given.
    ///
    /// Returns the number of removed counters.
    #[instrument(skip(self))]
    pub async fn reset_usage(&self, catalog: Option<Catalog>) -> Result<usize> {
        self.conn_mut(move |conn| {
            let removed = match catalog {
                Some(catalog) => conn.execute("DELETE FROM glyph_usage WHERE catalog = ?1", [catalog.to_string()])?,
                None => conn.execute("DELETE FROM glyph_usage", [])?,
            };
            tracing::debug!("Removed {removed} usage counters");
            Ok(removed)
        })
        .await
    }
}
