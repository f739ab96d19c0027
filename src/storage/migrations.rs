use rusqlite_migration::{M, Migrations};

/// Database migrations for the SQLite storage
pub const MIGRATIONS: Migrations<'_> = Migrations::from_slice(MIGRATION_SLICE);
const MIGRATION_SLICE: &[M<'_>] = &[
    // Migration 1: Create the glyph usage table
    M::up(
        r#"CREATE TABLE glyph_usage (
            catalog TEXT NOT NULL,
            name TEXT NOT NULL,
            usage_count INTEGER NOT NULL DEFAULT 0,
            last_used_at TEXT NULL,
            PRIMARY KEY (catalog, name)
        );"#,
    ),
];
