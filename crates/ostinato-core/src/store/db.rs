use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;

use super::migrations::MIGRATIONS;

/// The identity store: a SQLite table mapping Discord user ids to
/// scrobbling-service usernames.
///
/// Opened per command and dropped when the command finishes; there is
/// no pooling and no shared connection state across requests.
#[derive(Debug)]
pub struct LinkStore {
    conn: Connection,
}

impl LinkStore {
    /// Open (or create) a store at the given path and apply migrations.
    /// The parent directory is created if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    /// Look up the linked Last.fm username for a Discord user.
    pub fn get(&self, discord_id: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT lastfm_username FROM links WHERE discord_id = ?1")?;
        let mut rows = stmt.query_map([discord_id], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Link (or relink) a Discord user to a Last.fm username.
    ///
    /// Uses REPLACE INTO so that a user who changes their Last.fm
    /// account can simply set the new name.
    pub fn put(&self, discord_id: &str, lastfm_username: &str) -> Result<()> {
        self.conn.execute(
            "REPLACE INTO links (discord_id, lastfm_username) VALUES (?1, ?2)",
            rusqlite::params![discord_id, lastfm_username],
        )?;
        Ok(())
    }
}
