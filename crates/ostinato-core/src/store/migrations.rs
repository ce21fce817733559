/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Discord user -> Last.fm username associations.
-- discord_id is the snowflake as text; one link per Discord user,
-- relinking replaces the row.
CREATE TABLE IF NOT EXISTS links (
    discord_id TEXT PRIMARY KEY,
    lastfm_username TEXT NOT NULL,
    linked_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_links_table",
    sql: MIGRATION_001,
}];
