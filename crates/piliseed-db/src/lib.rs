// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use piliseed_app::UserCache;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const APP_NAME: &str = "piliseed";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS client_cache (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("client_cache", &["key", "value", "updated_at"])];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub updated_at: OffsetDateTime,
}

/// Local client storage. Holds whatever the app keeps between launches,
/// keyed by string.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        validate_db_path(&path.to_string_lossy())?;
        let conn = Connection::open(path)
            .with_context(|| format!("open cache database {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory cache")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if ensure_cache_schema(&self.conn)? {
            tracing::debug!("created client cache schema");
        }
        Ok(())
    }

    pub fn get_cache(&self, key: &str) -> Result<Option<CacheEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT key, value, updated_at FROM client_cache WHERE key = ?",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .with_context(|| format!("load cache entry {key}"))?;

        row.map(|(key, value, updated_at)| {
            let updated_at = OffsetDateTime::parse(&updated_at, &Rfc3339)
                .with_context(|| format!("parse updated_at for cache entry {key}"))?;
            Ok(CacheEntry {
                key,
                value,
                updated_at,
            })
        })
        .transpose()
    }

    pub fn put_cache(&self, key: &str, value: &str) -> Result<()> {
        if key.trim().is_empty() {
            bail!("cache key must not be empty");
        }
        let now = timestamp_now()?;
        self.conn
            .execute(
                "
                INSERT INTO client_cache (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("store cache entry {key}"))?;
        Ok(())
    }

    /// Removing a missing key is not an error.
    pub fn remove_cache(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM client_cache WHERE key = ?", params![key])
            .with_context(|| format!("remove cache entry {key}"))?;
        Ok(removed > 0)
    }

    pub fn cache_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM client_cache ORDER BY key")
            .context("prepare cache keys query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("query cache keys")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect cache keys")
    }
}

impl UserCache for Store {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_cache(key)?.map(|entry| entry.value))
    }

    fn store_raw(&mut self, key: &str, value: &str) -> Result<()> {
        self.put_cache(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.remove_cache(key).map(|_| ())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("PILISEED_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let app_dir = dirs::data_local_dir()
        .map(|root| root.join(APP_NAME))
        .ok_or_else(|| anyhow!("no platform data directory; set PILISEED_DB_PATH"))?;
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create {}", app_dir.display()))?;
    Ok(app_dir.join("cache.db"))
}

/// Rejects URI-style paths; the store only opens plain files or `:memory:`.
pub fn validate_db_path(path: &str) -> Result<()> {
    match path {
        "" => bail!("database path must not be empty; set [storage].db_path or PILISEED_DB_PATH"),
        ":memory:" => return Ok(()),
        _ => {}
    }

    let uri_scheme = path
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty() && scheme.chars().all(char::is_alphabetic));
    if let Some(scheme) = uri_scheme {
        bail!("database path {path:?} is a {scheme} URI; use a local file path");
    }
    if path.starts_with("file:") || path.contains('?') {
        bail!("database path {path:?} uses SQLite URI syntax; drop the file: prefix and any ?options");
    }
    Ok(())
}

/// An empty file gets the schema; anything else must already be a cache
/// database with every column the store reads.
fn ensure_cache_schema(conn: &Connection) -> Result<bool> {
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .context("inspect existing tables")?;
    if tables == 0 {
        conn.execute_batch(SCHEMA).context("create client_cache table")?;
        return Ok(true);
    }

    for (table, expected) in REQUIRED_SCHEMA {
        let present = column_names(conn, table)?;
        if present.is_empty() {
            bail!(
                "database has no `{table}` table; point [storage].db_path at a piliseed cache file"
            );
        }
        let absent = expected
            .iter()
            .filter(|column| !present.contains(**column))
            .copied()
            .collect::<Vec<_>>();
        if !absent.is_empty() {
            bail!(
                "`{table}` lacks column(s) {}; remove the cache database and start again",
                absent.join(", ")
            );
        }
    }
    Ok(false)
}

fn column_names(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .context("prepare table_info query")?;
    let names = stmt
        .query_map(params![table], |row| row.get::<_, String>(0))
        .with_context(|| format!("read columns of {table}"))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("read columns of {table}"))?;
    Ok(names)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.busy_timeout(Duration::from_secs(5))
        .context("set sqlite busy timeout")?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("enable WAL journal")?;
    Ok(())
}

fn timestamp_now() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format cache timestamp")
}
