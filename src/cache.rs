use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::error::TransportError;

/// A response as stored in the cache. Only 200 responses are ever written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// Where the response actually came from, after redirects.
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// SQLite-backed HTTP response cache keyed by request URL.
pub struct ResponseCache {
    conn: Connection,
    expire_after: Option<Duration>,
}

impl ResponseCache {
    pub fn open(path: &Path, expire_after: Option<Duration>) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open response cache {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn, expire_after)
    }

    #[cfg(test)]
    pub fn in_memory(expire_after: Option<Duration>) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, expire_after)
    }

    fn with_connection(conn: Connection, expire_after: Option<Duration>) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS responses (
                url        TEXT PRIMARY KEY,
                final_url  TEXT NOT NULL,
                status     INTEGER NOT NULL,
                headers    TEXT NOT NULL,
                body       BLOB NOT NULL,
                fetched_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self { conn, expire_after })
    }

    /// Look up a URL. Expired entries are dropped and reported as a miss.
    pub fn get(&self, url: &str) -> Result<Option<CachedResponse>, TransportError> {
        let row = self
            .conn
            .query_row(
                "SELECT final_url, status, headers, body, fetched_at FROM responses WHERE url = ?1",
                [url],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((final_url, status, headers, body, fetched_at)) = row else {
            return Ok(None);
        };

        if self.is_expired(fetched_at) {
            self.conn
                .execute("DELETE FROM responses WHERE url = ?1", [url])?;
            return Ok(None);
        }

        Ok(Some(CachedResponse {
            url: final_url,
            status,
            headers: serde_json::from_str(&headers)?,
            body,
        }))
    }

    pub fn put(&self, url: &str, response: &CachedResponse) -> Result<(), TransportError> {
        let headers = serde_json::to_string(&response.headers)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO responses (url, final_url, status, headers, body, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                url,
                response.url,
                response.status,
                headers,
                response.body,
                Utc::now().timestamp()
            ],
        )?;
        Ok(())
    }

    /// Remove every entry; returns how many were dropped.
    pub fn clear(&self) -> rusqlite::Result<usize> {
        self.conn.execute("DELETE FROM responses", [])
    }

    pub fn len(&self) -> rusqlite::Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM responses", [], |r| r.get(0))
    }

    fn is_expired(&self, fetched_at: i64) -> bool {
        match self.expire_after {
            Some(ttl) => {
                let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
                Utc::now().timestamp().saturating_sub(fetched_at) >= ttl
            }
            None => false,
        }
    }
}

// ── Tests ──
