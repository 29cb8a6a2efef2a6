//! Key-value settings backed by SQLite.
//!
//! Shares a database with [`ConnectionStore`](crate::connection::ConnectionStore)
//! (pass the same path to both).

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use crate::consts::DEFAULT_TIMEOUT;

/// Node config fields that may be filled from stored settings.
/// (setting key, node config key)
const NODE_DEFAULTS: &[(&str, &str)] = &[
    ("language", "language"),
    ("store_location", "storeLocation"),
    ("input_key", "inputKey"),
    ("context_key", "contextKey"),
];

pub const TIMEOUT_KEY: &str = "timeout_secs";

/// A zero deadline would fail every call before it is sent.
pub fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        bail!("{TIMEOUT_KEY} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Outbound request deadline, falling back to the built-in default.
    pub fn timeout(&self) -> Result<Duration> {
        match self.get(TIMEOUT_KEY)? {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{TIMEOUT_KEY} is not a number: {raw}"))?;
                timeout_from_secs(secs)
            }
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    /// Fill missing node config fields from stored settings.
    /// Fields already present in `config` are left alone.
    pub fn apply_node_defaults(&self, config: &mut Value) -> Result<()> {
        let Some(obj) = config.as_object_mut() else {
            return Ok(());
        };
        for (setting, field) in NODE_DEFAULTS {
            if obj.contains_key(*field) {
                continue;
            }
            if let Some(value) = self.get(setting)? {
                obj.insert(field.to_string(), Value::String(value));
            }
        }
        Ok(())
    }
}
