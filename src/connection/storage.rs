use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::consts::{KEY_ENV_VAR, REGION_ENV_VAR};
use crate::nodes::ner::TextAnalyticsConnection;

/// Connection kinds stored per name.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Credential {
    #[serde(rename = "textanalytics")]
    TextAnalytics(TextAnalyticsConnection),
}

/// Stores named connections in SQLite.
///
/// Shares a database with [`Config`](crate::config::Config); pass the same path.
pub struct ConnectionStore {
    conn: Mutex<Connection>,
}

impl ConnectionStore {
    /// Open or create the connections table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open connection database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS connections (
                name TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
        )
        .context("failed to create connections table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, name: &str) -> Result<Option<Credential>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT data FROM connections WHERE name = ?1")?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let cred: Credential = serde_json::from_str(&json)
                    .with_context(|| format!("corrupt connection '{name}'"))?;
                Ok(Some(cred))
            }
            None => Ok(None),
        }
    }

    /// Store a connection (upsert).
    pub fn set(&self, name: &str, credential: Credential) -> Result<()> {
        let json = serde_json::to_string(&credential)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO connections (name, data) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET data = excluded.data",
            [name, json.as_str()],
        )?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM connections WHERE name = ?1", [name])?;
        Ok(())
    }

    /// All stored connection names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM connections ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Resolve a text-analytics connection.
    /// Priority: stored connection → environment variables.
    pub fn resolve_text_analytics(&self, name: &str) -> Result<Option<TextAnalyticsConnection>> {
        if let Some(Credential::TextAnalytics(conn)) = self.get(name)? {
            return Ok(Some(conn));
        }

        if let (Ok(key), Ok(region)) = (std::env::var(KEY_ENV_VAR), std::env::var(REGION_ENV_VAR))
            && !key.is_empty()
            && !region.is_empty()
        {
            return Ok(Some(TextAnalyticsConnection { key, region }));
        }

        Ok(None)
    }
}
