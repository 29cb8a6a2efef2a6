pub mod storage;

pub use storage::{ConnectionStore, Credential};

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::nodes::ner::TextAnalyticsConnection;

/// Save a text-analytics connection under `name`.
///
/// Shared by the `connect` subcommand and tests.
pub fn connect(db_path: &str, name: &str, key: &str, region: &str) -> Result<()> {
    if key.is_empty() || region.trim().is_empty() {
        bail!("both key and region are required");
    }
    let store = ConnectionStore::open(db_path).context("failed to open connection storage")?;
    store
        .set(
            name,
            Credential::TextAnalytics(TextAnalyticsConnection {
                key: key.to_string(),
                region: region.trim().to_string(),
            }),
        )
        .context("failed to save connection")?;
    Ok(())
}

/// Remove a stored connection.
pub fn disconnect(db_path: &str, name: &str) -> Result<()> {
    let store = ConnectionStore::open(db_path).context("failed to open connection storage")?;
    store.remove(name).context("failed to remove connection")?;
    Ok(())
}

/// Put `connection` into a node config unless the config already carries one,
/// the way the host injects connection fields before invoking a node.
pub fn inject(config: &mut Value, connection: &TextAnalyticsConnection) -> Result<()> {
    let Some(obj) = config.as_object_mut() else {
        bail!("node config must be a JSON object");
    };
    if !obj.contains_key("connection") {
        obj.insert("connection".into(), serde_json::to_value(connection)?);
    }
    Ok(())
}
