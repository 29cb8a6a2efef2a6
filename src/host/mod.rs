pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::MemoryHost;

/// The conversation state a node is allowed to touch. Injected by whoever
/// runs the node, so nodes never reach for ambient host globals.
#[async_trait]
pub trait Host: Send + Sync {
    async fn add_to_context(&self, key: &str, value: Value) -> Result<()>;
    async fn add_to_input(&self, key: &str, value: Value) -> Result<()>;
    async fn remove_from_context(&self, key: &str) -> Result<()>;
}

/// Which of the two host stores receives a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<Value>")]
pub enum StoreLocation {
    #[default]
    Input,
    Context,
}

impl From<&str> for StoreLocation {
    /// Only `"context"` selects the context store; anything else is input.
    fn from(value: &str) -> Self {
        if value == "context" {
            StoreLocation::Context
        } else {
            StoreLocation::Input
        }
    }
}

impl From<String> for StoreLocation {
    fn from(value: String) -> Self {
        StoreLocation::from(value.as_str())
    }
}

impl From<Option<Value>> for StoreLocation {
    /// Hosts send `null` or non-strings for unset fields; those are input.
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::String(s)) => StoreLocation::from(s.as_str()),
            _ => StoreLocation::Input,
        }
    }
}

/// A store plus the key to write under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub location: StoreLocation,
    pub key: String,
}

impl Destination {
    /// Pick the key that belongs to the selected store.
    pub fn from_config(location: StoreLocation, input_key: &str, context_key: &str) -> Self {
        let key = match location {
            StoreLocation::Input => input_key,
            StoreLocation::Context => context_key,
        };
        Self {
            location,
            key: key.to_string(),
        }
    }

    /// Exactly one write into exactly one store.
    pub async fn write(&self, host: &dyn Host, value: Value) -> Result<()> {
        match self.location {
            StoreLocation::Input => host.add_to_input(&self.key, value).await,
            StoreLocation::Context => host.add_to_context(&self.key, value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_location_parses_context() {
        let loc: StoreLocation = serde_json::from_value(json!("context")).unwrap();
        assert_eq!(loc, StoreLocation::Context);
    }

    #[test]
    fn store_location_unknown_falls_back_to_input() {
        let loc: StoreLocation = serde_json::from_value(json!("profile")).unwrap();
        assert_eq!(loc, StoreLocation::Input);
    }

    #[test]
    fn store_location_null_or_non_string_is_input() {
        for raw in [json!(null), json!(true), json!(1), json!({"x": "context"})] {
            let loc: StoreLocation = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(loc, StoreLocation::Input, "for {raw}");
        }
    }

    #[test]
    fn store_location_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(StoreLocation::Context).unwrap(),
            json!("context")
        );
    }

    #[test]
    fn destination_picks_matching_key() {
        let d = Destination::from_config(StoreLocation::Context, "in", "ctx");
        assert_eq!(d.key, "ctx");
        let d = Destination::from_config(StoreLocation::Input, "in", "ctx");
        assert_eq!(d.key, "in");
    }

    #[tokio::test]
    async fn destination_writes_to_selected_store() {
        let host = MemoryHost::new();
        Destination::from_config(StoreLocation::Context, "in", "ctx")
            .write(&host, json!(1))
            .await
            .unwrap();

        assert_eq!(host.context().await.get("ctx"), Some(&json!(1)));
        assert!(host.input().await.is_empty());
    }
}
