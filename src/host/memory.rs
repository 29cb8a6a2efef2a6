use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::Host;

/// An in-process host. Backs the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryHost {
    context: RwLock<Map<String, Value>>,
    input: RwLock<Map<String, Value>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing conversation state.
    pub fn seeded(input: Map<String, Value>, context: Map<String, Value>) -> Self {
        Self {
            context: RwLock::new(context),
            input: RwLock::new(input),
        }
    }

    pub async fn context(&self) -> Map<String, Value> {
        self.context.read().await.clone()
    }

    pub async fn input(&self) -> Map<String, Value> {
        self.input.read().await.clone()
    }

    /// Both stores as one JSON document: `{"input": .., "context": ..}`.
    pub async fn snapshot(&self) -> Value {
        serde_json::json!({
            "input": Value::Object(self.input().await),
            "context": Value::Object(self.context().await),
        })
    }
}

#[async_trait]
impl Host for MemoryHost {
    async fn add_to_context(&self, key: &str, value: Value) -> Result<()> {
        self.context.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn add_to_input(&self, key: &str, value: Value) -> Result<()> {
        self.input.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_from_context(&self, key: &str) -> Result<()> {
        self.context.write().await.remove(key);
        Ok(())
    }
}
