pub mod avatar;
pub mod descriptor;
pub mod ner;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapter::HttpJsonAdapter;
use crate::host::Host;

pub use descriptor::NodeDescriptor;

/// Something the host can place in a flow and invoke.
///
/// `execute` returns an error only for bad config or a failing host write.
/// Failures of the work itself are written into the host as data.
#[async_trait]
pub trait Node: Send + Sync {
    fn descriptor(&self) -> NodeDescriptor;
    async fn execute(&self, config: &Value, host: &dyn Host) -> Result<()>;

    fn node_type(&self) -> String {
        self.descriptor().node_type
    }
}

/// A named bundle of nodes. RwLock allows runtime registration + parallel reads.
pub struct Extension {
    name: String,
    nodes: RwLock<BTreeMap<String, Arc<dyn Node>>>,
}

impl Extension {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Text-analytics nodes.
    pub async fn azure(adapter: HttpJsonAdapter) -> Self {
        let ext = Self::new("azure");
        ext.register(Arc::new(ner::NamedEntityRecognition::new(adapter)))
            .await;
        ext
    }

    /// Webchat avatar nodes.
    pub async fn webchat() -> Self {
        let ext = Self::new("webchat");
        for node in avatar::AvatarNode::all() {
            ext.register(Arc::new(node)).await;
        }
        ext
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn register(&self, node: Arc<dyn Node>) {
        let node_type = node.node_type();
        self.nodes.write().await.insert(node_type, node);
    }

    pub async fn unregister(&self, node_type: &str) {
        self.nodes.write().await.remove(node_type);
    }

    pub async fn get(&self, node_type: &str) -> Option<Arc<dyn Node>> {
        self.nodes.read().await.get(node_type).cloned()
    }

    pub async fn descriptors(&self) -> Vec<NodeDescriptor> {
        self.nodes
            .read()
            .await
            .values()
            .map(|n| n.descriptor())
            .collect()
    }

    pub async fn execute(&self, node_type: &str, config: &Value, host: &dyn Host) -> Result<()> {
        let Some(node) = self.get(node_type).await else {
            bail!("unknown node type: {node_type}");
        };
        tracing::info!(extension = %self.name, node = node_type, "executing node");
        node.execute(config, host).await
    }
}
