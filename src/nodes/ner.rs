//! Named entity recognition over the text-analytics entities endpoint.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use super::Node;
use super::descriptor::{Field, FieldType, FormEntry, NodeDescriptor, Section};
use crate::adapter::{HttpJsonAdapter, JsonRequest};
use crate::consts::{DEFAULT_RESULT_KEY, ENTITIES_PATH, text_analytics_host};
use crate::host::{Destination, Host, StoreLocation};

pub const NODE_TYPE: &str = "namedEntityRecognition";
pub const CONNECTION_TYPE: &str = "textanalytics";

/// Languages the entities endpoint is offered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    De,
}

impl Language {
    pub const ALL: [(Language, &'static str); 3] = [
        (Language::En, "English"),
        (Language::Es, "Spanish"),
        (Language::De, "German"),
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::De => "de",
        }
    }
}

/// Credentials the host injects for a `textanalytics` connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnalyticsConnection {
    pub key: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NerConfig {
    pub connection: TextAnalyticsConnection,
    pub text: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub store_location: StoreLocation,
    #[serde(default = "default_result_key", deserialize_with = "result_key")]
    pub input_key: String,
    #[serde(default = "default_result_key", deserialize_with = "result_key")]
    pub context_key: String,
}

fn default_result_key() -> String {
    DEFAULT_RESULT_KEY.to_string()
}

/// `null` falls back to the default key; other scalars are used as text.
fn result_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => default_result_key(),
        Some(Value::String(key)) => key,
        Some(other) => other.to_string(),
    })
}

impl NerConfig {
    pub fn from_value(config: &Value) -> Result<Self> {
        let parsed: NerConfig = serde_json::from_value(config.clone())
            .context("invalid namedEntityRecognition config")?;
        if parsed.connection.key.is_empty() {
            bail!("connection key is required");
        }
        if parsed.connection.region.trim().is_empty() {
            bail!("connection region is required");
        }
        Ok(parsed)
    }

    pub fn destination(&self) -> Destination {
        Destination::from_config(self.store_location, &self.input_key, &self.context_key)
    }
}

/// The entities request body: a single document with a fixed id.
pub fn documents_payload(language: Language, text: &str) -> Value {
    json!({
        "documents": [
            { "id": "1", "language": language.code(), "text": text }
        ]
    })
}

pub struct NamedEntityRecognition {
    adapter: HttpJsonAdapter,
    /// Replaces the regional host, e.g. to point at a local stub.
    endpoint: Option<String>,
}

impl NamedEntityRecognition {
    pub fn new(adapter: HttpJsonAdapter) -> Self {
        Self {
            adapter,
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn build_request(&self, config: &NerConfig) -> JsonRequest {
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| text_analytics_host(&config.connection.region));
        JsonRequest::new(
            endpoint,
            ENTITIES_PATH,
            config.connection.key.clone(),
            documents_payload(config.language, &config.text),
        )
    }
}

#[async_trait]
impl Node for NamedEntityRecognition {
    fn descriptor(&self) -> NodeDescriptor {
        let mut language = Field::new("language", "Language", FieldType::Select)
            .required()
            .default_value(Language::default().code());
        for (lang, label) in Language::ALL {
            language = language.option(label, lang.code());
        }

        NodeDescriptor::new(NODE_TYPE, "Recognize Named Entities")
            .field(
                Field::new(
                    "connection",
                    "Text Analytics API Key and Region",
                    FieldType::Connection,
                )
                .connection_type(CONNECTION_TYPE)
                .required(),
            )
            .field(
                Field::new("text", "Text", FieldType::CognigyText)
                    .default_value("{{input.text}}")
                    .required(),
            )
            .field(language)
            .field(
                Field::new("storeLocation", "Where to store the result", FieldType::Select)
                    .option("Input", "input")
                    .option("Context", "context")
                    .required()
                    .default_value("input"),
            )
            .field(
                Field::new("inputKey", "Input Key to store Result", FieldType::CognigyText)
                    .default_value(DEFAULT_RESULT_KEY)
                    .shown_when("storeLocation", "input"),
            )
            .field(
                Field::new("contextKey", "Context Key to store Result", FieldType::CognigyText)
                    .default_value(DEFAULT_RESULT_KEY)
                    .shown_when("storeLocation", "context"),
            )
            .section(Section {
                key: "storageOption".into(),
                label: "Storage Option".into(),
                default_collapsed: true,
                fields: vec![
                    "storeLocation".into(),
                    "inputKey".into(),
                    "contextKey".into(),
                ],
            })
            .form(FormEntry::Field("connection".into()))
            .form(FormEntry::Field("text".into()))
            .form(FormEntry::Field("language".into()))
            .form(FormEntry::Section("storageOption".into()))
            .color("#007fff")
    }

    #[tracing::instrument(name = "ner.execute", skip_all)]
    async fn execute(&self, config: &Value, host: &dyn Host) -> Result<()> {
        let config = NerConfig::from_value(config)?;
        let destination = config.destination();
        let request = self.build_request(&config);

        let outcome = self.adapter.execute(&request).await;
        tracing::debug!(
            success = outcome.is_success(),
            location = ?destination.location,
            key = %destination.key,
            "storing entity recognition result"
        );
        outcome.deliver(host, &destination).await
    }
}
