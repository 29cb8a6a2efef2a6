use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};

use extnodes::adapter::HttpJsonAdapter;
use extnodes::config::{Config, timeout_from_secs};
use extnodes::connection::{self, ConnectionStore};
use extnodes::consts::default_db_path;
use extnodes::host::MemoryHost;
use extnodes::logging;
use extnodes::nodes::Extension;
use extnodes::nodes::ner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExtensionName {
    Azure,
    Webchat,
}

#[derive(Parser)]
#[command(name = "extnodes", version, about = "Run chatbot extension nodes locally.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database for connections and settings
    #[arg(short, long, global = true)]
    db: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print node descriptors as JSON
    Nodes {
        /// Only this extension (default: all)
        #[arg(short, long, value_enum)]
        extension: Option<ExtensionName>,
    },
    /// Save a text-analytics connection
    Connect {
        name: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        region: String,
    },
    /// Remove a saved connection
    Disconnect { name: String },
    /// Read or change stored defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run one node against an in-memory conversation and print its state
    Run {
        /// Node type, e.g. namedEntityRecognition or changeBotAvatar
        node: String,

        /// Node config as a JSON object
        #[arg(short, long, default_value = "{}")]
        config: String,

        /// Saved connection to inject when the config has none
        #[arg(long, default_value = "default")]
        connection: String,

        /// Initial input store as a JSON object
        #[arg(long, default_value = "{}")]
        input: String,

        /// Initial context store as a JSON object
        #[arg(long, default_value = "{}")]
        context: String,

        /// Outbound request timeout in seconds (overrides the stored setting)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Replace the regional text-analytics host (e.g. http://127.0.0.1:8080)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json)?;

    let db_path = match cli.db {
        Some(path) => path,
        None => {
            let path = default_db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            path.to_string_lossy().into_owned()
        }
    };

    match cli.command {
        Command::Nodes { extension } => handle_nodes(extension).await,
        Command::Connect { name, key, region } => {
            connection::connect(&db_path, &name, &key, &region)?;
            println!("✓ Saved connection '{name}'.");
            Ok(())
        }
        Command::Disconnect { name } => {
            connection::disconnect(&db_path, &name)?;
            println!("✓ Removed connection '{name}'.");
            Ok(())
        }
        Command::Config { action } => handle_config(&db_path, action),
        Command::Run {
            node,
            config,
            connection,
            input,
            context,
            timeout,
            endpoint,
        } => {
            let args = RunArgs {
                node,
                config: parse_object("--config", &config)?,
                connection,
                input: parse_object("--input", &input)?,
                context: parse_object("--context", &context)?,
                timeout: timeout.map(timeout_from_secs).transpose()?,
                endpoint,
            };
            handle_run(&db_path, args).await
        }
    }
}

struct RunArgs {
    node: String,
    config: Map<String, Value>,
    connection: String,
    input: Map<String, Value>,
    context: Map<String, Value>,
    timeout: Option<Duration>,
    endpoint: Option<String>,
}

fn parse_object(flag: &str, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).with_context(|| format!("{flag} is not valid JSON"))? {
        Value::Object(map) => Ok(map),
        _ => bail!("{flag} must be a JSON object"),
    }
}

async fn handle_nodes(extension: Option<ExtensionName>) -> Result<()> {
    let adapter = HttpJsonAdapter::default();
    let mut out = Map::new();
    for name in [ExtensionName::Azure, ExtensionName::Webchat] {
        if extension.is_some_and(|only| only != name) {
            continue;
        }
        let ext = match name {
            ExtensionName::Azure => Extension::azure(adapter.clone()).await,
            ExtensionName::Webchat => Extension::webchat().await,
        };
        out.insert(
            ext.name().to_string(),
            serde_json::to_value(ext.descriptors().await)?,
        );
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn handle_config(db_path: &str, action: ConfigAction) -> Result<()> {
    let config = Config::open(db_path)?;
    match action {
        ConfigAction::Get { key } => match config.get(&key)? {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("✓ {key} = {value}");
        }
        ConfigAction::Unset { key } => {
            config.remove(&key)?;
            println!("✓ {key} unset");
        }
    }
    Ok(())
}

async fn handle_run(db_path: &str, args: RunArgs) -> Result<()> {
    let settings = Config::open(db_path)?;
    let timeout = match args.timeout {
        Some(t) => t,
        None => settings.timeout()?,
    };
    let adapter = HttpJsonAdapter::new(timeout);

    let azure = Extension::new("azure");
    let mut ner_node = ner::NamedEntityRecognition::new(adapter);
    if let Some(endpoint) = args.endpoint {
        ner_node = ner_node.with_endpoint(endpoint);
    }
    azure.register(Arc::new(ner_node)).await;
    let webchat = Extension::webchat().await;

    let mut config = Value::Object(args.config);
    let ext = if azure.get(&args.node).await.is_some() {
        settings.apply_node_defaults(&mut config)?;
        let store = ConnectionStore::open(db_path)?;
        if let Some(conn) = store.resolve_text_analytics(&args.connection)? {
            connection::inject(&mut config, &conn)?;
        }
        azure
    } else if webchat.get(&args.node).await.is_some() {
        webchat
    } else {
        bail!("unknown node type: {}", args.node);
    };

    let host = MemoryHost::seeded(args.input, args.context);
    ext.execute(&args.node, &config, &host).await?;

    println!("{}", serde_json::to_string_pretty(&host.snapshot().await)?);
    Ok(())
}
