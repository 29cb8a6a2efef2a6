//! Webchat avatar overrides. The webchat reads these context keys when it
//! renders the bot's and the user's message bubbles.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::Node;
use super::descriptor::{Field, FieldType, FormEntry, NodeDescriptor};
use crate::consts::{BOT_AVATAR_KEY, USER_AVATAR_KEY};
use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Bot,
    User,
}

impl Participant {
    fn context_key(self) -> &'static str {
        match self {
            Participant::Bot => BOT_AVATAR_KEY,
            Participant::User => USER_AVATAR_KEY,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Participant::Bot => "Bot",
            Participant::User => "User",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarAction {
    Change,
    Reset,
}

#[derive(Debug, Deserialize)]
struct ChangeConfig {
    url: String,
}

/// One of the four avatar nodes: change or reset, for the bot or the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarNode {
    pub participant: Participant,
    pub action: AvatarAction,
}

impl AvatarNode {
    pub fn new(participant: Participant, action: AvatarAction) -> Self {
        Self {
            participant,
            action,
        }
    }

    pub fn all() -> [AvatarNode; 4] {
        [
            Self::new(Participant::Bot, AvatarAction::Change),
            Self::new(Participant::Bot, AvatarAction::Reset),
            Self::new(Participant::User, AvatarAction::Change),
            Self::new(Participant::User, AvatarAction::Reset),
        ]
    }

    /// e.g. `changeBotAvatar`, `resetUserAvatar`.
    pub fn type_name(&self) -> String {
        let verb = match self.action {
            AvatarAction::Change => "change",
            AvatarAction::Reset => "reset",
        };
        format!("{verb}{}Avatar", self.participant.label())
    }
}

#[async_trait]
impl Node for AvatarNode {
    fn descriptor(&self) -> NodeDescriptor {
        let who = self.participant.label();
        match self.action {
            AvatarAction::Change => {
                NodeDescriptor::new(&self.type_name(), &format!("Change {who} Avatar"))
                    .field(
                        Field::new("url", "Avatar Image URL", FieldType::CognigyText).required(),
                    )
                    .form(FormEntry::Field("url".into()))
            }
            AvatarAction::Reset => {
                NodeDescriptor::new(&self.type_name(), &format!("Reset {who} Avatar"))
            }
        }
    }

    fn node_type(&self) -> String {
        self.type_name()
    }

    async fn execute(&self, config: &Value, host: &dyn Host) -> Result<()> {
        let key = self.participant.context_key();
        match self.action {
            AvatarAction::Change => {
                let config: ChangeConfig = serde_json::from_value(config.clone())
                    .with_context(|| format!("invalid {} config", self.type_name()))?;
                let url = config.url.trim();
                if url.is_empty() {
                    bail!("avatar url is required");
                }
                tracing::debug!(key, url, "overriding avatar");
                host.add_to_context(key, Value::String(url.to_string()))
                    .await
            }
            AvatarAction::Reset => {
                tracing::debug!(key, "resetting avatar");
                host.remove_from_context(key).await
            }
        }
    }
}
