use async_trait::async_trait;
use tokio::sync::mpsc;

/// A message the chat service has delivered, addressed by channel and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

/// Handle needed to answer a command or button interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRef {
    pub id: String,
    pub token: String,
}

/// Free-text message posted in a channel the bot can read.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: String,
    pub author_name: String,
    pub channel_id: String,
    pub text: String,
}

/// Which control of a confirmation prompt was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Accept,
    Reject,
}

impl ButtonAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

/// Prefix of the custom id carried by prompt controls.
const CONTROL_PREFIX: &str = "rollcall";

/// Custom id for a prompt control: `rollcall:<action>:<prompt_id>`.
#[must_use]
pub fn control_id(action: ButtonAction, prompt_id: &str) -> String {
    format!("{CONTROL_PREFIX}:{}:{prompt_id}", action.as_str())
}

/// Inverse of [`control_id`].
#[must_use]
pub fn parse_control_id(custom_id: &str) -> Option<(ButtonAction, String)> {
    let mut parts = custom_id.splitn(3, ':');
    if parts.next()? != CONTROL_PREFIX {
        return None;
    }
    let action = match parts.next()? {
        "accept" => ButtonAction::Accept,
        "reject" => ButtonAction::Reject,
        _ => return None,
    };
    let prompt_id = parts.next().filter(|id| !id.is_empty())?;
    Some((action, prompt_id.to_owned()))
}

/// A press on one of the accept/reject controls of a prompt.
#[derive(Debug, Clone)]
pub struct ButtonInteraction {
    pub invoking_user_id: String,
    pub prompt_id: String,
    pub action: ButtonAction,
    /// The prompt message carrying the controls.
    pub message: MessageRef,
    pub interaction: InteractionRef,
}

/// A slash command invocation.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub user_id: String,
    pub user_name: String,
    pub name: String,
    pub argument: Option<String>,
    pub interaction: InteractionRef,
}

/// Events forwarded from a gateway adapter to the runtime.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Message(InboundMessage),
    Button(ButtonInteraction),
    Command(CommandInvocation),
}

/// Private message to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub text: String,
    /// When set, the message carries accept/reject controls for this prompt.
    pub prompt_id: Option<String>,
}

impl OutboundReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt_id: None,
        }
    }

    pub fn prompt(text: impl Into<String>, prompt_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt_id: Some(prompt_id.into()),
        }
    }
}

/// Outbound side of a chat service.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send a direct message, returning a reference to the posted message.
    async fn send_private(&self, user_id: &str, reply: OutboundReply)
    -> anyhow::Result<MessageRef>;

    async fn delete_message(&self, message: &MessageRef) -> anyhow::Result<()>;

    /// Answer a command interaction, visible only to the invoker if `ephemeral`.
    async fn respond_interaction(
        &self,
        interaction: &InteractionRef,
        text: &str,
        ephemeral: bool,
    ) -> anyhow::Result<()>;
}

/// Gateway adapter contract. New chat services only need to implement this trait.
#[async_trait]
pub trait ChatGateway: ReplySink {
    /// Stable adapter identifier (e.g. `discord`).
    fn id(&self) -> &'static str;

    /// Connect and forward events until the connection ends.
    async fn run(&self, events_tx: mpsc::Sender<GatewayEvent>) -> anyhow::Result<()>;

    /// Best-effort health probe.
    async fn health_check(&self) -> anyhow::Result<bool>;
}
