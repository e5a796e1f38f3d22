use crate::channels::traits::{
    ButtonAction, ButtonInteraction, ChatGateway, CommandInvocation, GatewayEvent, InboundMessage,
    InteractionRef, MessageRef, OutboundReply, ReplySink, control_id, parse_control_id,
};
use crate::config::DiscordConfig;
use async_trait::async_trait;
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
const GATEWAY_INTENTS: u64 = 37_377;

/// Interaction callback: reply with a message.
const CALLBACK_CHANNEL_MESSAGE: u64 = 4;
/// Interaction callback: acknowledge a component press without a reply.
const CALLBACK_DEFERRED_UPDATE: u64 = 6;
/// Message flag hiding a reply from everyone but the invoker.
const FLAG_EPHEMERAL: u64 = 64;

/// Discord adapter using the gateway websocket for events and REST for replies.
pub struct DiscordAdapter {
    bot_token: String,
    application_id: Option<String>,
    guild_id: Option<String>,
    api_base: String,
    client: reqwest::Client,
    dm_channels: Mutex<HashMap<String, String>>,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            bot_token: config.resolved_bot_token(),
            application_id: config.application_id.clone(),
            guild_id: config.guild_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
            dm_channels: Mutex::new(HashMap::new()),
        }
    }

    fn bot_user_id_from_token(token: &str) -> Option<String> {
        let first = token.split('.').next()?;
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(first)
            .ok()?;
        String::from_utf8(decoded).ok()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Register the slash commands, guild-scoped when a guild is configured.
    pub async fn register_commands(&self) -> anyhow::Result<()> {
        let Some(application_id) = &self.application_id else {
            anyhow::bail!("discord application id is not configured");
        };
        let path = match &self.guild_id {
            Some(guild_id) => format!("applications/{application_id}/guilds/{guild_id}/commands"),
            None => format!("applications/{application_id}/commands"),
        };
        let response = self
            .client
            .put(self.url(&path))
            .header("Authorization", self.auth())
            .json(&command_definitions())
            .send()
            .await?;
        check_status(response, "register commands").await?;
        tracing::info!("registered discord slash commands");
        Ok(())
    }

    async fn dm_channel(&self, user_id: &str) -> anyhow::Result<String> {
        let cached = self
            .dm_channels
            .lock()
            .ok()
            .and_then(|cache| cache.get(user_id).cloned());
        if let Some(channel_id) = cached {
            return Ok(channel_id);
        }

        let response = self
            .client
            .post(self.url("users/@me/channels"))
            .header("Authorization", self.auth())
            .json(&json!({ "recipient_id": user_id }))
            .send()
            .await?;
        let body = check_status(response, "open dm channel").await?;
        let channel_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("dm channel response has no id"))?
            .to_owned();

        if let Ok(mut cache) = self.dm_channels.lock() {
            cache.insert(user_id.to_owned(), channel_id.clone());
        }
        Ok(channel_id)
    }

    async fn interaction_callback(
        &self,
        interaction: &InteractionRef,
        body: Value,
    ) -> anyhow::Result<()> {
        let path = format!("interactions/{}/{}/callback", interaction.id, interaction.token);
        let response = self.client.post(self.url(&path)).json(&body).send().await?;
        check_status(response, "interaction callback").await?;
        Ok(())
    }
}

#[async_trait]
impl ReplySink for DiscordAdapter {
    async fn send_private(
        &self,
        user_id: &str,
        reply: OutboundReply,
    ) -> anyhow::Result<MessageRef> {
        let channel_id = self.dm_channel(user_id).await?;
        let mut body = json!({ "content": reply.text });
        if let Some(prompt_id) = &reply.prompt_id {
            body["components"] = prompt_components(prompt_id);
        }

        let response = self
            .client
            .post(self.url(&format!("channels/{channel_id}/messages")))
            .header("Authorization", self.auth())
            .json(&body)
            .send()
            .await?;
        let posted = check_status(response, "send message").await?;
        let message_id = posted
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("message response has no id"))?;
        Ok(MessageRef {
            channel_id,
            message_id: message_id.to_owned(),
        })
    }

    async fn delete_message(&self, message: &MessageRef) -> anyhow::Result<()> {
        let path = format!(
            "channels/{}/messages/{}",
            message.channel_id, message.message_id
        );
        let response = self
            .client
            .delete(self.url(&path))
            .header("Authorization", self.auth())
            .send()
            .await?;
        check_status(response, "delete message").await?;
        Ok(())
    }

    async fn respond_interaction(
        &self,
        interaction: &InteractionRef,
        text: &str,
        ephemeral: bool,
    ) -> anyhow::Result<()> {
        let mut data = json!({ "content": text });
        if ephemeral {
            data["flags"] = json!(FLAG_EPHEMERAL);
        }
        self.interaction_callback(
            interaction,
            json!({ "type": CALLBACK_CHANNEL_MESSAGE, "data": data }),
        )
        .await
    }
}

#[async_trait]
impl ChatGateway for DiscordAdapter {
    fn id(&self) -> &'static str {
        "discord"
    }

    async fn run(&self, events_tx: mpsc::Sender<GatewayEvent>) -> anyhow::Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("discord bot token is empty");
        }

        let bot_user_id = Self::bot_user_id_from_token(&self.bot_token).unwrap_or_default();

        let gateway_resp: Value = self
            .client
            .get(self.url("gateway/bot"))
            .header("Authorization", self.auth())
            .send()
            .await?
            .json()
            .await?;

        let gateway_url = gateway_resp
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or("wss://gateway.discord.gg");
        let ws_url = format!("{gateway_url}/?v=10&encoding=json");

        let (stream, _) = tokio_tungstenite::connect_async(&ws_url).await?;
        let (mut write, mut read) = stream.split();

        let hello = read
            .next()
            .await
            .ok_or_else(|| anyhow::anyhow!("no hello"))??;
        let hello_text = match hello {
            Message::Text(text) => text.to_string(),
            _ => anyhow::bail!("unexpected discord hello payload"),
        };
        let hello_json: Value = serde_json::from_str(&hello_text)?;
        let heartbeat_interval_ms = hello_json
            .get("d")
            .and_then(|v| v.get("heartbeat_interval"))
            .and_then(Value::as_u64)
            .unwrap_or(41_250);

        let identify = json!({
            "op": 2,
            "d": {
                "token": self.bot_token,
                "intents": GATEWAY_INTENTS,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "rollcall",
                    "device": "rollcall"
                }
            }
        });
        write.send(Message::Text(identify.to_string())).await?;
        tracing::info!("discord gateway connected");

        let (hb_tx, mut hb_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_millis(heartbeat_interval_ms));
            loop {
                interval.tick().await;
                if hb_tx.send(()).await.is_err() {
                    break;
                }
            }
        });

        let mut sequence = Value::Null;
        loop {
            tokio::select! {
                _ = hb_rx.recv() => {
                    let heartbeat = json!({"op": 1, "d": sequence});
                    if write.send(Message::Text(heartbeat.to_string())).await.is_err() {
                        anyhow::bail!("discord heartbeat failed");
                    }
                }
                maybe_msg = read.next() => {
                    let raw = match maybe_msg {
                        Some(Ok(Message::Text(text))) => text.to_string(),
                        Some(Ok(Message::Close(_))) | None => {
                            anyhow::bail!("discord websocket closed");
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(err)) => anyhow::bail!("discord websocket error: {err}"),
                    };

                    let payload: Value = match serde_json::from_str(&raw) {
                        Ok(v) => v,
                        Err(_) => continue,
                    };

                    if let Some(seq) = payload.get("s").filter(|s| !s.is_null()) {
                        sequence = seq.clone();
                    }
                    match payload.get("op").and_then(Value::as_u64) {
                        Some(7) => anyhow::bail!("discord requested reconnect"),
                        Some(9) => anyhow::bail!("discord session invalidated"),
                        _ => {}
                    }

                    let Some(event) =
                        parse_dispatch(&payload, &bot_user_id, self.guild_id.as_deref())
                    else {
                        continue;
                    };

                    if let GatewayEvent::Button(button) = &event
                        && let Err(err) = self
                            .interaction_callback(
                                &button.interaction,
                                json!({ "type": CALLBACK_DEFERRED_UPDATE }),
                            )
                            .await
                    {
                        tracing::warn!("failed to acknowledge discord button: {err}");
                    }

                    if events_tx.send(event).await.is_err() {
                        anyhow::bail!("discord event channel closed");
                    }
                }
            }
        }
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        if self.bot_token.trim().is_empty() {
            return Ok(false);
        }
        let response = self
            .client
            .get(self.url("users/@me"))
            .header("Authorization", self.auth())
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

async fn check_status(response: reqwest::Response, action: &str) -> anyhow::Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("discord {action} failed ({status}): {body}");
    }
    if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Action row with the yes/no controls of a confirmation prompt.
fn prompt_components(prompt_id: &str) -> Value {
    json!([{
        "type": 1,
        "components": [
            {
                "type": 2,
                "style": 3,
                "label": "Yes",
                "custom_id": control_id(ButtonAction::Accept, prompt_id),
            },
            {
                "type": 2,
                "style": 4,
                "label": "No",
                "custom_id": control_id(ButtonAction::Reject, prompt_id),
            }
        ]
    }])
}

/// Slash command definitions registered with the application.
#[must_use]
pub fn command_definitions() -> Value {
    let when_option = |description: &str| {
        json!([{
            "name": "when",
            "description": description,
            "type": 3,
            "required": true
        }])
    };
    json!([
        {
            "name": "availability",
            "description": "List everyone's latest availability",
            "type": 1
        },
        {
            "name": "available",
            "description": "Mark yourself as available",
            "type": 1,
            "options": when_option("When you can make it, e.g. \"monday 20:00\"")
        },
        {
            "name": "unavailable",
            "description": "Mark yourself as unavailable",
            "type": 1,
            "options": when_option("When you cannot make it, e.g. \"friday\"")
        }
    ])
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
}

/// User object of an interaction: `member.user` in guilds, `user` in DMs.
fn interaction_user(data: &Value) -> Option<&Value> {
    data.get("member")
        .and_then(|m| m.get("user"))
        .or_else(|| data.get("user"))
}

fn display_name(user: &Value) -> String {
    user.get("global_name")
        .and_then(Value::as_str)
        .or_else(|| user.get("username").and_then(Value::as_str))
        .unwrap_or_default()
        .to_owned()
}

/// Turn a gateway dispatch payload into an event, dropping everything the
/// bot does not act on.
fn parse_dispatch(
    payload: &Value,
    bot_user_id: &str,
    guild_id: Option<&str>,
) -> Option<GatewayEvent> {
    let event_name = payload.get("t").and_then(Value::as_str)?;
    let data = payload.get("d")?;

    if let Some(required_guild) = guild_id
        && let Some(event_guild) = data.get("guild_id").and_then(Value::as_str)
        && event_guild != required_guild
    {
        return None;
    }

    match event_name {
        "MESSAGE_CREATE" => parse_message(data, bot_user_id).map(GatewayEvent::Message),
        "INTERACTION_CREATE" => parse_interaction(data),
        _ => None,
    }
}

fn parse_message(data: &Value, bot_user_id: &str) -> Option<InboundMessage> {
    let author = data.get("author")?;
    let author_id = author.get("id").and_then(Value::as_str).unwrap_or_default();
    if author_id.is_empty() || author_id == bot_user_id {
        return None;
    }
    let author_is_bot = author
        .get("bot")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if author_is_bot {
        return None;
    }

    let channel_id = data
        .get("channel_id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let content = data
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();
    if channel_id.is_empty() || content.is_empty() {
        return None;
    }

    Some(InboundMessage {
        author_id: author_id.to_owned(),
        author_name: display_name(author),
        channel_id: channel_id.to_owned(),
        text: content.to_owned(),
    })
}

fn parse_interaction(data: &Value) -> Option<GatewayEvent> {
    let interaction = InteractionRef {
        id: data.get("id").and_then(Value::as_str)?.to_owned(),
        token: data.get("token").and_then(Value::as_str)?.to_owned(),
    };
    let user = interaction_user(data)?;
    let user_id = user.get("id").and_then(Value::as_str)?.to_owned();

    match data.get("type").and_then(Value::as_u64)? {
        // APPLICATION_COMMAND
        2 => {
            let name = str_at(data, &["data", "name"])?.to_owned();
            let argument = data
                .get("data")
                .and_then(|d| d.get("options"))
                .and_then(Value::as_array)
                .and_then(|options| options.first())
                .and_then(|option| option.get("value"))
                .and_then(Value::as_str)
                .map(str::to_owned);
            Some(GatewayEvent::Command(CommandInvocation {
                user_id,
                user_name: display_name(user),
                name,
                argument,
                interaction,
            }))
        }
        // MESSAGE_COMPONENT
        3 => {
            let (action, prompt_id) = parse_control_id(str_at(data, &["data", "custom_id"])?)?;
            let message = MessageRef {
                channel_id: str_at(data, &["message", "channel_id"])
                    .or_else(|| data.get("channel_id").and_then(Value::as_str))?
                    .to_owned(),
                message_id: str_at(data, &["message", "id"])?.to_owned(),
            };
            Some(GatewayEvent::Button(ButtonInteraction {
                invoking_user_id: user_id,
                prompt_id,
                action,
                message,
                interaction,
            }))
        }
        _ => None,
    }
}
