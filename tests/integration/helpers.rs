//! Shared helpers for integration tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rollcall::channels::traits::{
    ButtonAction, ButtonInteraction, InboundMessage, InteractionRef, MessageRef, OutboundReply,
    ReplySink,
};
use rollcall::config::RollcallConfig;
use rollcall::runtime::RuntimeContext;
use std::sync::Mutex;

/// A [`ReplySink`] that keeps every private message and deletion in memory.
#[derive(Default)]
pub(crate) struct FakeChat {
    private: Mutex<Vec<(String, OutboundReply, MessageRef)>>,
    deleted: Mutex<Vec<MessageRef>>,
}

impl FakeChat {
    pub(crate) fn private_messages(&self) -> Vec<(String, OutboundReply)> {
        self.private
            .lock()
            .expect("private lock")
            .iter()
            .map(|(user, reply, _)| (user.clone(), reply.clone()))
            .collect()
    }

    pub(crate) fn deleted(&self) -> Vec<MessageRef> {
        self.deleted.lock().expect("deleted lock").clone()
    }

    /// Press a control on the most recent prompt sent to `user_id`.
    pub(crate) fn press(&self, user_id: &str, action: ButtonAction) -> ButtonInteraction {
        let private = self.private.lock().expect("private lock");
        let (_, reply, message) = private
            .iter()
            .rev()
            .find(|(to, reply, _)| to == user_id && reply.prompt_id.is_some())
            .expect("no prompt sent to user");
        ButtonInteraction {
            invoking_user_id: user_id.to_owned(),
            prompt_id: reply.prompt_id.clone().expect("prompt id"),
            action,
            message: message.clone(),
            interaction: InteractionRef {
                id: "interaction".to_owned(),
                token: "token".to_owned(),
            },
        }
    }
}

#[async_trait]
impl ReplySink for FakeChat {
    async fn send_private(
        &self,
        user_id: &str,
        reply: OutboundReply,
    ) -> anyhow::Result<MessageRef> {
        let mut private = self.private.lock().expect("private lock");
        let message = MessageRef {
            channel_id: format!("dm-{user_id}"),
            message_id: format!("msg-{}", private.len() + 1),
        };
        private.push((user_id.to_owned(), reply, message.clone()));
        Ok(message)
    }

    async fn delete_message(&self, message: &MessageRef) -> anyhow::Result<()> {
        self.deleted
            .lock()
            .expect("deleted lock")
            .push(message.clone());
        Ok(())
    }

    async fn respond_interaction(
        &self,
        _interaction: &InteractionRef,
        _text: &str,
        _ephemeral: bool,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Runtime context backed by a fresh temporary availabilities directory.
pub(crate) fn temp_context() -> (RuntimeContext, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut config = RollcallConfig::default();
    config.storage.availabilities_dir = dir.path().join("availabilities");
    let ctx = RuntimeContext::from_config(config).expect("build runtime context");
    (ctx, dir)
}

pub(crate) fn message(author_id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        author_id: author_id.to_owned(),
        author_name: format!("user-{author_id}"),
        channel_id: "general".to_owned(),
        text: text.to_owned(),
    }
}

pub(crate) fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Tuesday 2026-10-20 10:15 UTC.
pub(crate) fn tuesday_morning() -> DateTime<Utc> {
    utc(2026, 10, 20, 10, 15)
}
