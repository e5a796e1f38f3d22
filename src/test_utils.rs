//! Shared test utilities used across multiple test modules.

use crate::channels::traits::{InteractionRef, MessageRef, OutboundReply, ReplySink};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory [`ReplySink`] that records everything sent through it.
#[derive(Default)]
pub struct RecordingSink {
    private: Mutex<Vec<(String, OutboundReply)>>,
    deleted: Mutex<Vec<MessageRef>>,
    responses: Mutex<Vec<(InteractionRef, String, bool)>>,
    next_message_id: AtomicU64,
    fail_sends: AtomicBool,
}

impl RecordingSink {
    /// Make every subsequent `send_private` fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn private_messages(&self) -> Vec<(String, OutboundReply)> {
        self.private.lock().expect("private lock").clone()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.deleted.lock().expect("deleted lock").clone()
    }

    pub fn responses(&self) -> Vec<(InteractionRef, String, bool)> {
        self.responses.lock().expect("responses lock").clone()
    }

    /// The last prompt sent with controls, and the message that carried it.
    pub fn last_prompt(&self) -> Option<(String, MessageRef)> {
        let private = self.private.lock().expect("private lock");
        private.iter().enumerate().rev().find_map(|(index, (_, reply))| {
            reply.prompt_id.clone().map(|prompt_id| {
                (
                    prompt_id,
                    MessageRef {
                        channel_id: "dm".to_owned(),
                        message_id: format!("m{}", index + 1),
                    },
                )
            })
        })
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_private(
        &self,
        user_id: &str,
        reply: OutboundReply,
    ) -> anyhow::Result<MessageRef> {
        if self.fail_sends.load(Ordering::SeqCst) {
            anyhow::bail!("send disabled");
        }
        self.private
            .lock()
            .expect("private lock")
            .push((user_id.to_owned(), reply));
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageRef {
            channel_id: "dm".to_owned(),
            message_id: format!("m{id}"),
        })
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
        interaction: &InteractionRef,
        text: &str,
        ephemeral: bool,
    ) -> anyhow::Result<()> {
        self.responses.lock().expect("responses lock").push((
            interaction.clone(),
            text.to_owned(),
            ephemeral,
        ));
        Ok(())
    }
}
