//! Pending proposals and the context handed to prompt callbacks.

use crate::channels::traits::{ButtonInteraction, MessageRef};
use crate::intent::Intent;
use chrono::{DateTime, Utc};

/// How a proposal entered the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOrigin {
    /// Inferred from a free-text message; only offered to subscribed users.
    Message,
    /// Requested with a slash command; onboards new users.
    Command,
}

/// A not-yet-committed availability awaiting the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub prompt_id: String,
    pub user_id: String,
    pub user_name: String,
    pub intent: Intent,
    pub timestamp: DateTime<Utc>,
    pub origin: ProposalOrigin,
    pub created_at: DateTime<Utc>,
    /// The private prompt carrying the controls, once sent.
    pub prompt_message: Option<MessageRef>,
}

impl Proposal {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        intent: Intent,
        timestamp: DateTime<Utc>,
        origin: ProposalOrigin,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            prompt_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            intent,
            timestamp,
            origin,
            created_at,
            prompt_message: None,
        }
    }
}

/// Everything an accept/reject callback needs to act on a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionContext {
    pub prompt_id: String,
    pub invoking_user_id: String,
    pub prompt_message: MessageRef,
}

impl From<&ButtonInteraction> for InteractionContext {
    fn from(button: &ButtonInteraction) -> Self {
        Self {
            prompt_id: button.prompt_id.clone(),
            invoking_user_id: button.invoking_user_id.clone(),
            prompt_message: button.message.clone(),
        }
    }
}

/// What an accept or reject interaction ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    Committed(crate::availability::AvailabilityRecord),
    Rejected,
    /// No pending proposal with that id (already answered, expired, or never sent).
    UnknownPrompt,
    /// Pressed by someone other than the proposal's user; the proposal stays pending.
    NotOwner,
    /// The proposed time passed before it was accepted.
    NoLongerFuture,
    StorageFailed,
}
