//! Accept/reject round trip between a proposal and a committed record.

use crate::availability::AvailabilityStore;
use crate::channels::traits::{OutboundReply, ReplySink};
use crate::error::{Result, RollcallError};
use crate::intent::Intent;
use crate::temporal::describe_instant;
use crate::workflow::proposal::{
    InteractionContext, InteractionOutcome, Proposal, ProposalOrigin,
};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

const NOTICE_UNKNOWN_PROMPT: &str = "This prompt is no longer active.";
const NOTICE_NOT_OWNER: &str = "This prompt belongs to someone else.";
const NOTICE_REJECTED: &str = "Okay, nothing was saved.";
const NOTICE_PASSED: &str = "That time has already passed, so nothing was saved.";
const NOTICE_STORAGE_FAILED: &str =
    "Sorry, your availability could not be saved. Please try again later.";

/// Holds pending proposals and commits accepted ones to the store.
pub struct ConfirmationWorkflow {
    store: Arc<AvailabilityStore>,
    tz: Tz,
    event_label: String,
    pending: Mutex<HashMap<String, Proposal>>,
}

impl ConfirmationWorkflow {
    pub fn new(store: Arc<AvailabilityStore>, tz: Tz, event_label: impl Into<String>) -> Self {
        Self {
            store,
            tz,
            event_label: event_label.into(),
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, Proposal>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of proposals awaiting an answer.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// A pending proposal by prompt id.
    #[must_use]
    pub fn proposal(&self, prompt_id: &str) -> Option<Proposal> {
        self.pending().get(prompt_id).cloned()
    }

    /// Send the user a private accept/reject prompt and register the proposal.
    ///
    /// The caller decides who may be prompted; free-text proposals are only
    /// made for subscribed users.
    pub async fn propose<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        user_id: &str,
        user_name: &str,
        intent: Intent,
        timestamp: DateTime<Utc>,
        origin: ProposalOrigin,
    ) -> Result<Proposal> {
        let mut proposal =
            Proposal::new(user_id, user_name, intent, timestamp, origin, Utc::now());
        let text = format!(
            "Do you want to mark yourself as {intent} for the {} on {}?",
            self.event_label,
            describe_instant(timestamp, self.tz)
        );

        let message = sink
            .send_private(user_id, OutboundReply::prompt(text, proposal.prompt_id.clone()))
            .await
            .map_err(|e| RollcallError::Channel(format!("send prompt to {user_id}: {e}")))?;
        proposal.prompt_message = Some(message);

        debug!(
            prompt_id = %proposal.prompt_id,
            user_id,
            %intent,
            ?origin,
            "availability proposed"
        );
        self.pending()
            .insert(proposal.prompt_id.clone(), proposal.clone());
        Ok(proposal)
    }

    /// Commit the proposal behind an accepted prompt.
    pub async fn on_accept<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        ctx: &InteractionContext,
    ) -> InteractionOutcome {
        self.on_accept_at(sink, ctx, Utc::now()).await
    }

    /// [`ConfirmationWorkflow::on_accept`] against an explicit current time.
    pub async fn on_accept_at<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        ctx: &InteractionContext,
        now: DateTime<Utc>,
    ) -> InteractionOutcome {
        let proposal = match self.take_owned(ctx) {
            Ok(proposal) => proposal,
            Err(outcome) => {
                self.notice_for(sink, ctx, &outcome).await;
                return outcome;
            }
        };

        self.delete_prompt(sink, ctx).await;

        if proposal.timestamp <= now {
            self.notify(sink, &proposal.user_id, NOTICE_PASSED).await;
            return InteractionOutcome::NoLongerFuture;
        }

        let record = match self.store.append(
            &proposal.user_id,
            &proposal.user_name,
            proposal.intent.is_available(),
            proposal.timestamp,
        ) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    user_id = %proposal.user_id,
                    error = %e,
                    "failed to commit availability"
                );
                self.notify(sink, &proposal.user_id, NOTICE_STORAGE_FAILED)
                    .await;
                return InteractionOutcome::StorageFailed;
            }
        };

        info!(
            prompt_id = %proposal.prompt_id,
            user_id = %proposal.user_id,
            intent = %proposal.intent,
            "proposal accepted"
        );
        let confirmation = format!(
            "You are marked as {} for the {} on {}.",
            proposal.intent,
            self.event_label,
            describe_instant(record.availability_time, self.tz)
        );
        self.notify(sink, &proposal.user_id, &confirmation).await;
        InteractionOutcome::Committed(record)
    }

    /// Discard the proposal behind a rejected prompt.
    pub async fn on_reject<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        ctx: &InteractionContext,
    ) -> InteractionOutcome {
        let proposal = match self.take_owned(ctx) {
            Ok(proposal) => proposal,
            Err(outcome) => {
                self.notice_for(sink, ctx, &outcome).await;
                return outcome;
            }
        };

        self.delete_prompt(sink, ctx).await;
        debug!(prompt_id = %proposal.prompt_id, "proposal rejected");
        self.notify(sink, &proposal.user_id, NOTICE_REJECTED).await;
        InteractionOutcome::Rejected
    }

    /// Drop proposals created more than `max_age` before `now`, deleting
    /// their prompts. Returns the dropped proposals.
    pub async fn expire_stale<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Vec<Proposal> {
        let expired: Vec<Proposal> = {
            let mut pending = self.pending();
            let stale: Vec<String> = pending
                .values()
                .filter(|p| now - p.created_at > max_age)
                .map(|p| p.prompt_id.clone())
                .collect();
            stale.iter().filter_map(|id| pending.remove(id)).collect()
        };

        for proposal in &expired {
            if let Some(message) = &proposal.prompt_message
                && let Err(e) = sink.delete_message(message).await
            {
                warn!(prompt_id = %proposal.prompt_id, "failed to delete expired prompt: {e}");
            }
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "expired stale proposals");
        }
        expired
    }

    /// Remove and return the proposal if the invoker owns it.
    fn take_owned(
        &self,
        ctx: &InteractionContext,
    ) -> std::result::Result<Proposal, InteractionOutcome> {
        let mut pending = self.pending();
        let owner = pending.get(&ctx.prompt_id).map(|p| p.user_id.clone());
        match owner {
            None => Err(InteractionOutcome::UnknownPrompt),
            Some(owner) if owner != ctx.invoking_user_id => Err(InteractionOutcome::NotOwner),
            Some(_) => pending
                .remove(&ctx.prompt_id)
                .ok_or(InteractionOutcome::UnknownPrompt),
        }
    }

    async fn notice_for<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        ctx: &InteractionContext,
        outcome: &InteractionOutcome,
    ) {
        let text = match outcome {
            InteractionOutcome::NotOwner => NOTICE_NOT_OWNER,
            _ => NOTICE_UNKNOWN_PROMPT,
        };
        debug!(prompt_id = %ctx.prompt_id, ?outcome, "ignoring prompt interaction");
        self.notify(sink, &ctx.invoking_user_id, text).await;
    }

    async fn delete_prompt<S: ReplySink + ?Sized>(&self, sink: &S, ctx: &InteractionContext) {
        if let Err(e) = sink.delete_message(&ctx.prompt_message).await {
            warn!(prompt_id = %ctx.prompt_id, "failed to delete prompt: {e}");
        }
    }

    async fn notify<S: ReplySink + ?Sized>(&self, sink: &S, user_id: &str, text: &str) {
        if let Err(e) = sink.send_private(user_id, OutboundReply::text(text)).await {
            warn!(user_id, "failed to send private notice: {e}");
        }
    }
}
