//! Process-wide context and the single consumer event loop.
//!
//! The gateway adapter runs in a restart loop and forwards [`GatewayEvent`]s
//! over an mpsc channel; each event is handled to completion before the next.

use crate::availability::AvailabilityStore;
use crate::channels::traits::{
    ButtonAction, ButtonInteraction, ChatGateway, GatewayEvent, InboundMessage, ReplySink,
};
use crate::commands::handle_command;
use crate::config::RollcallConfig;
use crate::error::Result;
use crate::intent::IntentClassifier;
use crate::temporal::TimeResolver;
use crate::workflow::{
    ConfirmationWorkflow, InteractionContext, InteractionOutcome, Proposal, ProposalOrigin,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const EVENT_QUEUE_SIZE: usize = 64;
const EXPIRY_SWEEP_SECS: u64 = 60;

/// Everything the handlers need, built once from config.
pub struct RuntimeContext {
    pub config: RollcallConfig,
    pub store: Arc<AvailabilityStore>,
    pub classifier: IntentClassifier,
    pub resolver: TimeResolver,
    pub workflow: ConfirmationWorkflow,
}

/// Why a free-text message did or did not lead to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    NoIntent,
    /// The clause had no usable time, or the time is not in the future.
    UnresolvedTime,
    NotSubscribed,
    Proposed(Proposal),
    Failed,
}

impl RuntimeContext {
    pub fn from_config(config: RollcallConfig) -> Result<Self> {
        let store = Arc::new(AvailabilityStore::from_config(&config.storage));
        let classifier =
            IntentClassifier::new().with_word_boundaries(config.intent.word_boundaries);
        let resolver = TimeResolver::from_config(&config.schedule)?;
        let workflow = ConfirmationWorkflow::new(
            Arc::clone(&store),
            resolver.timezone(),
            config.schedule.event_label.clone(),
        );
        Ok(Self {
            config,
            store,
            classifier,
            resolver,
            workflow,
        })
    }

    /// Message → intent → time → subscription check → prompt.
    pub async fn handle_message<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        message: &InboundMessage,
    ) -> HandleOutcome {
        self.handle_message_at(sink, message, Utc::now()).await
    }

    /// [`RuntimeContext::handle_message`] against an explicit current time.
    pub async fn handle_message_at<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        message: &InboundMessage,
        now: DateTime<Utc>,
    ) -> HandleOutcome {
        let Some(classification) = self.classifier.classify(&message.text) else {
            return HandleOutcome::NoIntent;
        };

        let timestamp = match self.resolver.resolve_future_at(&classification.clause, now) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                debug!(
                    author_id = %message.author_id,
                    error = %e,
                    "ignoring message without a future time"
                );
                return HandleOutcome::UnresolvedTime;
            }
        };

        match self.store.is_subscribed(&message.author_id) {
            Ok(true) => {}
            Ok(false) => {
                debug!(author_id = %message.author_id, "ignoring message from unsubscribed user");
                return HandleOutcome::NotSubscribed;
            }
            Err(e) => {
                warn!(author_id = %message.author_id, error = %e, "subscription check failed");
                return HandleOutcome::Failed;
            }
        }

        match self
            .workflow
            .propose(
                sink,
                &message.author_id,
                &message.author_name,
                classification.intent,
                timestamp,
                ProposalOrigin::Message,
            )
            .await
        {
            Ok(proposal) => HandleOutcome::Proposed(proposal),
            Err(e) => {
                warn!(author_id = %message.author_id, error = %e, "failed to propose availability");
                HandleOutcome::Failed
            }
        }
    }

    pub async fn handle_button<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        button: &ButtonInteraction,
    ) -> InteractionOutcome {
        let ctx = InteractionContext::from(button);
        match button.action {
            ButtonAction::Accept => self.workflow.on_accept(sink, &ctx).await,
            ButtonAction::Reject => self.workflow.on_reject(sink, &ctx).await,
        }
    }

    pub async fn handle_event<S: ReplySink + ?Sized>(&self, sink: &S, event: GatewayEvent) {
        match event {
            GatewayEvent::Message(message) => {
                self.handle_message(sink, &message).await;
            }
            GatewayEvent::Button(button) => {
                self.handle_button(sink, &button).await;
            }
            GatewayEvent::Command(command) => {
                handle_command(self, sink, &command).await;
            }
        }
    }

    /// Drop prompts older than `workflow.prompt_ttl_secs`, if configured.
    pub async fn expire_stale<S: ReplySink + ?Sized>(
        &self,
        sink: &S,
        now: DateTime<Utc>,
    ) -> usize {
        let max_age = match self.config.workflow.prompt_ttl() {
            Ok(Some(ttl)) => ttl,
            Ok(None) => return 0,
            // Longer than any representable age: nothing is ever stale.
            Err(_) => Duration::MAX,
        };
        self.workflow.expire_stale(sink, max_age, now).await.len()
    }
}

/// Run the gateway in a restart loop and handle its events until it stops
/// for good.
pub async fn run(ctx: Arc<RuntimeContext>, gateway: Arc<dyn ChatGateway>) -> anyhow::Result<()> {
    let (events_tx, mut events_rx) =
        tokio::sync::mpsc::channel::<GatewayEvent>(EVENT_QUEUE_SIZE);
    let mut workers = JoinSet::new();

    {
        let gateway = Arc::clone(&gateway);
        workers.spawn(async move {
            let mut backoff_secs = 2u64;
            loop {
                match gateway.run(events_tx.clone()).await {
                    Ok(()) => {
                        warn!("gateway {} stopped; restarting", gateway.id());
                    }
                    Err(err) => {
                        warn!(
                            "gateway {} failed: {err}; retrying in {backoff_secs}s",
                            gateway.id()
                        );
                    }
                }
                if events_tx.is_closed() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs.saturating_mul(2)).min(60);
            }
        });
    }
    info!("rollcall runtime started with [{}]", gateway.id());

    let mut sweep = tokio::time::interval(std::time::Duration::from_secs(EXPIRY_SWEEP_SECS));
    loop {
        tokio::select! {
            maybe_event = events_rx.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                ctx.handle_event(gateway.as_ref(), event).await;
            }
            _ = sweep.tick() => {
                ctx.expire_stale(gateway.as_ref(), Utc::now()).await;
            }
        }
    }

    workers.abort_all();
    while workers.join_next().await.is_some() {}
    Ok(())
}
