//! Slash command entry points: `/availability`, `/available`, `/unavailable`.

use crate::availability::{AvailabilityListing, SortOrder};
use crate::channels::traits::{CommandInvocation, ReplySink};
use crate::intent::Intent;
use crate::runtime::RuntimeContext;
use crate::temporal::describe_instant;
use crate::workflow::{Proposal, ProposalOrigin};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the latest record of every user.
    Availability,
    /// Propose an availability from an explicit time clause.
    Mark { intent: Intent, when: String },
}

impl Command {
    /// Parse a command name and its optional `when` argument.
    #[must_use]
    pub fn parse(name: &str, argument: Option<&str>) -> Option<Self> {
        let when = || {
            argument
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_owned)
        };
        match name {
            "availability" => Some(Self::Availability),
            "available" => Some(Self::Mark {
                intent: Intent::Available,
                when: when()?,
            }),
            "unavailable" => Some(Self::Mark {
                intent: Intent::Unavailable,
                when: when()?,
            }),
            _ => None,
        }
    }
}

/// What a command invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Listed { records: usize, skipped: usize },
    Proposed(Proposal),
    InvalidTime,
    Unknown,
    Failed,
}

pub async fn handle_command<S: ReplySink + ?Sized>(
    ctx: &RuntimeContext,
    sink: &S,
    invocation: &CommandInvocation,
) -> CommandOutcome {
    handle_command_at(ctx, sink, invocation, Utc::now()).await
}

/// [`handle_command`] against an explicit current time.
pub async fn handle_command_at<S: ReplySink + ?Sized>(
    ctx: &RuntimeContext,
    sink: &S,
    invocation: &CommandInvocation,
    now: DateTime<Utc>,
) -> CommandOutcome {
    let Some(command) = Command::parse(&invocation.name, invocation.argument.as_deref()) else {
        debug!(name = %invocation.name, "unknown or incomplete command");
        respond(sink, invocation, "Unknown command.", true).await;
        return CommandOutcome::Unknown;
    };

    match command {
        Command::Availability => match ctx.store.list_sorted(SortOrder::Ascending) {
            Ok(listing) => {
                let text = format_listing(
                    &listing,
                    ctx.resolver.timezone(),
                    &ctx.config.schedule.event_label,
                );
                respond(sink, invocation, &text, false).await;
                CommandOutcome::Listed {
                    records: listing.records.len(),
                    skipped: listing.skipped.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to list availabilities");
                respond(sink, invocation, "Availabilities could not be read.", true).await;
                CommandOutcome::Failed
            }
        },
        Command::Mark { intent, when } => {
            let timestamp = match ctx.resolver.resolve_future_at(&when, now) {
                Ok(timestamp) => timestamp,
                Err(e) => {
                    debug!(error = %e, "command time not resolved");
                    let text = format!("I couldn't work out a future time from \"{when}\".");
                    respond(sink, invocation, &text, true).await;
                    return CommandOutcome::InvalidTime;
                }
            };

            let proposed = ctx
                .workflow
                .propose(
                    sink,
                    &invocation.user_id,
                    &invocation.user_name,
                    intent,
                    timestamp,
                    ProposalOrigin::Command,
                )
                .await;
            match proposed {
                Ok(proposal) => {
                    respond(
                        sink,
                        invocation,
                        "Check your direct messages to confirm.",
                        true,
                    )
                    .await;
                    CommandOutcome::Proposed(proposal)
                }
                Err(e) => {
                    warn!(
                        user_id = %invocation.user_id,
                        error = %e,
                        "failed to propose from command"
                    );
                    respond(
                        sink,
                        invocation,
                        "I couldn't send you a direct message. Check your privacy settings.",
                        true,
                    )
                    .await;
                    CommandOutcome::Failed
                }
            }
        }
    }
}

/// Render the `/availability` listing.
#[must_use]
pub fn format_listing(listing: &AvailabilityListing, tz: Tz, event_label: &str) -> String {
    if listing.records.is_empty() {
        return "No availabilities recorded yet.".to_owned();
    }

    let mut lines = vec![format!("Latest availability for the {event_label}:")];
    for record in &listing.records {
        let name = if record.user_name.is_empty() {
            format!("<@{}>", record.user_id)
        } else {
            record.user_name.clone()
        };
        lines.push(format!(
            "- {name} is {} on {}",
            Intent::from_available(record.is_available),
            describe_instant(record.availability_time, tz)
        ));
    }
    lines.join("\n")
}

async fn respond<S: ReplySink + ?Sized>(
    sink: &S,
    invocation: &CommandInvocation,
    text: &str,
    ephemeral: bool,
) {
    if let Err(e) = sink
        .respond_interaction(&invocation.interaction, text, ephemeral)
        .await
    {
        warn!(command = %invocation.name, "failed to answer command: {e}");
    }
}
