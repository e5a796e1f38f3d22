//! Explicit confirmation before any availability is stored.
//!
//! A classified message (or a slash command) becomes a [`Proposal`]; the user
//! answers a private prompt, and only an accepted proposal reaches the
//! [`crate::availability::AvailabilityStore`].

pub mod confirmation;
pub mod proposal;

pub use confirmation::ConfirmationWorkflow;
pub use proposal::{InteractionContext, InteractionOutcome, Proposal, ProposalOrigin};
