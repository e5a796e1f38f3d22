//! End-to-end message → prompt → commit flows against a fake chat service.

use crate::helpers::{FakeChat, message, temp_context, tuesday_morning, utc};
use rollcall::channels::traits::{ButtonAction, CommandInvocation, InteractionRef};
use rollcall::commands::{CommandOutcome, handle_command_at};
use rollcall::intent::Intent;
use rollcall::runtime::HandleOutcome;
use rollcall::workflow::{InteractionContext, InteractionOutcome};

#[tokio::test]
async fn subscribed_user_confirms_availability() {
    let (ctx, _dir) = temp_context();
    ctx.store
        .append("alex", "Alex", true, utc(2026, 10, 21, 19, 0))
        .unwrap();
    let chat = FakeChat::default();

    let outcome = ctx
        .handle_message_at(
            &chat,
            &message("alex", "I'm available next monday at 20:00 for the raid"),
            tuesday_morning(),
        )
        .await;
    let HandleOutcome::Proposed(proposal) = outcome else {
        panic!("expected a prompt, got {outcome:?}");
    };
    assert_eq!(proposal.intent, Intent::Available);
    assert_eq!(proposal.timestamp, utc(2026, 10, 26, 20, 0));

    let button = chat.press("alex", ButtonAction::Accept);
    let outcome = ctx
        .workflow
        .on_accept_at(&chat, &InteractionContext::from(&button), tuesday_morning())
        .await;
    let InteractionOutcome::Committed(record) = outcome else {
        panic!("expected a commit, got {outcome:?}");
    };
    assert!(record.is_available);
    assert_eq!(record.availability_time, utc(2026, 10, 26, 20, 0));

    let stored = ctx.store.load_user("alex").unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.latest().unwrap(), &record);
    assert_eq!(chat.deleted(), vec![button.message.clone()]);

    let (_, confirmation) = chat.private_messages().pop().unwrap();
    assert!(confirmation.text.contains("Monday, 26 October at 20:00"));
    assert!(confirmation.prompt_id.is_none());
}

#[tokio::test]
async fn unsubscribed_user_is_left_alone() {
    let (ctx, _dir) = temp_context();
    let chat = FakeChat::default();

    let outcome = ctx
        .handle_message_at(
            &chat,
            &message("newcomer", "I'm available friday"),
            tuesday_morning(),
        )
        .await;
    assert_eq!(outcome, HandleOutcome::NotSubscribed);
    assert!(chat.private_messages().is_empty());
    assert!(!ctx.store.is_subscribed("newcomer").unwrap());
    assert!(ctx.store.list().unwrap().records.is_empty());
}

#[tokio::test]
async fn unavailability_wins_over_availability() {
    let (ctx, _dir) = temp_context();
    ctx.store
        .append("sam", "Sam", true, utc(2026, 10, 21, 19, 0))
        .unwrap();
    let chat = FakeChat::default();

    let outcome = ctx
        .handle_message_at(
            &chat,
            &message("sam", "I'm not available friday"),
            tuesday_morning(),
        )
        .await;
    let HandleOutcome::Proposed(proposal) = outcome else {
        panic!("expected a prompt, got {outcome:?}");
    };
    assert_eq!(proposal.intent, Intent::Unavailable);
    assert_eq!(proposal.timestamp, utc(2026, 10, 23, 19, 0));

    let button = chat.press("sam", ButtonAction::Accept);
    let outcome = ctx
        .workflow
        .on_accept_at(&chat, &InteractionContext::from(&button), tuesday_morning())
        .await;
    let InteractionOutcome::Committed(record) = outcome else {
        panic!("expected a commit, got {outcome:?}");
    };
    assert!(!record.is_available);
}

#[tokio::test]
async fn rejected_prompt_stores_nothing() {
    let (ctx, _dir) = temp_context();
    ctx.store
        .append("alex", "Alex", true, utc(2026, 10, 21, 19, 0))
        .unwrap();
    let chat = FakeChat::default();

    ctx.handle_message_at(
        &chat,
        &message("alex", "can't make it on friday"),
        tuesday_morning(),
    )
    .await;
    let button = chat.press("alex", ButtonAction::Reject);
    let outcome = ctx.handle_button(&chat, &button).await;

    assert_eq!(outcome, InteractionOutcome::Rejected);
    assert_eq!(ctx.store.load_user("alex").unwrap().len(), 1);
    assert_eq!(ctx.workflow.pending_count(), 0);
}

#[tokio::test]
async fn command_onboards_then_messages_are_picked_up() {
    let (ctx, _dir) = temp_context();
    let chat = FakeChat::default();
    let invocation = CommandInvocation {
        user_id: "kim".to_owned(),
        user_name: "Kim".to_owned(),
        name: "available".to_owned(),
        argument: Some("saturday 18:00".to_owned()),
        interaction: InteractionRef {
            id: "i".to_owned(),
            token: "t".to_owned(),
        },
    };

    let outcome = handle_command_at(&ctx, &chat, &invocation, tuesday_morning()).await;
    assert!(matches!(outcome, CommandOutcome::Proposed(_)));

    let button = chat.press("kim", ButtonAction::Accept);
    let outcome = ctx
        .workflow
        .on_accept_at(&chat, &InteractionContext::from(&button), tuesday_morning())
        .await;
    assert!(matches!(outcome, InteractionOutcome::Committed(_)));
    assert!(ctx.store.is_subscribed("kim").unwrap());

    let outcome = ctx
        .handle_message_at(&chat, &message("kim", "I'm free next week"), tuesday_morning())
        .await;
    let HandleOutcome::Proposed(proposal) = outcome else {
        panic!("expected a prompt, got {outcome:?}");
    };
    assert_eq!(proposal.timestamp, utc(2026, 10, 26, 19, 0));
}
