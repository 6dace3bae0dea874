//! Event dispatch Integration Tests
//! Run with: cargo test --test dispatcher_test

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};

use cardswap_bot::application::errors::{DeliveryError, StorageError};
use cardswap_bot::application::messaging::{Dispatch, EventDispatcher};
use cardswap_bot::application::services::command_service::{FAILURE_TEXT, HELP_TEXT, UNRECOGNIZED_TEXT};
use cardswap_bot::application::services::trade_matcher::NO_TRADES;
use cardswap_bot::domain::entities::{Group, InboundEvent, Member};
use cardswap_bot::domain::traits::{Delivery, MemberStore};
use cardswap_bot::infrastructure::storage::MemoryStore;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Records every delivered message instead of posting it
#[derive(Default)]
struct RecordingDelivery {
    sent: Mutex<Vec<(String, String, String)>>,
    fail: bool,
}

impl RecordingDelivery {
    fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn deliver(&self, channel_id: &str, text: &str, credential: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected("channel_not_found".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string(), credential.to_string()));
        Ok(())
    }

    fn platform(&self) -> &str {
        "test"
    }
}

/// MemoryStore whose commits always fail and are counted
#[derive(Default)]
struct BrokenCommitStore {
    inner: MemoryStore,
    attempts: Mutex<usize>,
}

#[async_trait]
impl MemberStore for BrokenCommitStore {
    async fn find_group(&self, external_id: &str) -> Result<Option<Group>, StorageError> {
        self.inner.find_group(external_id).await
    }

    async fn save_group(&self, group: &Group) -> Result<Group, StorageError> {
        self.inner.save_group(group).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StorageError> {
        self.inner.list_groups().await
    }

    async fn find_member(&self, group: &Group, user_id: &str) -> Result<Option<Member>, StorageError> {
        self.inner.find_member(group, user_id).await
    }

    async fn create_member(&self, group: &Group, user_id: &str) -> Result<Member, StorageError> {
        self.inner.create_member(group, user_id).await
    }

    async fn list_members(&self, group: &Group) -> Result<Vec<Member>, StorageError> {
        self.inner.list_members(group).await
    }

    async fn commit(&self, _member: &Member) -> Result<Member, StorageError> {
        *self.attempts.lock().unwrap() += 1;
        Err(StorageError::Unavailable("connection reset".to_string()))
    }
}

async fn memory_setup() -> (Arc<MemoryStore>, EventDispatcher<MemoryStore, RecordingDelivery>) {
    ensure_init();
    let store = Arc::new(MemoryStore::new());
    store
        .save_group(&Group::new("T1", "Acme", "xoxb-acme").with_bot_user("UBOT"))
        .await
        .unwrap();
    let dispatcher = EventDispatcher::new(store.clone(), RecordingDelivery::default());
    (store, dispatcher)
}

fn event(user: &str, text: &str) -> InboundEvent {
    InboundEvent::new("T1", user, "C1", text)
}

fn reply(outcome: Dispatch) -> String {
    match outcome {
        Dispatch::Delivered { reply } => reply,
        other => panic!("expected delivery, got {:?}", other),
    }
}

#[tokio::test]
async fn test_trade_scenario() {
    let (_store, dispatcher) = memory_setup().await;

    reply(dispatcher.dispatch(event("U", "i have 1 2")).await);
    reply(dispatcher.dispatch(event("U", "i need 5")).await);
    reply(dispatcher.dispatch(event("C", "I have 5")).await);
    reply(dispatcher.dispatch(event("C", "i need 1")).await);

    let shown = reply(dispatcher.dispatch(event("U", "show trades")).await);
    assert_eq!(shown, "Possible trades:\n• <@C> has {5} and needs {1}");

    let sent = dispatcher.delivery().sent();
    assert_eq!(sent.len(), 5);
    assert!(sent.iter().all(|(channel, _, token)| channel == "C1" && token == "xoxb-acme"));
}

#[tokio::test]
async fn test_traded_clears_flags() {
    let (store, dispatcher) = memory_setup().await;

    reply(dispatcher.dispatch(event("U", "i have 1 2 3")).await);
    reply(dispatcher.dispatch(event("U", "i need 5 6")).await);
    let ack = reply(dispatcher.dispatch(event("U", "i traded 1 2 for 5")).await);
    assert_eq!(ack, "Trade recorded: you no longer have {1,2} and you no longer need {5}.");

    let group = store.find_group("T1").await.unwrap().unwrap();
    let member = store.find_member(&group, "U").await.unwrap().unwrap();
    assert_eq!(member.have.iter().collect::<Vec<_>>(), vec![3]);
    assert_eq!(member.need.iter().collect::<Vec<_>>(), vec![6]);
}

#[tokio::test]
async fn test_have_out_of_range() {
    let (store, dispatcher) = memory_setup().await;

    let ack = reply(dispatcher.dispatch(event("U", "i have 1 99 2")).await);
    assert_eq!(ack, "Got it! You have cards {1,2}.");

    let group = store.find_group("T1").await.unwrap().unwrap();
    let member = store.find_member(&group, "U").await.unwrap().unwrap();
    assert_eq!(member.have.iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_unrecognized_makes_no_commit() {
    let (store, dispatcher) = memory_setup().await;

    assert_eq!(reply(dispatcher.dispatch(event("U", "blah blah")).await), UNRECOGNIZED_TEXT);
    assert_eq!(reply(dispatcher.dispatch(event("U", "help")).await), HELP_TEXT);

    let group = store.find_group("T1").await.unwrap().unwrap();
    let member = store.find_member(&group, "U").await.unwrap().unwrap();
    assert_eq!(member.version, 0);
}

#[tokio::test]
async fn test_idle_member_sees_no_trades() {
    let (_store, dispatcher) = memory_setup().await;

    for (i, user) in ["A", "B", "C"].iter().enumerate() {
        let text = format!("i have {} {}", i + 1, i + 4);
        reply(dispatcher.dispatch(event(user, &text)).await);
        reply(dispatcher.dispatch(event(user, "i need 7 8 9")).await);
    }

    assert_eq!(reply(dispatcher.dispatch(event("IDLE", "show trades")).await), NO_TRADES);
}

#[tokio::test]
async fn test_groups_are_isolated() {
    let (store, dispatcher) = memory_setup().await;
    store.save_group(&Group::new("T2", "Other", "xoxb-other")).await.unwrap();

    reply(dispatcher.dispatch(event("U", "i need 5")).await);
    reply(dispatcher.dispatch(InboundEvent::new("T2", "X", "C9", "i have 5")).await);

    assert_eq!(reply(dispatcher.dispatch(event("U", "show trades")).await), NO_TRADES);
}

#[tokio::test]
async fn test_unknown_group_is_dropped() {
    let (_store, dispatcher) = memory_setup().await;

    let outcome = dispatcher.dispatch(InboundEvent::new("TNOPE", "U", "C1", "help")).await;
    assert!(matches!(outcome, Dispatch::Dropped { .. }));
    assert!(dispatcher.delivery().sent().is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_dropped() {
    let (_store, dispatcher) = memory_setup().await;

    let outcome = dispatcher.dispatch(InboundEvent::new("T1", "U", "  ", "help")).await;
    assert_eq!(outcome, Dispatch::Dropped { reason: "missing channel_id".to_string() });
    assert!(dispatcher.delivery().sent().is_empty());
}

#[tokio::test]
async fn test_bot_messages_are_ignored() {
    let (store, dispatcher) = memory_setup().await;

    let flagged = event("B1", "Got it! You have cards {1}.").from_bot(true);
    assert_eq!(dispatcher.dispatch(flagged).await, Dispatch::Ignored);
    assert_eq!(dispatcher.dispatch(event("UBOT", "help")).await, Dispatch::Ignored);

    let group = store.find_group("T1").await.unwrap().unwrap();
    assert!(store.list_members(&group).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    ensure_init();
    let store = Arc::new(MemoryStore::new());
    store.save_group(&Group::new("T1", "Acme", "xoxb")).await.unwrap();
    let dispatcher = EventDispatcher::new(store, RecordingDelivery::failing());

    let outcome = dispatcher.dispatch(event("U", "help")).await;
    assert_eq!(outcome, Dispatch::DeliveryFailed { reply: HELP_TEXT.to_string() });
}

#[tokio::test]
async fn test_commit_failure_rolls_back() {
    ensure_init();
    let store = Arc::new(BrokenCommitStore::default());
    store.save_group(&Group::new("T1", "Acme", "xoxb")).await.unwrap();
    let dispatcher = EventDispatcher::new(store.clone(), RecordingDelivery::default());

    assert_eq!(reply(dispatcher.dispatch(event("U", "i have 4")).await), FAILURE_TEXT);
    assert_eq!(*store.attempts.lock().unwrap(), 1);

    let group = store.find_group("T1").await.unwrap().unwrap();
    let member = store.find_member(&group, "U").await.unwrap().unwrap();
    assert!(member.have.is_empty());

    // Malformed input never reaches the store
    assert_eq!(reply(dispatcher.dispatch(event("U", "i have four")).await), FAILURE_TEXT);
    assert_eq!(*store.attempts.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_dispatch_all_runs_each_event() {
    let (store, dispatcher) = memory_setup().await;
    let dispatcher = Arc::new(dispatcher);

    let events = vec![
        event("A", "i have 1"),
        InboundEvent::new("TNOPE", "B", "C1", "help"),
        event("C", "i need 2"),
    ];
    let outcomes = dispatcher.dispatch_all(events).await;

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0], Dispatch::Delivered { .. }));
    assert!(matches!(outcomes[1], Dispatch::Dropped { .. }));
    assert!(matches!(outcomes[2], Dispatch::Delivered { .. }));

    let group = store.find_group("T1").await.unwrap().unwrap();
    let users: Vec<String> = store
        .list_members(&group)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.user_id)
        .collect();
    assert_eq!(users.len(), 2);
}
