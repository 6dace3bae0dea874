//! Event dispatcher - Routes inbound chat events to the command service

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::application::errors::StorageError;
use crate::application::services::CommandService;
use crate::domain::entities::{Group, InboundEvent, Member};
use crate::domain::traits::{Delivery, MemberStore};

/// What happened to one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Reply posted to the channel
    Delivered { reply: String },
    /// Reply built but the platform did not take it
    DeliveryFailed { reply: String },
    /// Bot-authored event, deliberately not answered
    Ignored,
    /// No target to answer; logged at error level
    Dropped { reason: String },
}

/// Event dispatcher - one call per inbound event, no shared mutable state
pub struct EventDispatcher<S: MemberStore, D: Delivery> {
    store: Arc<S>,
    delivery: D,
    commands: CommandService<S>,
}

impl<S, D> EventDispatcher<S, D>
where
    S: MemberStore + 'static,
    D: Delivery + 'static,
{
    pub fn new(store: Arc<S>, delivery: D) -> Self {
        Self {
            commands: CommandService::new(store.clone()),
            store,
            delivery,
        }
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Process a single event end to end
    pub async fn dispatch(&self, event: InboundEvent) -> Dispatch {
        tracing::info!(
            event_id = %event.id,
            group = %event.group_external_id,
            user = %event.actor_external_id,
            "Processing event"
        );

        if let Some(field) = event.missing_field() {
            return drop_event(&event, format!("missing {}", field));
        }

        let group = match self.store.find_group(&event.group_external_id).await {
            Ok(Some(group)) => group,
            Ok(None) => return drop_event(&event, "unknown group".to_string()),
            Err(e) => return drop_event(&event, format!("group lookup failed: {}", e)),
        };

        if event.from_bot || group.bot_user_id.as_deref() == Some(event.actor_external_id.as_str()) {
            tracing::debug!(event_id = %event.id, "Ignoring bot message");
            return Dispatch::Ignored;
        }

        let mut member = match self.find_or_create_member(&group, &event.actor_external_id).await {
            Ok(member) => member,
            Err(e) => return drop_event(&event, format!("member lookup failed: {}", e)),
        };

        let reply = self.commands.handle_text(&group, &mut member, &event.raw_text).await;

        match self.delivery.deliver(&event.channel_id, &reply, &group.bot_token).await {
            Ok(()) => {
                tracing::info!(
                    event_id = %event.id,
                    "Sent reply to {} in {} via {}",
                    member.user_id,
                    event.channel_id,
                    self.delivery.platform()
                );
                Dispatch::Delivered { reply }
            }
            Err(e) => {
                tracing::error!(event_id = %event.id, "Failed to deliver reply: {}", e);
                Dispatch::DeliveryFailed { reply }
            }
        }
    }

    /// Process events concurrently, one task each. Results keep input order;
    /// a task that panics is logged and reported as dropped.
    pub async fn dispatch_all(self: &Arc<Self>, events: Vec<InboundEvent>) -> Vec<Dispatch> {
        let mut tasks = JoinSet::new();
        let count = events.len();

        for (index, event) in events.into_iter().enumerate() {
            let dispatcher = Arc::clone(self);
            tasks.spawn(async move { (index, dispatcher.dispatch(event).await) });
        }

        let mut results: Vec<Option<Dispatch>> = vec![None; count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => results[index] = Some(outcome),
                Err(e) => tracing::error!("Event task failed: {}", e),
            }
        }

        results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Dispatch::Dropped { reason: "task failed".to_string() }))
            .collect()
    }

    async fn find_or_create_member(&self, group: &Group, user_id: &str) -> Result<Member, StorageError> {
        if let Some(member) = self.store.find_member(group, user_id).await? {
            return Ok(member);
        }

        tracing::info!("Creating new member {} in {}", user_id, group.external_id);
        self.store.create_member(group, user_id).await
    }
}

fn drop_event(event: &InboundEvent, reason: String) -> Dispatch {
    tracing::error!(
        event_id = %event.id,
        group = %event.group_external_id,
        "Dropping event: {}",
        reason
    );
    Dispatch::Dropped { reason }
}
