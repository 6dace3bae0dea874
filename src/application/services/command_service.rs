use std::sync::Arc;

use crate::application::messaging::CommandParser;
use crate::domain::entities::{Command, Group, Member};
use crate::domain::traits::MemberStore;
use super::inventory_service::{self, have_ack, need_ack, trade_ack};
use super::trade_matcher::{find_matches, format_matches};

pub const HELP_TEXT: &str = "Here's what I can do:\n\
• `i have 1 2 3` - mark cards you can trade away\n\
• `i need 4 5` - mark cards you're looking for\n\
• `i traded 1 2 for 4` - record a finished trade\n\
• `show trades` - list members you can trade with\n\
Cards are numbered 1-18.";

pub const UNRECOGNIZED_TEXT: &str = "I'm not sure what you wanted.\nType `help` to see what I can do.";

pub const FAILURE_TEXT: &str = "Sorry, I couldn't do that. Please try again.";

/// Parses chat text, applies it to a member and builds the reply.
///
/// Internal errors never leave this service; they become `FAILURE_TEXT`.
pub struct CommandService<S: MemberStore> {
    store: Arc<S>,
    parser: CommandParser,
}

impl<S: MemberStore> CommandService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            parser: CommandParser::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Parse and execute raw chat text
    pub async fn handle_text(&self, group: &Group, member: &mut Member, text: &str) -> String {
        let command = self.parser.parse(text);
        self.handle(group, member, command).await
    }

    /// Execute a parsed command. On a successful mutation `member` is
    /// replaced by the committed snapshot; otherwise it is left as it was.
    pub async fn handle(&self, group: &Group, member: &mut Member, command: Command) -> String {
        tracing::debug!(
            user = %member.user_id,
            command = command.name(),
            mutation = command.is_mutation(),
            "Executing command"
        );

        match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Unrecognized => UNRECOGNIZED_TEXT.to_string(),
            Command::Malformed { keyword } => {
                tracing::info!("Malformed '{}' arguments from {}", keyword, member.user_id);
                FAILURE_TEXT.to_string()
            }
            Command::ShowTrades => self.show_trades(group, member).await,
            Command::MarkHave(cards) => {
                self.mutate(member, |m| have_ack(&inventory_service::mark_have(m, &cards)))
                    .await
            }
            Command::MarkNeed(cards) => {
                self.mutate(member, |m| need_ack(&inventory_service::mark_need(m, &cards)))
                    .await
            }
            Command::RecordTrade { traded_out, traded_in } => {
                self.mutate(member, |m| {
                    trade_ack(&inventory_service::record_trade(m, &traded_out, &traded_in))
                })
                .await
            }
        }
    }

    /// Apply `apply` to a working copy and commit it; the copy is dropped on failure
    async fn mutate<F>(&self, member: &mut Member, apply: F) -> String
    where
        F: FnOnce(&mut Member) -> String,
    {
        let mut working = member.clone();
        let ack = apply(&mut working);

        match self.store.commit(&working).await {
            Ok(committed) => {
                *member = committed;
                ack
            }
            Err(e) => {
                tracing::error!("Failed to commit member {}: {}", member.user_id, e);
                FAILURE_TEXT.to_string()
            }
        }
    }

    async fn show_trades(&self, group: &Group, member: &Member) -> String {
        match self.store.list_members(group).await {
            Ok(population) => format_matches(&find_matches(member, &population)),
            Err(e) => {
                tracing::error!("Failed to list members of {}: {}", group.external_id, e);
                FAILURE_TEXT.to_string()
            }
        }
    }
}
