use chrono::{DateTime, Utc};

/// One decoded chat event addressed to the bot
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub id: String,
    pub group_external_id: String,
    pub actor_external_id: String,
    pub raw_text: String,
    pub channel_id: String,
    /// Authored by a bot (including ourselves); never answered
    pub from_bot: bool,
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    pub fn new(
        group_external_id: impl Into<String>,
        actor_external_id: impl Into<String>,
        channel_id: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            group_external_id: group_external_id.into(),
            actor_external_id: actor_external_id.into(),
            raw_text: raw_text.into(),
            channel_id: channel_id.into(),
            from_bot: false,
            received_at: Utc::now(),
        }
    }

    pub fn from_bot(mut self, from_bot: bool) -> Self {
        self.from_bot = from_bot;
        self
    }

    /// Name of the first required field that is blank
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.group_external_id.trim().is_empty() {
            Some("group_external_id")
        } else if self.actor_external_id.trim().is_empty() {
            Some("actor_external_id")
        } else if self.channel_id.trim().is_empty() {
            Some("channel_id")
        } else {
            None
        }
    }
}
