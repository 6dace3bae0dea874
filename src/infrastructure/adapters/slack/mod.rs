//! Slack adapter - Events API decoding and chat.postMessage delivery

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::errors::{DeliveryError, EventError};
use crate::domain::entities::InboundEvent;
use crate::domain::traits::Delivery;

/// Outer `event_callback` envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub team_id: Option<String>,
    pub event: Option<Event>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: Option<String>,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub text: Option<String>,
    pub channel: Option<String>,
}

impl Envelope {
    /// Decode into an InboundEvent. Only `message` and `app_mention`
    /// events are accepted.
    pub fn into_event(self) -> Result<InboundEvent, EventError> {
        let team_id = self.team_id.ok_or(EventError::MissingField("team_id"))?;
        let event = self.event.ok_or(EventError::MissingField("event"))?;

        if event.kind != "message" && event.kind != "app_mention" {
            return Err(EventError::Unsupported(event.kind));
        }

        let from_bot = event.bot_id.is_some() || event.subtype.as_deref() == Some("bot_message");
        let user = match (event.user, from_bot) {
            (Some(user), _) => user,
            // Bot posts may carry only a bot_id
            (None, true) => event.bot_id.clone().unwrap_or_default(),
            (None, false) => return Err(EventError::MissingField("event.user")),
        };
        let channel = event.channel.ok_or(EventError::MissingField("event.channel"))?;
        let text = event.text.ok_or(EventError::MissingField("event.text"))?;

        Ok(InboundEvent::new(team_id, user, channel, text).from_bot(from_bot))
    }
}

/// Decode one envelope or a JSON array of envelopes
pub fn decode_envelopes(json: &str) -> Result<Vec<Result<InboundEvent, EventError>>, EventError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let raw = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    Ok(raw
        .into_iter()
        .map(|item| serde_json::from_value::<Envelope>(item)?.into_event())
        .collect())
}

/// Slack delivery adapter
pub struct SlackAdapter {
    client: Client,
    api_base: String,
}

impl SlackAdapter {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }
}

#[async_trait]
impl Delivery for SlackAdapter {
    async fn deliver(&self, channel_id: &str, text: &str, credential: &str) -> Result<(), DeliveryError> {
        #[derive(Serialize)]
        struct PostMessageRequest<'a> {
            channel: &'a str,
            text: &'a str,
            link_names: bool,
        }

        #[derive(Deserialize)]
        struct Response {
            ok: bool,
            error: Option<String>,
        }

        let request = PostMessageRequest {
            channel: channel_id,
            text,
            link_names: true,
        };

        let response = self.client
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Network(format!("Slack API error: {}", status)));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| DeliveryError::Parse(e.to_string()))?;

        tracing::debug!("Slack API response: {} ok={}", status, data.ok);
        if !data.ok {
            return Err(DeliveryError::Rejected(data.error.unwrap_or_else(|| "unknown".to_string())));
        }
        Ok(())
    }

    fn platform(&self) -> &str {
        "slack"
    }
}
