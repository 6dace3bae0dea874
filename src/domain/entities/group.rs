use serde::{Deserialize, Serialize};
use std::fmt;

/// A chat workspace that installed the bot
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub bot_user_id: Option<String>,
    /// Delivery credential, only handed to the messaging adapter
    #[serde(skip_serializing)]
    pub bot_token: String,
}

impl Group {
    pub fn new(external_id: impl Into<String>, name: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            id: 0,
            external_id: external_id.into(),
            name: name.into(),
            bot_user_id: None,
            bot_token: bot_token.into(),
        }
    }

    pub fn with_bot_user(mut self, bot_user_id: impl Into<String>) -> Self {
        self.bot_user_id = Some(bot_user_id.into());
        self
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("external_id", &self.external_id)
            .field("name", &self.name)
            .field("bot_user_id", &self.bot_user_id)
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.external_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let group = Group::new("T1", "Acme", "xoxb-secret");
        let debug = format!("{:?}", group);
        assert!(!debug.contains("xoxb-secret"));
        assert!(debug.contains("Acme"));
    }

    #[test]
    fn test_serialize_skips_token() {
        let group = Group::new("T1", "Acme", "xoxb-secret").with_bot_user("UBOT");
        let json = serde_json::to_string(&group).unwrap();
        assert!(!json.contains("xoxb-secret"));
        assert!(json.contains("UBOT"));
    }
}
