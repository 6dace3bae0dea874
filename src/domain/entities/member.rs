use serde::{Deserialize, Serialize};
use std::fmt;

use super::CardSet;

/// A participant tracked by external chat user id within one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub group_id: i64,
    pub user_id: String,
    pub have: CardSet,
    pub need: CardSet,
    /// Bumped by every successful commit
    pub version: i64,
}

impl Member {
    pub fn new(group_id: i64, user_id: impl Into<String>) -> Self {
        Self {
            id: 0,
            group_id,
            user_id: user_id.into(),
            have: CardSet::new(),
            need: CardSet::new(),
            version: 0,
        }
    }

    pub fn with_have(mut self, cards: impl IntoIterator<Item = i64>) -> Self {
        self.have = cards.into_iter().collect();
        self
    }

    pub fn with_need(mut self, cards: impl IntoIterator<Item = i64>) -> Self {
        self.need = cards.into_iter().collect();
        self
    }

    pub fn is_idle(&self) -> bool {
        self.have.is_empty() && self.need.is_empty()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_id)
    }
}
