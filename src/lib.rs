//! Chat-driven trading card swap bot.
//!
//! Members declare which of the 18 cards they have and need; the bot keeps
//! that state per member and lists other members of the same workspace
//! holding a complementary set.

pub mod domain;
pub mod application;
pub mod infrastructure;
