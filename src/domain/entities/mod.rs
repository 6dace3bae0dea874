//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod event;
pub mod group;
pub mod inventory;
pub mod member;

pub use command::Command;
pub use event::InboundEvent;
pub use group::Group;
pub use inventory::{CardSet, CARD_COUNT};
pub use member::Member;
