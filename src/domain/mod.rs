//! Domain layer - Core business objects with no infrastructure dependencies
//! 
//! This layer contains:
//! - Entities: Card inventory, Group, Member, Command, InboundEvent
//! - Traits: Abstractions for infrastructure (MemberStore, Delivery)

pub mod entities;
pub mod traits;
