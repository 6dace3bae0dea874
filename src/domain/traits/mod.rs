//! Domain traits - Abstractions for infrastructure implementations

pub mod delivery;
pub mod store;

pub use delivery::Delivery;
pub use store::MemberStore;
